use std::rc::Rc;
use std::str::FromStr;

use clap::ArgMatches;
use serde_json::Value;

use crate::instance::{checker, Instance, Partition};
use crate::rng;
use crate::search::annealing::{calibrate_temperature, SaParams};

/** reads command line input and returns the instance name, the instance,
the time limit, the solution filename and the stats filename. Also reseeds
the random number generator when a seed is supplied. */
pub fn read_params(main_args:&ArgMatches) -> (String, Rc<Instance>, f32, Option<String>, Option<String>) {
    let inst_filename = main_args.value_of("instance").unwrap();
    let t:f32 = main_args.value_of("time").unwrap().parse::<f32>()
        .expect("unable to parse the time given");
    if let Some(seed) = main_args.value_of("seed") {
        rng::set_seed(seed.parse::<u64>().expect("unable to parse the seed given"));
    }
    // read value of the solution filename
    let sol_file: Option<String> = match main_args.value_of("solution") {
        None => None,
        Some(e) => {
            println!("printing solutions in: {}", e);
            Some(e.to_string())
        }
    };
    // read value of the performance logs filename
    let perf_file: Option<String> = match main_args.value_of("perf") {
        None => None,
        Some(e) => {
            println!("printing perfs in: {}\n", e);
            Some(e.to_string())
        }
    };
    // read instance file
    let instance = Rc::new(Instance::from_file(inst_filename));
    instance.display_statistics();
    println!("=======================");
    (inst_filename.to_string(), instance, t, sol_file, perf_file)
}

/// parses an optional numeric argument, falling back to the given default
pub fn param_or<T:FromStr>(main_args:&ArgMatches, name:&str, default:T) -> T
where T::Err: std::fmt::Debug {
    match main_args.value_of(name) {
        None => default,
        Some(e) => e.parse::<T>()
            .unwrap_or_else(|why| panic!("unable to parse {}: {:?}", name, why)),
    }
}

/** reads the annealing parameters, calibrating the initial temperature
when it is not supplied */
pub fn read_sa_params(main_args:&ArgMatches, instance:&Rc<Instance>) -> SaParams {
    let batch_size_scale_factor = param_or(main_args, "sigma", 8.);
    let cooldown_factor = param_or(main_args, "theta", 0.96);
    let minimal_transition_ratio = param_or(main_args, "min_ratio", 0.01);
    let initial_temperature = match main_args.value_of("temperature") {
        Some(e) => e.parse::<f64>().expect("unable to parse the temperature given"),
        None => {
            println!("calibrating the initial temperature...");
            let temperature = calibrate_temperature(instance.clone(), batch_size_scale_factor);
            println!("initial temperature: {:.3}", temperature);
            temperature
        }
    };
    SaParams {
        initial_temperature,
        batch_size_scale_factor,
        cooldown_factor,
        minimal_transition_ratio,
    }
}

/// exports search results to files
pub fn export_results(
    instance:&Rc<Instance>,
    solution:&Partition,
    stats:&Value,
    perf_file:Option<String>,
    sol_file:Option<String>,
) {
    // export statistics
    match perf_file {
        None => {},
        Some(filename) => {
            let mut file = match std::fs::File::create(filename.as_str()) {
                Err(why) => panic!("couldn't create {}: {}", filename, why),
                Ok(file) => file
            };
            if let Err(why) = std::io::Write::write(
                &mut file, serde_json::to_string(stats).unwrap().as_bytes()
            ) { panic!("couldn't write: {}", why) };
        }
    }
    // export solution
    match sol_file {
        None => {},
        Some(filename) => {
            match checker(instance, solution) {
                Some(_) => {},
                None => { println!("invalid solution"); }
            };
            instance.write_solution(filename.as_str(), solution);
        }
    }
}
