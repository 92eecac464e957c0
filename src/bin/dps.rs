use std::time::Instant;

use clap::{App, load_yaml};
use dogs::search_algorithm::TimeStoppingCriterion;
use serde_json::json;

use clique_part::instance::checker;
use clique_part::search::diverse_pool::{diverse_pool_search, DpsConfig};
use clique_part::util::{export_results, param_or, read_params, read_sa_params};


/** solves a clique partitioning instance using the diverse pool search */
pub fn main() {
    // parse arguments
    let yaml = load_yaml!("dps.yml");
    let main_args = App::from_yaml(yaml).get_matches();
    let (
        inst_filename,
        instance,
        t,
        sol_file,
        perf_file
    ) = read_params(&main_args);
    let params = read_sa_params(&main_args, &instance);
    let config = DpsConfig {
        nb_total_iterations: param_or(&main_args, "iterations", 10_000),
        desired_size: param_or(&main_args, "pool_size", 10),
        improvement_factor: param_or(&main_args, "improvement_factor", 3),
        rcl_length: param_or(&main_args, "alpha", 2),
        nb_grasp_iterations: main_args.value_of("grasp_iterations")
            .map(|e| e.parse().expect("unable to parse the number of GRASP iterations")),
    };
    let result_log = main_args.value_of("result_log").map(String::from);

    // solve it
    let t_start = Instant::now();
    let solution = diverse_pool_search(
        instance.clone(),
        &config,
        &params,
        TimeStoppingCriterion::new(t),
        result_log
    );
    let duration = t_start.elapsed().as_secs_f32();
    let value = checker(&instance, &solution)
        .expect("diverse pool search returned an invalid partition");
    println!("DPS found value {} in {:.3} seconds", value, duration);
    let stats = json!({
        "primal_list": vec![value],
        "time_searched": duration,
        "inst_name": inst_filename
    });

    // export results
    export_results(&instance, &solution, &stats, perf_file, sol_file);
}
