use std::time::Instant;

use clap::{App, load_yaml};
use dogs::search_algorithm::TimeStoppingCriterion;
use serde_json::json;

use clique_part::instance::checker;
use clique_part::search::fixed_set::{fixed_set_search, FssConfig};
use clique_part::util::{export_results, param_or, read_params, read_sa_params};


/** solves a clique partitioning instance using the fixed set search */
pub fn main() {
    // parse arguments
    let yaml = load_yaml!("fss.yml");
    let main_args = App::from_yaml(yaml).get_matches();
    let (
        inst_filename,
        instance,
        t,
        sol_file,
        perf_file
    ) = read_params(&main_args);
    let params = read_sa_params(&main_args, &instance);
    let config = FssConfig {
        nb_total_iterations: param_or(&main_args, "iterations", 10_000),
        m: param_or(&main_args, "base_solutions", 10),
        n: param_or(&main_args, "candidate_solutions", 50),
        k: param_or(&main_args, "consensus_solutions", 10),
        max_stagnation_per_portion: param_or(&main_args, "stagnation", 20),
        nb_grasp_iterations: param_or(&main_args, "grasp_iterations", 10),
        rcl_length: param_or(&main_args, "alpha", 2),
    };

    // solve it
    let t_start = Instant::now();
    let solution = fixed_set_search(
        instance.clone(),
        &config,
        &params,
        TimeStoppingCriterion::new(t)
    );
    let duration = t_start.elapsed().as_secs_f32();
    let value = checker(&instance, &solution)
        .expect("fixed set search returned an invalid partition");
    println!("FSS found value {} in {:.3} seconds", value, duration);
    let stats = json!({
        "primal_list": vec![value],
        "time_searched": duration,
        "inst_name": inst_filename
    });

    // export results
    export_results(&instance, &solution, &stats, perf_file, sol_file);
}
