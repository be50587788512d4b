//! Wall-clock comparison of the scalar and batched engines on one problem.
//!
//! Usage:
//!   clearance-bench [--time-steps N] [--inventory N] [--prices N] [--iterations N]
//!
//! Defaults: 20 periods, 18 units, 50 price steps on the exponential demand curve.
//! Exits with status 1 if the engines disagree.

use std::time::Instant;

use clearance_pricing::constants::*;
use clearance_pricing::env_config::{init_logging, init_rayon_threads};
use clearance_pricing::state_computation::compare_engines;
use clearance_pricing::{solve, ClearanceProblem, ElasticityTable, Engine};

struct Args {
    time_steps: i64,
    init_inv: i64,
    num_prices: usize,
    iterations: usize,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        time_steps: DEFAULT_TIME_STEPS as i64,
        init_inv: DEFAULT_INIT_INV as i64,
        num_prices: DEFAULT_NUM_PRICES,
        iterations: 5,
    };
    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).and_then(|v| v.parse::<usize>().ok());
        let Some(v) = value else {
            eprintln!("Invalid or missing value for {}", args[i]);
            eprintln!("Usage: clearance-bench [--time-steps N] [--inventory N] [--prices N] [--iterations N]");
            std::process::exit(1);
        };
        match args[i].as_str() {
            "--time-steps" => parsed.time_steps = v as i64,
            "--inventory" => parsed.init_inv = v as i64,
            "--prices" => parsed.num_prices = v,
            "--iterations" => parsed.iterations = v.max(1),
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 2;
    }
    parsed
}

fn time_engine(problem: &ClearanceProblem, engine: Engine, iterations: usize) -> (f64, f64) {
    let mut times_ms = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let t0 = Instant::now();
        if let Err(e) = solve(problem, engine) {
            eprintln!("{engine} engine failed: {e}");
            std::process::exit(1);
        }
        times_ms.push(t0.elapsed().as_secs_f64() * 1000.0);
    }
    let mean = times_ms.iter().sum::<f64>() / iterations as f64;
    let var = times_ms.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / iterations as f64;
    (mean, var.sqrt())
}

fn main() {
    init_logging();
    init_rayon_threads();
    let args = parse_args();

    let problem = match ElasticityTable::exponential(args.num_prices, DEFAULT_ALPHA, DEFAULT_BETA)
        .and_then(|el| ClearanceProblem::new(args.time_steps, args.init_inv, el))
    {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    println!("Comparing scalar and batched backward induction");
    println!("Number of time steps: {}", problem.time_steps());
    println!("Initial inventory:    {}", problem.init_inv());
    println!("Number of actions:    {}", problem.num_actions());
    println!();

    let cmp = match compare_engines(&problem) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    for (name, sched) in [("scalar", &cmp.scalar), ("batched", &cmp.batched)] {
        let action = problem.elasticity().action(sched.initial_action());
        println!(
            "  {:<8} value at initial state: {:.6}  first price: {:.3}",
            name,
            sched.initial_value(),
            action.price()
        );
    }
    println!();

    let (scalar_ms, scalar_sd) = time_engine(&problem, Engine::Scalar, args.iterations);
    let (batched_ms, batched_sd) = time_engine(&problem, Engine::Batched, args.iterations);
    println!("Engine   | Mean (ms) | Std (ms)");
    println!("---------|-----------|---------");
    println!("scalar   | {:9.3} | {:8.3}", scalar_ms, scalar_sd);
    println!("batched  | {:9.3} | {:8.3}", batched_ms, batched_sd);
    println!();
    println!("Max |V_scalar - V_batched|: {:.3e}", cmp.max_abs_diff);
    println!("Identical policies:         {}", cmp.same_policy);

    if cmp.max_abs_diff > EPSILON || !cmp.same_policy {
        eprintln!("Engines disagree");
        std::process::exit(1);
    }
}
