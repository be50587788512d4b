//! Solve a clearance problem and simulate the optimal policy.
//!
//! Prints a JSON performance summary (revenue / a-markdown / salvage as
//! fractions of initial value) to stdout.

use std::time::Instant;

use tracing::info;

use clearance_pricing::constants::*;
use clearance_pricing::env_config::{init_logging, init_rayon_threads};
use clearance_pricing::simulation::{simulate_trace, summarize, TraceSimulator};
use clearance_pricing::{solve, ClearanceProblem, ElasticityTable, Engine};

struct Args {
    time_steps: i64,
    init_inv: i64,
    num_prices: usize,
    alpha: f64,
    beta: f64,
    discount: f64,
    num_traces: usize,
    seed: u64,
    engine: Engine,
    show_trace: bool,
}

const USAGE: &str = "Usage: clearance-simulate [--time-steps N] [--inventory N] [--prices N] [--alpha F] [--beta F] [--discount F] [--traces N] [--seed S] [--engine scalar|batched] [--trace]";

fn parse<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> T {
    match value.and_then(|v| v.parse().ok()) {
        Some(v) => v,
        None => {
            eprintln!("Invalid {} value: {:?}", flag, value);
            std::process::exit(1);
        }
    }
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        time_steps: 10,
        init_inv: 12,
        num_prices: 20,
        alpha: DEFAULT_ALPHA,
        beta: DEFAULT_BETA,
        discount: 1.0,
        num_traces: 10_000,
        seed: 42,
        engine: Engine::Batched,
        show_trace: false,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--time-steps" => {
                i += 1;
                parsed.time_steps = parse(flag, args.get(i));
            }
            "--inventory" => {
                i += 1;
                parsed.init_inv = parse(flag, args.get(i));
            }
            "--prices" => {
                i += 1;
                parsed.num_prices = parse(flag, args.get(i));
            }
            "--alpha" => {
                i += 1;
                parsed.alpha = parse(flag, args.get(i));
            }
            "--beta" => {
                i += 1;
                parsed.beta = parse(flag, args.get(i));
            }
            "--discount" => {
                i += 1;
                parsed.discount = parse(flag, args.get(i));
            }
            "--traces" => {
                i += 1;
                parsed.num_traces = parse(flag, args.get(i));
            }
            "--seed" => {
                i += 1;
                parsed.seed = parse(flag, args.get(i));
            }
            "--engine" => {
                i += 1;
                parsed.engine = parse(flag, args.get(i));
            }
            "--trace" => {
                parsed.show_trace = true;
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                println!();
                println!("Options:");
                println!("  --time-steps N   Selling periods (default: 10)");
                println!("  --inventory N    Initial inventory (default: 12)");
                println!("  --prices N       Price steps on the exponential demand curve (default: 20)");
                println!("  --alpha F        Demand curve scale (default: {DEFAULT_ALPHA})");
                println!("  --beta F         Demand curve price sensitivity (default: {DEFAULT_BETA})");
                println!("  --discount F     Per-period discount in (0, 1] (default: 1.0)");
                println!("  --traces N       Simulated seasons (default: 10000)");
                println!("  --seed S         RNG seed (default: 42)");
                println!("  --engine NAME    scalar or batched (default: batched)");
                println!("  --trace          Also print one sample trace");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("{USAGE}");
                std::process::exit(1);
            }
        }
        i += 1;
    }
    parsed
}

fn run(args: &Args) -> clearance_pricing::Result<serde_json::Value> {
    let elasticity = ElasticityTable::exponential(args.num_prices, args.alpha, args.beta)?;
    let problem = ClearanceProblem::new(args.time_steps, args.init_inv, elasticity.clone())?
        .with_discount(args.discount)?;
    let schedule = solve(&problem, args.engine)?;

    let start = Instant::now();
    let sim = TraceSimulator::new(&schedule, &elasticity, problem.init_inv())?;
    let traces = sim.simulate_batch(args.num_traces, args.seed);
    info!(
        traces = traces.len(),
        elapsed_s = %format!("{:.3}", start.elapsed().as_secs_f64()),
        "simulation complete"
    );

    let summary = summarize(&traces, problem.init_inv(), schedule.initial_value())?;
    let first_action = elasticity.action(schedule.initial_action());
    let mut out = serde_json::json!({
        "time_steps": problem.time_steps(),
        "init_inv": problem.init_inv(),
        "num_actions": problem.num_actions(),
        "engine": args.engine.to_string(),
        "optimal_first_price": first_action.price(),
        "summary": serde_json::to_value(&summary)?,
    });
    if args.show_trace {
        let trace = simulate_trace(&schedule, &elasticity, problem.init_inv(), args.seed)?;
        out["trace"] = serde_json::to_value(&trace)?;
    }
    Ok(out)
}

fn main() {
    init_logging();
    init_rayon_threads();
    let args = parse_args();

    match run(&args) {
        Ok(out) => match serde_json::to_string_pretty(&out) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize output: {e}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
