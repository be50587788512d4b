//! Export the optimal-price heatmap over (initial inventory, horizon) as JSON.
//!
//! With `--sweep`, also simulates the policy from every initial inventory and
//! reports the revenue / a-markdown / salvage split.

use clearance_pricing::constants::*;
use clearance_pricing::env_config::{init_logging, init_rayon_threads};
use clearance_pricing::simulation::{inventory_sweep, price_heatmap};
use clearance_pricing::{ElasticityTable, Engine};

struct Args {
    max_horizon: usize,
    max_inv: usize,
    num_prices: usize,
    sweep: bool,
    num_traces: usize,
    seed: u64,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        max_horizon: 10,
        max_inv: 12,
        num_prices: 20,
        sweep: false,
        num_traces: 10_000,
        seed: 42,
    };
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--sweep" {
            parsed.sweep = true;
            i += 1;
            continue;
        }
        let Some(v) = args.get(i + 1).and_then(|v| v.parse::<u64>().ok()) else {
            eprintln!("Invalid or missing value for {}", args[i]);
            eprintln!(
                "Usage: clearance-heatmap [--horizon N] [--inventory N] [--prices N] [--sweep] [--traces N] [--seed S]"
            );
            std::process::exit(1);
        };
        match args[i].as_str() {
            "--horizon" => parsed.max_horizon = v as usize,
            "--inventory" => parsed.max_inv = v as usize,
            "--prices" => parsed.num_prices = v as usize,
            "--traces" => parsed.num_traces = v as usize,
            "--seed" => parsed.seed = v,
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 2;
    }
    parsed
}

fn run(args: &Args) -> clearance_pricing::Result<serde_json::Value> {
    let elasticity = ElasticityTable::exponential(args.num_prices, DEFAULT_ALPHA, DEFAULT_BETA)?;
    let heat = price_heatmap(args.max_horizon, args.max_inv, &elasticity, Engine::Batched)?;
    let mut out = serde_json::json!({ "heatmap": serde_json::to_value(&heat)? });
    if args.sweep {
        let inventories: Vec<usize> = (1..=args.max_inv).collect();
        let points = inventory_sweep(
            args.max_horizon,
            &inventories,
            &elasticity,
            args.num_traces,
            args.seed,
            Engine::Batched,
        )?;
        out["sweep"] = serde_json::to_value(&points)?;
    }
    Ok(out)
}

fn main() {
    init_logging();
    init_rayon_threads();
    let args = parse_args();

    match run(&args) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
