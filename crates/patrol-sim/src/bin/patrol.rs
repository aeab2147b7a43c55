//! Command-line front end: run one simulation (or a Monte Carlo batch)
//! against the built-in or a user-supplied catalogue and print the JSON
//! result to stdout.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;

use patrol_core::catalog::Catalogue;
use patrol_core::params::SimParams;
use patrol_sim::{run_monte_carlo, run_simulation, MonteCarloConfig, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "patrol", about = "Stochastic blue-vs-red patrol simulator")]
struct Args {
    /// Initial blue squad size.
    #[arg(long, default_value_t = 10)]
    blue_stock: u32,

    /// Initial red patrol size.
    #[arg(long, default_value_t = 20)]
    red_stock: u32,

    /// Heading jitter per tick (degrees).
    #[arg(long, default_value_t = 10.0)]
    deviation: f64,

    /// Armour profile worn by the blue squad.
    #[arg(long, default_value = "Basilone Ballistic Insert")]
    armor: String,

    /// Operating environment.
    #[arg(long, default_value = "Krulak's Three Block War")]
    environment: String,

    /// RNG seed (batch runs derive per-run seeds from it).
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Run a Monte Carlo batch of this many independent runs instead of
    /// a single logged run.
    #[arg(long)]
    runs: Option<u32>,

    /// Record per-tick history buffers (single runs only).
    #[arg(long)]
    full_log: bool,

    /// Load the catalogue from a JSON file instead of the built-in tables.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Pretty-print the JSON result.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let catalogue = match &args.catalog {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Catalogue::default(),
    };

    let params = SimParams {
        blue_stock: args.blue_stock,
        red_stock: args.red_stock,
        direction_deviation: args.deviation,
        armor_type: args.armor.clone(),
        environment: args.environment.clone(),
    };

    let json = match args.runs {
        Some(runs) => {
            let result = run_monte_carlo(
                &catalogue,
                &params,
                MonteCarloConfig {
                    runs,
                    seed: args.seed,
                },
            )?;
            to_json(&result, args.pretty)?
        }
        None => {
            let result = run_simulation(
                &catalogue,
                &params,
                RunConfig {
                    seed: args.seed,
                    full_log: args.full_log,
                },
            )?;
            to_json(&result, args.pretty)?
        }
    };

    println!("{json}");
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
