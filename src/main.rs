//! Contagion Sim entry point
//!
//! Headless runner: builds a simulation from a config file (or defaults),
//! ticks it to completion, and logs aggregate counts along the way. All
//! rendering and interactive input stay outside the core; this binary is
//! the thinnest possible driver.

use std::path::PathBuf;
use std::process::ExitCode;

use contagion_sim::SimConfig;
use contagion_sim::sim::{SimState, TickInput, tick};

/// Command-line arguments: `contagion-sim [max_ticks] [seed] [config.json]`
struct Args {
    max_ticks: u64,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let max_ticks = match args.next() {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("max_ticks must be a number, got {raw:?}"))?,
        None => 10_000,
    };
    let seed = match args.next() {
        Some(raw) => Some(
            raw.parse()
                .map_err(|_| format!("seed must be a number, got {raw:?}"))?,
        ),
        None => None,
    };
    let config_path = args.next().map(PathBuf::from);
    Ok(Args {
        max_ticks,
        seed,
        config_path,
    })
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("usage: contagion-sim [max_ticks] [seed] [config.json]");
            return ExitCode::FAILURE;
        }
    };

    let mut config = match &args.config_path {
        Some(path) => SimConfig::load_from(path),
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut state = match SimState::new(config) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("setup failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let input = TickInput::default();
    let mut last = state.stats();
    while state.time_ticks < args.max_ticks {
        last = tick(&mut state, &input);

        if state.time_ticks.is_multiple_of(500) {
            log::info!(
                "tick {}: affected {}, resolved {}, population {}",
                state.time_ticks,
                last.affected,
                last.resolved,
                last.population
            );
        }

        // Stop once the spread has burned out: nobody left to resolve and
        // at least one agent went through the full cycle.
        if last.affected == 0 && last.resolved > 0 {
            break;
        }
    }

    println!(
        "finished at tick {}: affected {}, resolved {}, population {}, lockdown {}",
        state.time_ticks,
        last.affected,
        last.resolved,
        last.population,
        if state.lockdown_done { "fired" } else { "never fired" }
    );
    ExitCode::SUCCESS
}
