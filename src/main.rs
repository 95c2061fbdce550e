extern crate env_logger;
#[macro_use]
extern crate log;

use anyhow::Result;
use clap::Parser;

mod cli;
mod error;
mod io;
mod matcher;
mod pairing;
mod reader;
mod record;
mod scan;
mod summary;

use cli::{Cli, Commands};

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    info!("matepair v{}", cli::VERSION);

    match cli.command {
        Commands::Pair {
            inputs,
            out_1,
            out_2,
            progress_interval,
            summary,
        } => {
            let opts = inputs.into_options(progress_interval);
            let run = pairing::pair(&opts, &out_1, &out_2)?;

            if let Some(path) = summary {
                run.write(&path)?;
            }

            info!("Completed successfully.")
        }
        Commands::Scan { inputs, summary } => {
            let opts = inputs.into_options(matcher::PROGRESS_INTERVAL);
            let run = pairing::scan(&opts)?;

            println!("{}", run.to_json_pretty()?);

            if let Some(path) = summary {
                run.write(&path)?;
            }
        }
    };
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
