mod cli;
mod commands;
mod logging;
mod models;
mod services;
mod utils;

use crate::cli::parser::{Cli, Commands};
use crate::commands::extract::ExtractOptions;
use crate::logging::init::init_logging;
use crate::models::config::Config;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.debug, cli.quiet);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Extract {
            source,
            output_dir,
            no_recursive,
            max_iterations,
            json,
        } => commands::extract::run(
            &config,
            ExtractOptions {
                source,
                output_dir,
                no_recursive,
                max_iterations,
                json,
            },
        ),
        Commands::Decode { archive, output_dir } => {
            commands::decode::run(&config, &archive, output_dir.as_deref())
        }
        Commands::Classify { paths } => {
            commands::classify::run(&paths);
            Ok(())
        }
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
