//! Main application entry point.

use std::process::ExitCode;

use clap::Parser;
use isogrid_app::{Cli, run};

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Isogrid");

    match run(Cli::parse()) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
