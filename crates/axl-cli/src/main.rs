//! AXL - Main Entry Point

use std::error::Error;

use axl_cli::Config;

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    log::info!("analyzing {} file(s)", config.files.len());

    match axl_cli::run(&config) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("axl: {e:#}");
            std::process::exit(2);
        }
    }
}
