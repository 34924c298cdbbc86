mod cli;
mod config;
mod execlog;
mod explain;
mod history;
mod identity;
mod model;
mod render;

use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics (corrupt history entries, unconfident normalization) go
    // to stderr via tracing; the report itself goes to stdout or --out.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match config::Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
