//! Command-line interface for `sift`.

mod cli;

use std::{env, io, process::ExitCode};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{args::Cli, commands, context::CommandContext};

/// Installs the stderr log subscriber. `SIFT_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let filter = if let Ok(env) = env::var("SIFT_LOG") {
        EnvFilter::new(env)
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = match CommandContext::load(cli.config) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    commands::run(cli.command, &ctx)
}
