//! Command implementations and dispatch.

pub mod check;
pub mod compile;
pub mod config;
pub mod fields;
pub mod init;
pub mod parse;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Compile(cmd) => compile::run(ctx, &cmd),
        Commands::Parse(cmd) => parse::run(&cmd),
        Commands::Fields(cmd) => fields::run(ctx, &cmd),
        Commands::Config => config::run(ctx),
        Commands::Check => check::run(ctx),
        Commands::Init(cmd) => init::run(ctx, &cmd),
    }
}
