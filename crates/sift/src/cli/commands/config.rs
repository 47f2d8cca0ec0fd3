//! Implementation of `sift config`.

use std::process::ExitCode;

use crate::cli::context::CommandContext;

/// Shows effective configuration settings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = match ctx.config() {
        Ok(config) => config,
        Err(code) => return code,
    };

    match config.to_toml() {
        Ok(toml) => {
            if let Some(source) = &config.source {
                println!("# loaded from {}", source.display());
            } else {
                println!("# built-in defaults");
            }
            print!("{toml}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
