//! Implementation of `sift parse`.

use std::process::ExitCode;

use sift_query::parse;

use crate::cli::args::ParseCommand;

/// Prints the syntax tree of a query.
pub fn run(cmd: &ParseCommand) -> ExitCode {
    match parse(&cmd.query) {
        Ok(query) => {
            match query.root() {
                Some(root) => print!("{root}"),
                None => println!("(empty query)"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.to_string().trim_end());
            ExitCode::FAILURE
        }
    }
}
