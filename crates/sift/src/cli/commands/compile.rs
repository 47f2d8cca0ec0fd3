//! Implementation of `sift compile`.

use std::process::ExitCode;

use sift_compile::{CompiledQuery, LexiconRecognizer, QueryCompiler};
use sift_query::parse_with_keywords;

use crate::cli::{args::CompileCommand, context::CommandContext};

/// Compiles each query and prints it as query DSL, one JSON document per query.
///
/// Empty queries print `null`. Compilation warnings are echoed to stderr.
pub fn run(ctx: &CommandContext, cmd: &CompileCommand) -> ExitCode {
    let config = match ctx.config_with_languages(cmd.languages.chain()) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let recognizer = LexiconRecognizer::new(&config.lexicon);
    let compiler = QueryCompiler::new(&config, &recognizer);
    let keywords = compiler.keyword_names();

    for input in &cmd.queries {
        let query = match parse_with_keywords(input, &keywords) {
            Ok(query) => query,
            Err(e) => {
                eprintln!("{}", e.to_string().trim_end());
                return ExitCode::FAILURE;
            }
        };

        let compiled = match compiler.compile(&query) {
            Ok(compiled) => compiled,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        };

        if let Some(compiled) = &compiled {
            for warning in &compiled.warnings {
                eprintln!("warning: {warning}");
            }
        }

        match render(compiled.as_ref(), cmd.compact) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize query: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Renders a compiled query as JSON.
fn render(compiled: Option<&CompiledQuery>, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(&compiled)
    } else {
        serde_json::to_string_pretty(&compiled)
    }
}
