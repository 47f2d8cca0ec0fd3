//! Implementation of `sift check`.

use std::process::ExitCode;

use sift_config::ConfigWarning;

use crate::cli::context::CommandContext;

/// Validates the configuration. Warnings make the command fail.
pub fn run(ctx: &CommandContext) -> ExitCode {
    println!("Checking configuration...");
    match ctx.config_file() {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("No configuration file found, checking built-in defaults."),
    }
    println!();

    let config = match ctx.config() {
        Ok(config) => config,
        Err(code) => return code,
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }

    println!("Warnings ({}):", warnings.len());
    for warning in &warnings {
        println!("  - {warning}");
    }
    println!();

    print_hints(&warnings);

    ExitCode::FAILURE
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<&str> = warnings.iter().map(hint).collect();
    hints.sort_unstable();
    hints.dedup();

    println!("Hints:");
    for hint in hints {
        println!("  - {hint}");
    }
}

/// Returns the hint for one warning.
fn hint(warning: &ConfigWarning) -> &'static str {
    match warning {
        ConfigWarning::DecayAboveOne { .. } => {
            "Decay factors are usually between 0 and 1 so fallback languages score lower."
        }
        ConfigWarning::NegativeWeight { .. } => "Boosts and decays must not be negative.",
        ConfigWarning::UnknownField { .. } => {
            "Add the field to [fields] or remove its [boost]/[decay] entry."
        }
        ConfigWarning::MissingPlainVariant { .. } => {
            "List every plain variant in [fields] plain or plain_templates."
        }
        ConfigWarning::EmptyFallbackChain => "Set [search] languages, e.g. languages = [\"en\"].",
        ConfigWarning::ProfileWithoutFields { .. } => {
            "Give every [custom_match.<profile>] a fields list; queries using it will fail."
        }
        ConfigWarning::TemplateWithoutPlaceholder { .. } => {
            "Language-aware templates must contain {lang}."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_warning_has_a_hint() {
        let warnings = [
            ConfigWarning::EmptyFallbackChain,
            ConfigWarning::ProfileWithoutFields {
                profile: "depicts".into(),
            },
            ConfigWarning::TemplateWithoutPlaceholder {
                template: "label".into(),
            },
        ];
        for warning in &warnings {
            assert!(!hint(warning).is_empty());
        }
    }
}
