//! Implementation of `sift fields`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use sift_compile::{FieldBoost, FieldIterator};
use sift_config::Config;

use crate::cli::{args::FieldsCommand, context::CommandContext};

/// Shows the fields a term is scored on, with their effective boosts.
pub fn run(ctx: &CommandContext, cmd: &FieldsCommand) -> ExitCode {
    let config = match ctx.config_with_languages(cmd.languages.chain()) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let fields = scored_fields(&config, cmd.phrase, cmd.stem);
    if fields.is_empty() {
        println!("No field is scored; check the [boost] section.");
        return ExitCode::SUCCESS;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Field", "Boost"]);
    for fb in &fields {
        table.add_row(vec![Cell::new(&fb.field), Cell::new(format!("{:.4}", fb.boost))]);
    }
    println!("{table}");

    ExitCode::SUCCESS
}

/// Returns the scored fields for words, or for phrases when `phrase` is set.
fn scored_fields(config: &Config, phrase: bool, stem: bool) -> Vec<FieldBoost> {
    let roster = &config.fields;
    let languages = config.search.languages.clone();
    if !phrase {
        return FieldIterator::new(config, roster.all_fields(), languages).collect();
    }

    let candidates = if stem {
        roster.stemmed_fields()
    } else {
        roster.plain_fields()
    };
    FieldIterator::new(
        config,
        candidates
            .into_iter()
            .filter(|field| !roster.lacks_positions(field)),
        languages,
    )
    .excluding(&roster.no_positions)
    .collect()
}
