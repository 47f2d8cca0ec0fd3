//! Clap argument definitions for the `sift` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Compile multi-language search queries into weighted document-engine queries")]
pub struct Cli {
    /// Configuration file to use instead of discovering .sift.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v for debug logs, -vv for trace logs)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared language fallback chain override.
#[derive(Args, Debug, Clone, Default)]
pub struct LanguageArgs {
    /// Language fallback chain, primary first (e.g. en,fr)
    #[arg(short = 'l', long, value_delimiter = ',')]
    pub languages: Vec<String>,
}

impl LanguageArgs {
    /// Returns the override, if any languages were given.
    pub fn chain(&self) -> Option<&[String]> {
        (!self.languages.is_empty()).then_some(self.languages.as_slice())
    }
}

/// Arguments for `sift compile`.
#[derive(Args, Debug, Clone)]
pub struct CompileCommand {
    /// Queries to compile
    #[arg(required = true)]
    pub queries: Vec<String>,

    #[command(flatten)]
    /// Language overrides.
    pub languages: LanguageArgs,

    /// Print each compiled query on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for `sift parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Query to parse
    pub query: String,
}

/// Arguments for `sift fields`.
#[derive(Args, Debug, Clone)]
pub struct FieldsCommand {
    #[command(flatten)]
    /// Language overrides.
    pub languages: LanguageArgs,

    /// Show the fields a phrase is matched against
    #[arg(long)]
    pub phrase: bool,

    /// With --phrase, show the fields of a stemmed phrase
    #[arg(long, requires = "phrase")]
    pub stem: bool,
}

/// Arguments for `sift init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `sift` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Compile queries and print them as query DSL
    #[command(after_help = "\
QUERY SYNTAX:
  cat dog                   Words, every word must appear
  \"black cat\"               Exact phrase
  \"black cat\"~2             Phrase with slop
  \"black cats\"~             Stemmed phrase
  kitten~ / kitten~1        Fuzzy term
  kitt*                     Prefix
  -dog                      Exclude
  cat OR dog                Either
  (a b) OR c                Grouping
  custommatch:depicts=Q146  Match a configured custom match profile

EXAMPLES:
  sift compile 'black cat -dog'
  sift compile --languages de,en 'katze'
  sift compile --compact 'sunset custommatch:depicts=Q146'")]
    Compile(CompileCommand),

    /// Show the syntax tree of a query
    Parse(ParseCommand),

    /// Show the scored fields and their boosts
    Fields(FieldsCommand),

    /// Show effective configuration settings
    Config,

    /// Validate configuration and report issues
    Check,

    /// Initialize sift configuration in current directory
    Init(InitCommand),
}
