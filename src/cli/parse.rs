//! CLI parse: clap types for crescendo. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// Crescendo CLI - batch music review drafts from a markdown table
#[derive(Debug, Parser)]
#[command(name = "crescendo")]
#[command(about = "Generate short-form music review drafts for every row of a markdown table")]
pub struct Cli {
    /// Start the interactive session (the default when no arguments are given)
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Markdown table with one music entry per row
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory receiving one markdown file per review
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Keep the model's thinking trace in saved reviews
    #[arg(long)]
    pub keep_thinking: bool,

    /// Write placeholder reviews without calling the completion service
    #[arg(long)]
    pub simulate: bool,

    /// Leave existing review files untouched
    #[arg(long, conflicts_with = "overwrite")]
    pub skip_existing: bool,

    /// Regenerate and replace existing review files
    #[arg(long)]
    pub overwrite: bool,

    /// API key (overrides the configured environment variable)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model identifier sent to the completion service
    #[arg(long)]
    pub model: Option<String>,

    /// TOML configuration file path (replaces global and local config files)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging and the progress bar
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
