//! CLI argument definitions for the FCA workbench.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use fca_cli::steps::EditStep;

#[derive(Parser)]
#[command(
    name = "fca-workbench",
    version,
    about = "FCA workbench - explore formal contexts from the terminal",
    long_about = "Edit formal contexts and derive their concepts, lattice, canonical base\n\
                  and association rules.\n\n\
                  Without --context the last opened file is restored from the stored\n\
                  options, falling back to the built-in example."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Context file to open instead of the last opened one.
    #[arg(long = "context", value_name = "PATH", global = true)]
    pub context: Option<PathBuf>,

    /// Leave the stored options untouched on exit.
    #[arg(long = "no-remember", global = true)]
    pub no_remember: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the context as a cross table.
    Show,

    /// List all formal concepts.
    Concepts,

    /// Compute the concept lattice in the background and list its covers.
    Lattice,

    /// Print the Duquenne-Guigues canonical base.
    Implications,

    /// Print the Luxenburger basis of association rules.
    Associations(AssociationArgs),

    /// Apply edit steps in order, then print the resulting context.
    Edit(EditArgs),

    /// Show the stored options.
    Options,
}

#[derive(Parser)]
pub struct AssociationArgs {
    /// Minimal support, between 0 and 1.
    #[arg(long = "min-support", value_name = "FRACTION", default_value_t = 0.1)]
    pub min_support: f64,

    /// Minimal confidence, between 0 and 1.
    #[arg(long = "min-confidence", value_name = "FRACTION", default_value_t = 0.5)]
    pub min_confidence: f64,

    /// Print rules in their textual form instead of a table.
    #[arg(long = "lines")]
    pub lines: bool,
}

#[derive(Parser)]
pub struct EditArgs {
    /// Steps such as `add-object:child=juvenile`, `toggle:boy=male` or `undo`.
    #[arg(value_name = "STEP", required = true)]
    pub steps: Vec<EditStep>,

    /// Save the edited context to this file.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
