use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{AppArg, GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `plate` binary.
#[derive(Debug, Parser)]
#[command(
    name = "plate",
    version,
    about = "Plate session layer - sign in, inspect profiles, watch session changes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Which app to act as: console, webapp (overrides PLATE_APP__KIND)
    #[arg(short, long, global = true)]
    pub app: Option<AppArg>,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            app: self.app.map(Into::into),
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}
