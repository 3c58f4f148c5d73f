use clap::ValueEnum;
use plate_core::AppKind;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Raw,
}

/// `--app` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum AppArg {
    Console,
    Webapp,
}

impl From<AppArg> for AppKind {
    fn from(value: AppArg) -> Self {
        match value {
            AppArg::Console => Self::Console,
            AppArg::Webapp => Self::Webapp,
        }
    }
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub app: Option<AppKind>,
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
}
