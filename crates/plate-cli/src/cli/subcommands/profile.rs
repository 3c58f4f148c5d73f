use clap::Subcommand;

/// Profile commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProfileCommands {
    /// Show the resolved profile of the signed-in identity.
    Show,
    /// Look the profile up again, bypassing the memo.
    Refresh,
}
