use clap::{Args, Subcommand};

use crate::cli::subcommands::{AuthCommands, ProfileCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Sign in, sign up, sign out, inspect the session.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Profile of the signed-in identity.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Print every session snapshot as it is published, until Ctrl-C.
    Watch(WatchArgs),
}

#[derive(Clone, Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many snapshots.
    #[arg(long)]
    pub count: Option<usize>,
}
