use clap::{Args, Subcommand, ValueEnum};
use plate_core::BusinessRole;

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Sign in with email and password.
    Login(AuthLoginArgs),
    /// Create an account and its profile row.
    Signup(AuthSignupArgs),
    /// Sign out locally and revoke the session remotely.
    Logout,
    /// Show current auth status.
    Status,
}

#[derive(Clone, Debug, Args)]
pub struct AuthLoginArgs {
    #[arg(long)]
    pub email: String,
    /// Account password (prefer PLATE_PASSWORD over the flag).
    #[arg(long, env = "PLATE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Clone, Debug, Args)]
pub struct AuthSignupArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "PLATE_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Display name shown to other users (webapp).
    #[arg(long)]
    pub display_name: Option<String>,
    /// Public username (webapp).
    #[arg(long)]
    pub username: Option<String>,
    /// Business the new console user belongs to (required for console sign-ups).
    #[arg(long)]
    pub business_id: Option<String>,
    /// Console role within the business (defaults to owner).
    #[arg(long, requires = "business_id")]
    pub role: Option<RoleArg>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RoleArg {
    Owner,
    Manager,
    Staff,
}

impl From<RoleArg> for BusinessRole {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Owner => Self::Owner,
            RoleArg::Manager => Self::Manager,
            RoleArg::Staff => Self::Staff,
        }
    }
}
