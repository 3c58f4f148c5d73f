mod login;
mod logout;
mod signup;
mod status;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;
use crate::context::AppContext;

/// Handle `plate auth <subcommand>`.
pub async fn handle(
    action: &AuthCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::Login(args) => login::handle(args, ctx, flags).await,
        AuthCommands::Signup(args) => signup::handle(args, ctx, flags).await,
        AuthCommands::Logout => logout::handle(ctx, flags).await,
        AuthCommands::Status => status::handle(ctx, flags),
    }
}
