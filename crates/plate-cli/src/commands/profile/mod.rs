mod refresh;
mod show;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProfileCommands;
use crate::context::AppContext;

/// Handle `plate profile <subcommand>`.
pub async fn handle(
    action: &ProfileCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if !ctx.manager.snapshot().is_authenticated() {
        anyhow::bail!("not signed in; run `plate auth login` first");
    }

    match action {
        ProfileCommands::Show => show::handle(ctx, flags).await,
        ProfileCommands::Refresh => refresh::handle(ctx, flags).await,
    }
}
