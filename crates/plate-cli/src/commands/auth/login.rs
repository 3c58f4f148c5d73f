use std::time::Duration;

use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthLoginArgs;
use crate::context::AppContext;
use crate::output::output;

/// How long to wait for the `SIGNED_IN` notification after the backend
/// accepted the credentials.
const SIGNED_IN_WAIT: Duration = Duration::from_secs(5);

pub async fn handle(
    args: &AuthLoginArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let identity = ctx.manager.sign_in(&args.email, &args.password).await?;
    ctx.await_identity(&identity.id, SIGNED_IN_WAIT)
        .await
        .context("signed in, but the session layer never observed the new identity")?;

    let snapshot = ctx.resolved().await;
    tracing::info!(user_id = %identity.id, "signed in");
    output(&snapshot, flags.format)
}
