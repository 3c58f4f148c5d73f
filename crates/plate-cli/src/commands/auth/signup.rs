use std::time::Duration;

use anyhow::Context;
use plate_auth::SignUpDetails;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthSignupArgs;
use crate::context::AppContext;
use crate::output::output;

/// How long to wait for the `SIGNED_IN` notification of an auto-confirmed
/// account.
const SIGNED_IN_WAIT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct AuthSignupResponse {
    email: String,
    /// False when the service requires email confirmation first.
    signed_in: bool,
    user_id: String,
}

pub async fn handle(
    args: &AuthSignupArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let details = SignUpDetails {
        display_name: args.display_name.clone(),
        username: args.username.clone(),
        business_id: args.business_id.clone(),
        role: args.role.map(Into::into),
    };

    let outcome = ctx
        .manager
        .sign_up(&args.email, &args.password, &details)
        .await?;

    let signed_in = outcome.session.is_some();
    if signed_in {
        ctx.await_identity(&outcome.identity.id, SIGNED_IN_WAIT)
            .await
            .context("signed up, but the session layer never observed the new identity")?;
    }

    output(
        &AuthSignupResponse {
            email: args.email.clone(),
            signed_in,
            user_id: outcome.identity.id,
        },
        flags.format,
    )
}
