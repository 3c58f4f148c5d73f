use super::show::ProfileResponse;
use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let profile = ctx.manager.refresh_profile().await;
    if profile.is_none() {
        tracing::warn!("no profile row found for the signed-in identity");
    }

    let snapshot = ctx.manager.snapshot();
    output(
        &ProfileResponse {
            app: ctx.manager.app_kind(),
            user_id: snapshot.identity_id().map(str::to_string),
            demo: !snapshot.is_configured,
            profile,
        },
        flags.format,
    )
}
