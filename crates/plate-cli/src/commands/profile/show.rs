use plate_core::{AppKind, Profile};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
pub(super) struct ProfileResponse {
    pub app: AppKind,
    pub user_id: Option<String>,
    pub demo: bool,
    pub profile: Option<Profile>,
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let snapshot = ctx.resolved().await;
    output(
        &ProfileResponse {
            app: ctx.manager.app_kind(),
            user_id: snapshot.identity_id().map(str::to_string),
            demo: !snapshot.is_configured,
            profile: snapshot.profile,
        },
        flags.format,
    )
}
