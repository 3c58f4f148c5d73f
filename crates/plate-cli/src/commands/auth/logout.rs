use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthLogoutResponse {
    signed_out: bool,
    was_signed_in: bool,
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let was_signed_in = ctx.manager.snapshot().is_authenticated();
    ctx.manager.sign_out().await;
    output(
        &AuthLogoutResponse {
            signed_out: !ctx.manager.snapshot().is_authenticated(),
            was_signed_in,
        },
        flags.format,
    )
}
