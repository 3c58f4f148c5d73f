use plate_core::{AppKind, AuthPhase};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthStatusResponse {
    app: AppKind,
    configured: bool,
    phase: AuthPhase,
    authenticated: bool,
    user_id: Option<String>,
    email: Option<String>,
    expires_at: Option<String>,
    session_source: Option<&'static str>,
    cached_queries: usize,
    note: Option<String>,
}

pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let snapshot = ctx.manager.snapshot();
    let identity = snapshot.identity.as_ref();

    let note = if !snapshot.is_configured {
        Some("backend not configured; running in demo mode".to_string())
    } else if !snapshot.is_authenticated() {
        Some("no active session".to_string())
    } else {
        None
    };

    let status = AuthStatusResponse {
        app: ctx.manager.app_kind(),
        configured: snapshot.is_configured,
        phase: snapshot.phase,
        authenticated: snapshot.is_authenticated(),
        user_id: identity.map(|identity| identity.id.clone()),
        email: identity.and_then(|identity| identity.email.clone()),
        expires_at: snapshot
            .session
            .as_ref()
            .map(|session| session.expires_at.to_rfc3339()),
        session_source: ctx
            .hosted
            .as_ref()
            .and_then(|hosted| hosted.session_store())
            .and_then(plate_auth::SessionStore::detect_source),
        cached_queries: ctx.cache.len(),
        note,
    };

    output(&status, flags.format)
}
