//! Token lifetime: expiry decoding and background refresh.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::task::JoinHandle;

use crate::backend::AuthBackend;
use crate::error::AuthError;
use crate::hosted::HostedAuth;

/// Wait before retrying a refresh that failed for a transient reason.
const RETRY_DELAY: Duration = Duration::from_secs(10);

/// Decode JWT `exp` claim without signature validation.
///
/// Only used to learn when an access token lapses; the service validates
/// the token on every request.
///
/// # Errors
///
/// Returns `AuthError::Unknown` if the JWT format is invalid or the `exp`
/// claim is missing or cannot be parsed.
pub fn decode_expiry(jwt: &str) -> Result<DateTime<Utc>, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::Unknown("invalid JWT format".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| AuthError::Unknown(format!("base64 decode failed: {e}")))?;
    let value: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|e| AuthError::Unknown(format!("JSON parse failed: {e}")))?;
    let exp = value["exp"]
        .as_i64()
        .ok_or_else(|| AuthError::Unknown("missing exp claim".into()))?;
    DateTime::from_timestamp(exp, 0).ok_or_else(|| AuthError::Unknown("invalid exp timestamp".into()))
}

/// How long to wait before refreshing a session that lapses at `expires_at`.
///
/// Zero when the session is already inside the margin.
#[must_use]
pub fn refresh_delay(expires_at: DateTime<Utc>, margin_secs: i64, now: DateTime<Utc>) -> Duration {
    (expires_at - TimeDelta::seconds(margin_secs) - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Keep `auth`'s session fresh until the returned task is aborted.
///
/// Refreshes `margin_secs` before expiry. A refresh the service rejects
/// ends the session (the refresh token is no longer usable); other
/// failures are retried.
#[must_use]
pub fn spawn_auto_refresh(auth: Arc<HostedAuth>, margin_secs: i64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut changes = auth.subscribe();
        let mut retry_at: Option<tokio::time::Instant> = None;

        loop {
            let Some(session) = auth.current_session() else {
                retry_at = None;
                if changes.recv().await.is_none() {
                    return;
                }
                continue;
            };

            let due = retry_at.unwrap_or_else(|| {
                tokio::time::Instant::now() + refresh_delay(session.expires_at, margin_secs, Utc::now())
            });

            tokio::select! {
                event = changes.recv() => {
                    if event.is_none() {
                        return;
                    }
                    retry_at = None;
                }
                () = tokio::time::sleep_until(due) => {
                    retry_at = match auth.refresh_session().await {
                        Ok(_) => None,
                        Err(error) if error.is_rejection() => {
                            tracing::warn!(%error, "session refresh rejected; signing out");
                            if let Err(error) = auth.sign_out().await {
                                tracing::debug!(%error, "remote sign-out after rejected refresh failed");
                            }
                            None
                        }
                        Err(error) => {
                            tracing::warn!(%error, retry_in = ?RETRY_DELAY, "session refresh failed");
                            Some(tokio::time::Instant::now() + RETRY_DELAY)
                        }
                    };
                }
            }
        }
    })
}
