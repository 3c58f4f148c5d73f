//! Data-store client speaking the hosted REST API.
//!
//! Calls the REST endpoint directly via `reqwest` with the caller's access
//! token on every request. It holds no auth state of its own, so a lookup
//! never re-enters the auth collaborator.

use plate_config::BackendConfig;

use crate::error::LookupError;

#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    rest_url: String,
    anon_key: String,
}

impl RestClient {
    #[must_use]
    pub fn new(backend: &BackendConfig) -> Self {
        Self::with_base(backend.rest_url(), backend.anon_key.clone())
    }

    /// Client against an explicit REST base URL (e.g. `http://127.0.0.1:54321/rest/v1`).
    #[must_use]
    pub fn with_base(rest_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            rest_url: rest_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Fetch the single row of `table` where `column` equals `value`.
    ///
    /// `access_token` is sent as the bearer credential; `None` falls back to
    /// the anonymous key.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::NotFound` for zero rows, `LookupError::Status` for
    /// non-2xx responses, and `LookupError::Network`/`Decode` for transport or
    /// body failures.
    pub async fn select_one(
        &self,
        table: &str,
        column: &str,
        value: &str,
        access_token: Option<&str>,
    ) -> Result<serde_json::Value, LookupError> {
        let url = format!(
            "{base}/{table}?select=*&{column}=eq.{value}&limit=1",
            base = self.rest_url,
            value = urlencoding::encode(value),
        );
        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer(access_token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| LookupError::Network(format!("select {table}: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LookupError::Status { status, body });
        }

        let rows: Vec<serde_json::Value> = resp
            .json()
            .await
            .map_err(|e| LookupError::Decode(format!("select {table}: {e}")))?;

        rows.into_iter().next().ok_or(LookupError::NotFound)
    }

    /// Insert `row` into `table`, merging on `on_conflict` if it already exists.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::Status` for non-2xx responses and
    /// `LookupError::Network` for transport failures.
    pub async fn upsert(
        &self,
        table: &str,
        row: &serde_json::Value,
        on_conflict: &str,
        access_token: Option<&str>,
    ) -> Result<(), LookupError> {
        let url = format!(
            "{base}/{table}?on_conflict={conflict}",
            base = self.rest_url,
            conflict = urlencoding::encode(on_conflict),
        );
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer(access_token))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| LookupError::Network(format!("upsert {table}: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LookupError::Status { status, body });
        }
        Ok(())
    }

    fn bearer(&self, access_token: Option<&str>) -> String {
        format!("Bearer {}", access_token.unwrap_or(&self.anon_key))
    }
}
