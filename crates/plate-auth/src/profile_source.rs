//! Where profiles come from.

use async_trait::async_trait;
use plate_core::{AppKind, BusinessRole, Identity, Profile};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, LookupError};
use crate::rest::RestClient;

/// Column every profile table is keyed on.
pub const PROFILE_KEY_COLUMN: &str = "user_id";

/// Optional fields captured at sign-up and written into the profile row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpDetails {
    pub display_name: Option<String>,
    pub username: Option<String>,
    /// Console only: business the new user belongs to.
    pub business_id: Option<String>,
    /// Console only. Defaults to `owner` (sign-up creates a business).
    pub role: Option<BusinessRole>,
}

impl SignUpDetails {
    /// User metadata sent alongside the sign-up request.
    #[must_use]
    pub fn metadata(&self) -> serde_json::Value {
        let mut data = serde_json::Map::new();
        if let Some(name) = &self.display_name {
            data.insert("display_name".into(), name.clone().into());
        }
        if let Some(username) = &self.username {
            data.insert("username".into(), username.clone().into());
        }
        serde_json::Value::Object(data)
    }

    /// Check that [`profile_row`](Self::profile_row) will produce a row the
    /// lookup side accepts.
    ///
    /// # Errors
    ///
    /// `InvalidSignUp` when a console sign-up has no (or a blank) business id.
    pub fn validate(&self, app: AppKind) -> Result<(), AuthError> {
        match app {
            AppKind::Console
                if self
                    .business_id
                    .as_deref()
                    .is_none_or(|id| id.trim().is_empty()) =>
            {
                Err(AuthError::InvalidSignUp(
                    "a console account needs a business id".into(),
                ))
            }
            AppKind::Console | AppKind::Webapp => Ok(()),
        }
    }

    /// Profile row to upsert for `identity` in `app`'s table.
    #[must_use]
    pub fn profile_row(&self, app: AppKind, identity: &Identity) -> serde_json::Value {
        match app {
            AppKind::Console => serde_json::json!({
                "user_id": identity.id,
                "email": identity.email,
                "role": self.role.unwrap_or(BusinessRole::Owner),
                "business_id": self.business_id,
            }),
            AppKind::Webapp => serde_json::json!({
                "user_id": identity.id,
                "display_name": self.display_name,
                "username": self.username,
            }),
        }
    }
}

/// Lookup and persistence of profile rows keyed by identity id.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    fn app_kind(&self) -> AppKind;

    /// Fetch and validate the profile of `identity_id`.
    async fn lookup(&self, identity_id: &str, access_token: &str) -> Result<Profile, LookupError>;

    /// Create or update the profile row of a newly registered identity.
    async fn upsert(
        &self,
        identity: &Identity,
        details: &SignUpDetails,
        access_token: Option<&str>,
    ) -> Result<(), LookupError>;
}

/// [`ProfileSource`] backed by the hosted REST data store.
#[derive(Debug, Clone)]
pub struct RestProfileSource {
    rest: RestClient,
    app: AppKind,
    table: String,
}

impl RestProfileSource {
    #[must_use]
    pub fn new(rest: RestClient, app: AppKind, table: impl Into<String>) -> Self {
        Self {
            rest,
            app,
            table: table.into(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl ProfileSource for RestProfileSource {
    fn app_kind(&self) -> AppKind {
        self.app
    }

    async fn lookup(&self, identity_id: &str, access_token: &str) -> Result<Profile, LookupError> {
        let row = self
            .rest
            .select_one(&self.table, PROFILE_KEY_COLUMN, identity_id, Some(access_token))
            .await?;
        Profile::from_row(self.app, row).map_err(|e| LookupError::Decode(e.to_string()))
    }

    async fn upsert(
        &self,
        identity: &Identity,
        details: &SignUpDetails,
        access_token: Option<&str>,
    ) -> Result<(), LookupError> {
        let row = details.profile_row(self.app, identity);
        self.rest
            .upsert(&self.table, &row, PROFILE_KEY_COLUMN, access_token)
            .await
    }
}
