//! Application profiles derived from an identity.
//!
//! Profiles are never authoritative: they are looked up by identity id from
//! the data store and validated here, at the lookup boundary, before anything
//! downstream sees them.

use serde::{Deserialize, Serialize};

use crate::enums::{AppKind, BusinessRole};
use crate::errors::CoreError;

/// Console user record (`business_users` row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessUser {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: BusinessRole,
    pub business_id: String,
}

/// Webapp user record (`profiles` row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Profile resolved for the signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Profile {
    Business(BusinessUser),
    Customer(CustomerProfile),
}

impl Profile {
    /// Validate a raw data-store row as the profile variant for `app`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the row is missing required fields,
    /// carries an unknown role, or has an empty `user_id`.
    pub fn from_row(app: AppKind, row: serde_json::Value) -> Result<Self, CoreError> {
        let profile = match app {
            AppKind::Console => serde_json::from_value::<BusinessUser>(row)
                .map(Self::Business)
                .map_err(|e| CoreError::Validation(format!("business_users row: {e}")))?,
            AppKind::Webapp => serde_json::from_value::<CustomerProfile>(row)
                .map(Self::Customer)
                .map_err(|e| CoreError::Validation(format!("profiles row: {e}")))?,
        };

        if profile.user_id().is_empty() {
            return Err(CoreError::Validation("profile row has empty user_id".into()));
        }
        Ok(profile)
    }

    /// Identity id this profile belongs to.
    #[must_use]
    pub fn user_id(&self) -> &str {
        match self {
            Self::Business(user) => &user.user_id,
            Self::Customer(profile) => &profile.user_id,
        }
    }

    #[must_use]
    pub const fn app_kind(&self) -> AppKind {
        match self {
            Self::Business(_) => AppKind::Console,
            Self::Customer(_) => AppKind::Webapp,
        }
    }

    #[must_use]
    pub const fn as_business(&self) -> Option<&BusinessUser> {
        match self {
            Self::Business(user) => Some(user),
            Self::Customer(_) => None,
        }
    }

    #[must_use]
    pub const fn as_customer(&self) -> Option<&CustomerProfile> {
        match self {
            Self::Customer(profile) => Some(profile),
            Self::Business(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn business_row_validates() {
        let profile = Profile::from_row(
            AppKind::Console,
            json!({
                "id": "bu-1",
                "user_id": "u1",
                "email": "owner@bistro.test",
                "role": "manager",
                "business_id": "biz-9",
                "created_at": "2024-01-01T00:00:00Z"
            }),
        )
        .expect("valid row");

        assert_eq!(profile.user_id(), "u1");
        assert_eq!(profile.app_kind(), AppKind::Console);
        let user = profile.as_business().expect("business variant");
        assert_eq!(user.role, BusinessRole::Manager);
        assert_eq!(user.business_id, "biz-9");
    }

    #[test]
    fn business_row_with_unknown_role_is_rejected() {
        let err = Profile::from_row(
            AppKind::Console,
            json!({"id": "bu-1", "user_id": "u1", "role": "admin", "business_id": "b"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("business_users row"));
    }

    #[test]
    fn customer_row_allows_missing_optionals() {
        let profile =
            Profile::from_row(AppKind::Webapp, json!({"user_id": "u2"})).expect("valid row");
        let customer = profile.as_customer().expect("customer variant");
        assert_eq!(customer.user_id, "u2");
        assert!(customer.display_name.is_none());
        assert!(profile.as_business().is_none());
    }

    #[test]
    fn empty_user_id_is_rejected() {
        let err = Profile::from_row(AppKind::Webapp, json!({"user_id": ""})).unwrap_err();
        assert!(err.to_string().contains("empty user_id"));
    }

    #[test]
    fn profile_serializes_with_kind_tag() {
        let profile = Profile::Customer(CustomerProfile {
            user_id: "u2".into(),
            display_name: Some("Sam".into()),
            username: None,
            avatar_url: None,
            bio: None,
        });
        let value = serde_json::to_value(&profile).expect("serialize");
        assert_eq!(value["kind"], "customer");
        assert_eq!(value["display_name"], "Sam");
    }
}
