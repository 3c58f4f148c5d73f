//! Demo-mode fallbacks.
//!
//! When the hosted backend is not configured the session layer never contacts
//! it and instead publishes these fixed records as an authenticated identity:
//!
//! | App     | Identity id   | Email              | Profile                                   |
//! |---------|---------------|--------------------|-------------------------------------------|
//! | console | `demo-user`   | `demo@plate.local` | `BusinessUser` owner of `demo-business`   |
//! | webapp  | `demo-user`   | `demo@plate.local` | `CustomerProfile` "Demo Diner"            |

use crate::enums::{AppKind, BusinessRole};
use crate::identity::Identity;
use crate::profile::{BusinessUser, CustomerProfile, Profile};

pub const DEMO_USER_ID: &str = "demo-user";
pub const DEMO_EMAIL: &str = "demo@plate.local";
pub const DEMO_BUSINESS_ID: &str = "demo-business";
pub const DEMO_BUSINESS_USER_ID: &str = "demo-business-user";
pub const DEMO_DISPLAY_NAME: &str = "Demo Diner";

#[must_use]
pub fn identity() -> Identity {
    Identity {
        id: DEMO_USER_ID.to_string(),
        email: Some(DEMO_EMAIL.to_string()),
        provider: Some("demo".to_string()),
    }
}

#[must_use]
pub fn profile(app: AppKind) -> Profile {
    match app {
        AppKind::Console => Profile::Business(BusinessUser {
            id: DEMO_BUSINESS_USER_ID.to_string(),
            user_id: DEMO_USER_ID.to_string(),
            email: Some(DEMO_EMAIL.to_string()),
            role: BusinessRole::Owner,
            business_id: DEMO_BUSINESS_ID.to_string(),
        }),
        AppKind::Webapp => Profile::Customer(CustomerProfile {
            user_id: DEMO_USER_ID.to_string(),
            display_name: Some(DEMO_DISPLAY_NAME.to_string()),
            username: Some("demo".to_string()),
            avatar_url: None,
            bio: None,
        }),
    }
}
