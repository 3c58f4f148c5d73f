//! # plate-core
//!
//! Shared types for the plate session layer.
//!
//! This crate provides the data model every other plate crate passes around:
//! - [`Identity`] and [`Session`] as issued by the hosted auth service
//! - Lifecycle notifications ([`AuthEvent`], [`AuthChangeEvent`])
//! - Application profiles for the two app kinds ([`Profile`])
//! - The read-only [`SessionSnapshot`] published to consumers
//! - Documented demo-mode fallbacks
//! - Cross-cutting error types

pub mod demo;
pub mod enums;
pub mod errors;
pub mod event;
pub mod identity;
pub mod profile;
pub mod snapshot;

pub use enums::{AppKind, AuthChangeEvent, AuthPhase, BusinessRole};
pub use errors::CoreError;
pub use event::AuthEvent;
pub use identity::{Identity, Session};
pub use profile::{BusinessUser, CustomerProfile, Profile};
pub use snapshot::SessionSnapshot;
