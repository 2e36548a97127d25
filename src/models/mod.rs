//! Data models for the tunic synchronizer.
//!
//! - [`variant`]: age categories, tunic variants, the selector reader
//!   ([`derive_desired_variant`]) and the archive layout of the body models
//! - [`SyncConfig`]: archive layout and logging settings loaded from `Tunic Sync.yaml`
//! - [`Scenario`]: scripted sessions replayed by [`crate::session::SessionRunner`]

pub mod config;
pub mod scenario;
pub mod variant;

pub use config::{LoggingSettings, SyncConfig};
pub use scenario::{Scenario, Step};
pub use variant::{AgeState, BodyResourceIndices, Variant, derive_desired_variant};
