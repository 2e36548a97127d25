// Tunic Sync - keeps the player model's body in step with the equipped tunic
//
// This is the library crate containing the synchronizer, the host boundary and
// the lifecycle hooks. The binary crate (main.rs) replays scripted sessions.

pub mod config;
pub mod hooks;
pub mod host;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod session;
pub mod sync;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use hooks::{PlayerActor, PlayerExtension};
pub use host::{HostLifecycle, HostServices, ModelHandle, ResourceHandle};
pub use models::{AgeState, Scenario, SyncConfig, Variant, derive_desired_variant};
pub use sync::{SyncEvent, SynchronizerState, TunicSynchronizer};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
