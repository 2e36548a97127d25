//! Tunic synchronization state machine.
//!
//! Detects when the equipped tunic no longer matches the variant the player
//! model was built for, and rebuilds the model exactly once per change at a
//! point where rebuilding cannot corrupt in-flight host state.
//!
//! # Components
//!
//! - [`SynchronizerState`] / [`SyncPhase`]: last applied variant, pending
//!   rebuild and pause edge tracker
//! - [`decide`]: the transition table, mapping a [`Trigger`] to a [`Decision`]
//! - [`TunicSynchronizer`]: executes decisions against [`crate::host::HostServices`]
//!
//! # Safe checkpoints
//!
//! The equipment routine can run mid-frame or inside the pause menu, so it
//! only ever records a pending rebuild. The post-update hook is the single
//! place rebuilds happen, in this order each tick:
//!
//! 1. resolve the pending rebuild unless paused
//! 2. on the pause-closed edge, force a rebuild unless step 1 already did one
//! 3. compare desired against applied; rebuild, or defer while paused

pub mod state;
pub mod synchronizer;
pub mod transition;

pub use state::{SyncPhase, SynchronizerState};
pub use synchronizer::{RebuildCause, SyncError, SyncEvent, TunicSynchronizer};
pub use transition::{Decision, Trigger, decide};
