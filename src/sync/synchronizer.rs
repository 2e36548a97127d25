use super::state::SynchronizerState;
use super::transition::{Decision, Trigger, decide};
use crate::host::{HostServices, ModelHandle};
use crate::metrics::SyncMetrics;
use crate::models::{Variant, derive_desired_variant};
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::broadcast;

/// Default capacity of the event broadcast channel
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// Why a rebuild ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildCause {
    /// Per-frame check found the model out of date
    Divergence,
    /// Pause overlay closed
    PauseExit,
    /// Deferred rebuild reached a safe checkpoint
    PendingResolved,
}

/// Events emitted by the synchronizer
///
/// Every entry point returns the events it produced and also publishes them
/// to subscribers (see [`TunicSynchronizer::subscribe`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Rebuilt {
        variant: Variant,
        cause: RebuildCause,
    },

    /// A rebuild was deferred; `replaced` is the pending value it overwrote
    Deferred {
        variant: Variant,
        replaced: Option<Variant>,
    },

    PendingCancelled {
        variant: Variant,
    },

    /// A rebuild was abandoned; the model keeps its previous variant
    RebuildSkipped {
        variant: Variant,
        reason: String,
    },

    /// Character left the mature age
    WentDormant,
}

/// Errors from the rebuild path
///
/// None of these reach the host: lifecycle entry points log them and report
/// a [`SyncEvent::RebuildSkipped`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("No resource backs variant {variant}")]
    ResourceNotFound { variant: Variant },

    #[error("Invalid context: {0}")]
    InvalidContext(String),
}

/// Keeps the mature player model's body in step with the equipped tunic.
///
/// One instance per player actor. The host calls in from its own tick:
/// - [`on_post_update`](Self::on_post_update) after the host's per-frame
///   update, every tick
/// - [`on_equipment_written`](Self::on_equipment_written) after the host's
///   equipment routine ran
///
/// Rebuilds only happen from the post-update hook, outside pause. Changes
/// seen anywhere else become a single pending rebuild.
pub struct TunicSynchronizer {
    state: SynchronizerState,
    events_tx: broadcast::Sender<SyncEvent>,
    metrics: SyncMetrics,
    /// Variants whose missing resource has already been logged at warn level
    reported_misses: HashSet<Variant>,
}

impl TunicSynchronizer {
    pub fn new(state: SynchronizerState) -> Self {
        Self::with_event_buffer(state, DEFAULT_EVENT_BUFFER)
    }

    pub fn with_event_buffer(state: SynchronizerState, capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            state,
            events_tx,
            metrics: SyncMetrics::new(),
            reported_misses: HashSet::new(),
        }
    }

    /// Synchronizer for an actor the host just initialized.
    pub fn from_host<H: HostServices + ?Sized>(host: &H) -> Self {
        Self::new(SynchronizerState::from_host(host))
    }

    pub fn state(&self) -> &SynchronizerState {
        &self.state
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events_tx.subscribe()
    }

    /// Re-derive the state from the host after actor (re)initialization.
    pub fn reset<H: HostServices + ?Sized>(&mut self, host: &H) {
        self.state = SynchronizerState::from_host(host);
        tracing::debug!("Synchronizer reset: {:?}", self.state.phase());
    }

    /// Rebuild the model for `variant` right now.
    ///
    /// Only call from a safe context. Runs the host's pre-rebuild refresh,
    /// reconstruction and subsystem reinit in that order, then tags the model
    /// with `variant`. Does not touch the synchronizer state.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidContext`] without a model, outside the mature
    ///   age, or for [`Variant::NotApplicable`]
    /// - [`SyncError::ResourceNotFound`] when the archive lacks the variant;
    ///   the model is left untouched
    pub fn rebuild_immediate<H: HostServices + ?Sized>(
        &self,
        host: &mut H,
        model: Option<ModelHandle>,
        variant: Variant,
    ) -> Result<(), SyncError> {
        let model = model.ok_or_else(|| SyncError::InvalidContext("no player model".to_string()))?;

        if !host.age_state().is_mature() {
            return Err(SyncError::InvalidContext(
                "character is not mature".to_string(),
            ));
        }
        if !variant.is_applicable() {
            return Err(SyncError::InvalidContext(
                "variant does not apply".to_string(),
            ));
        }

        let resource = host
            .lookup_variant_resource(model, variant)
            .ok_or(SyncError::ResourceNotFound { variant })?;

        host.pre_rebuild_init(model);
        host.reconstruct_model(model, resource);
        host.post_rebuild_reinit(model);
        host.set_model_variant(model, variant);

        self.metrics.record_rebuild();
        tracing::info!("Rebuilt player model {:?} as {}", model, variant);
        Ok(())
    }

    /// Safe checkpoint: run the pending rebuild if there is one.
    ///
    /// A no-op while `pause_active`, outside the mature age, or with nothing
    /// pending. Otherwise clears the pending value, rebuilds, and re-applies
    /// equipment so it binds to the new model.
    pub fn resolve_pending<H: HostServices + ?Sized>(
        &mut self,
        host: &mut H,
        model: Option<ModelHandle>,
        pause_active: bool,
    ) -> Vec<SyncEvent> {
        let trigger = Trigger::Checkpoint {
            age: host.age_state(),
            pause_active,
        };
        let decision = decide(&self.state, trigger);
        self.execute(host, model, decision, RebuildCause::PendingResolved)
    }

    /// Post-update hook, called every tick after the host's per-frame update.
    pub fn on_post_update<H: HostServices + ?Sized>(
        &mut self,
        host: &mut H,
        model: Option<ModelHandle>,
    ) -> Vec<SyncEvent> {
        self.metrics.record_frame();

        let pause_active = host.is_pause_active();
        let mut events = self.resolve_pending(host, model, pause_active);

        let age = host.age_state();
        let desired = derive_desired_variant(age, host.equipment_bits());

        if self.state.last_pause && !pause_active {
            // A failed checkpoint rebuild counts too: the frame check below
            // retries on its own.
            let attempted_this_tick = events.iter().any(|event| {
                matches!(event, SyncEvent::Rebuilt { .. } | SyncEvent::RebuildSkipped { .. })
            });
            let trigger = Trigger::PauseExit {
                age,
                desired,
                attempted_this_tick,
            };
            let decision = decide(&self.state, trigger);
            events.extend(self.execute(host, model, decision, RebuildCause::PauseExit));
        }
        self.state.last_pause = pause_active;

        let trigger = Trigger::Frame {
            age,
            desired,
            pause_active,
        };
        let decision = decide(&self.state, trigger);
        events.extend(self.execute(host, model, decision, RebuildCause::Divergence));

        events
    }

    /// Equipment-write hook, called after the host's equipment routine.
    ///
    /// `previous` is the model's variant tag captured before the routine
    /// ran. Never rebuilds: a change becomes the pending rebuild.
    pub fn on_equipment_written<H: HostServices + ?Sized>(
        &mut self,
        host: &mut H,
        model: Option<ModelHandle>,
        previous: Variant,
    ) -> Vec<SyncEvent> {
        let age = host.age_state();
        let trigger = Trigger::EquipmentWritten {
            age,
            desired: derive_desired_variant(age, host.equipment_bits()),
            previous,
        };
        let decision = decide(&self.state, trigger);
        self.execute(host, model, decision, RebuildCause::Divergence)
    }

    fn execute<H: HostServices + ?Sized>(
        &mut self,
        host: &mut H,
        model: Option<ModelHandle>,
        decision: Decision,
        cause: RebuildCause,
    ) -> Vec<SyncEvent> {
        let events = match decision {
            Decision::Nothing => Vec::new(),

            Decision::ForceNotApplicable => {
                self.state.last_applied = Variant::NotApplicable;
                if let Some(dropped) = self.state.pending.take() {
                    tracing::debug!("Dropped pending rebuild to {} on leaving mature age", dropped);
                }
                vec![SyncEvent::WentDormant]
            }

            Decision::Rebuild(variant) => match self.rebuild_immediate(host, model, variant) {
                Ok(()) => {
                    self.state.last_applied = variant;
                    self.state.pending = None;
                    self.reported_misses.remove(&variant);
                    vec![SyncEvent::Rebuilt { variant, cause }]
                }
                Err(e) => vec![self.skipped(variant, e)],
            },

            Decision::Defer(variant) => {
                let replaced = self.state.pending.replace(variant);
                self.metrics.record_deferral();
                tracing::debug!("Deferred rebuild to {} (replaced {:?})", variant, replaced);
                vec![SyncEvent::Deferred { variant, replaced }]
            }

            Decision::CancelPending => match self.state.pending.take() {
                Some(variant) => {
                    self.metrics.record_cancellation();
                    tracing::debug!("Cancelled pending rebuild to {}", variant);
                    vec![SyncEvent::PendingCancelled { variant }]
                }
                None => Vec::new(),
            },

            Decision::ResolvePending(variant) => {
                self.state.pending = None;
                match self.rebuild_immediate(host, model, variant) {
                    Ok(()) => {
                        self.state.last_applied = variant;
                        self.reported_misses.remove(&variant);
                        if let Some(model) = model {
                            host.apply_equipment(model);
                        }
                        vec![SyncEvent::Rebuilt {
                            variant,
                            cause: RebuildCause::PendingResolved,
                        }]
                    }
                    Err(e) => vec![self.skipped(variant, e)],
                }
            }
        };

        for event in &events {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.events_tx.send(event.clone());
        }
        events
    }

    fn skipped(&mut self, variant: Variant, error: SyncError) -> SyncEvent {
        match &error {
            SyncError::ResourceNotFound { .. } => {
                self.metrics.record_resource_miss();
                // Warn once per variant; the frame check retries every tick.
                if self.reported_misses.insert(variant) {
                    tracing::warn!("Rebuild to {} skipped: {}", variant, error);
                } else {
                    tracing::debug!("Rebuild to {} skipped again: {}", variant, error);
                }
            }
            SyncError::InvalidContext(_) => {
                self.metrics.record_invalid_context();
                tracing::debug!("Rebuild to {} skipped: {}", variant, error);
            }
        }
        SyncEvent::RebuildSkipped {
            variant,
            reason: error.to_string(),
        }
    }
}

impl Default for TunicSynchronizer {
    fn default() -> Self {
        Self::new(SynchronizerState::default())
    }
}
