use crate::host::HostServices;
use crate::models::{Variant, derive_desired_variant};

/// Named phase of the synchronizer, derived from [`SynchronizerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Character is not mature; the host owns the model entirely
    Dormant,

    /// Model reflects this variant and nothing is deferred
    Applied(Variant),

    /// A rebuild to `target` waits for the next safe checkpoint
    Pending { applied: Variant, target: Variant },
}

/// Per-actor synchronizer state.
///
/// Created when the player actor initializes and dropped with it. Mutated
/// only by [`super::TunicSynchronizer`] from the host's tick.
///
/// Invariants:
/// - `last_applied` is the variant the built model reflects, or
///   [`Variant::NotApplicable`] while not mature.
/// - `pending`, when set, differs from what the model was rebuilt for and
///   holds at most one value; newer deferrals overwrite it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynchronizerState {
    pub(super) last_applied: Variant,
    pub(super) last_pause: bool,
    pub(super) pending: Option<Variant>,
}

impl SynchronizerState {
    /// State of a freshly initialized actor: the host just built the model
    /// for the persisted selection, so it counts as applied.
    pub fn from_host<H: HostServices + ?Sized>(host: &H) -> Self {
        Self {
            last_applied: derive_desired_variant(host.age_state(), host.equipment_bits()),
            last_pause: host.is_pause_active(),
            pending: None,
        }
    }

    /// Build a state from explicit parts.
    pub fn from_parts(last_applied: Variant, pending: Option<Variant>, last_pause: bool) -> Self {
        Self {
            last_applied,
            last_pause,
            pending,
        }
    }

    pub fn last_applied(&self) -> Variant {
        self.last_applied
    }

    pub fn last_pause(&self) -> bool {
        self.last_pause
    }

    pub fn pending(&self) -> Option<Variant> {
        self.pending
    }

    pub fn phase(&self) -> SyncPhase {
        match (self.pending, self.last_applied) {
            (Some(target), applied) => SyncPhase::Pending { applied, target },
            (None, Variant::NotApplicable) => SyncPhase::Dormant,
            (None, applied) => SyncPhase::Applied(applied),
        }
    }
}

impl Default for SynchronizerState {
    fn default() -> Self {
        Self::from_parts(Variant::NotApplicable, None, false)
    }
}
