//! Transition table of the synchronizer.
//!
//! [`decide`] is pure: it maps the current state and one observation to the
//! action the synchronizer must take. Executing the action against the host
//! is [`super::TunicSynchronizer`]'s job.

use super::state::SynchronizerState;
use crate::models::{AgeState, Variant};

/// An observation made at one of the synchronizer's entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Safe checkpoint right after the host's per-frame update
    Checkpoint { age: AgeState, pause_active: bool },

    /// Pause overlay closed since the previous frame
    PauseExit {
        age: AgeState,
        desired: Variant,
        attempted_this_tick: bool,
    },

    /// Per-frame comparison of desired against applied variant
    Frame {
        age: AgeState,
        desired: Variant,
        pause_active: bool,
    },

    /// The host's equipment routine just ran
    EquipmentWritten {
        age: AgeState,
        desired: Variant,
        previous: Variant,
    },
}

/// What the synchronizer does in response to a [`Trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Nothing,

    /// Record `NotApplicable` and drop any deferred rebuild
    ForceNotApplicable,

    /// Rebuild now; the caller is in a safe context
    Rebuild(Variant),

    /// Store a pending rebuild for the next safe checkpoint
    Defer(Variant),

    /// Drop the pending rebuild; the model already shows the selection
    CancelPending,

    /// Take the pending rebuild, run it and re-apply equipment
    ResolvePending(Variant),
}

pub fn decide(state: &SynchronizerState, trigger: Trigger) -> Decision {
    match trigger {
        Trigger::Checkpoint {
            age: AgeState::Mature,
            pause_active: false,
        } => match state.pending() {
            Some(variant) => Decision::ResolvePending(variant),
            None => Decision::Nothing,
        },
        Trigger::Checkpoint { .. } => Decision::Nothing,

        // Equipment changed entirely inside the menu leaves no other trace,
        // so closing the menu forces a rebuild unless the checkpoint just did one.
        Trigger::PauseExit {
            age: AgeState::Mature,
            desired,
            attempted_this_tick: false,
        } => Decision::Rebuild(desired),
        Trigger::PauseExit { .. } => Decision::Nothing,

        Trigger::Frame {
            age: AgeState::Young,
            ..
        } => {
            if state.last_applied() != Variant::NotApplicable || state.pending().is_some() {
                Decision::ForceNotApplicable
            } else {
                Decision::Nothing
            }
        }
        Trigger::Frame {
            age: AgeState::Mature,
            desired,
            pause_active,
        } => {
            if desired == state.last_applied() {
                if state.pending().is_some() {
                    Decision::CancelPending
                } else {
                    Decision::Nothing
                }
            } else if !pause_active {
                Decision::Rebuild(desired)
            } else if state.pending() == Some(desired) {
                Decision::Nothing
            } else {
                Decision::Defer(desired)
            }
        }

        // Never rebuild from inside the equipment routine.
        Trigger::EquipmentWritten {
            age: AgeState::Mature,
            desired,
            previous,
        } => {
            if desired != previous {
                if state.pending() == Some(desired) {
                    Decision::Nothing
                } else {
                    Decision::Defer(desired)
                }
            } else if state.pending().is_some() {
                Decision::CancelPending
            } else {
                Decision::Nothing
            }
        }
        Trigger::EquipmentWritten { .. } => Decision::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MATURE: AgeState = AgeState::Mature;

    fn applied(variant: Variant) -> SynchronizerState {
        SynchronizerState::from_parts(variant, None, false)
    }

    fn pending(applied: Variant, target: Variant) -> SynchronizerState {
        SynchronizerState::from_parts(applied, Some(target), true)
    }

    #[test]
    fn test_checkpoint_gate() {
        let state = pending(Variant::Default, Variant::AlternateB);

        let paused = Trigger::Checkpoint {
            age: MATURE,
            pause_active: true,
        };
        let young = Trigger::Checkpoint {
            age: AgeState::Young,
            pause_active: false,
        };
        let open = Trigger::Checkpoint {
            age: MATURE,
            pause_active: false,
        };

        assert_eq!(decide(&state, paused), Decision::Nothing);
        assert_eq!(decide(&state, young), Decision::Nothing);
        assert_eq!(decide(&state, open), Decision::ResolvePending(Variant::AlternateB));
        assert_eq!(decide(&applied(Variant::Default), open), Decision::Nothing);
    }

    #[test]
    fn test_frame_divergence_rebuilds_when_safe() {
        let trigger = Trigger::Frame {
            age: MATURE,
            desired: Variant::AlternateA,
            pause_active: false,
        };
        assert_eq!(
            decide(&applied(Variant::Default), trigger),
            Decision::Rebuild(Variant::AlternateA)
        );
    }

    #[test]
    fn test_frame_divergence_defers_while_paused() {
        let trigger = Trigger::Frame {
            age: MATURE,
            desired: Variant::AlternateA,
            pause_active: true,
        };
        assert_eq!(
            decide(&applied(Variant::Default), trigger),
            Decision::Defer(Variant::AlternateA)
        );
        assert_eq!(
            decide(&pending(Variant::Default, Variant::AlternateA), trigger),
            Decision::Nothing
        );
    }

    #[test]
    fn test_young_frame_forces_not_applicable() {
        let trigger = Trigger::Frame {
            age: AgeState::Young,
            desired: Variant::NotApplicable,
            pause_active: false,
        };
        assert_eq!(
            decide(&applied(Variant::AlternateB), trigger),
            Decision::ForceNotApplicable
        );
        assert_eq!(decide(&SynchronizerState::default(), trigger), Decision::Nothing);
    }

    #[test]
    fn test_pause_exit_skipped_after_checkpoint_attempt() {
        let state = applied(Variant::AlternateB);
        let exit = |attempted_this_tick| Trigger::PauseExit {
            age: MATURE,
            desired: Variant::AlternateB,
            attempted_this_tick,
        };

        assert_eq!(decide(&state, exit(false)), Decision::Rebuild(Variant::AlternateB));
        assert_eq!(decide(&state, exit(true)), Decision::Nothing);
    }

    #[test]
    fn test_equipment_write_defers_and_coalesces() {
        let write = Trigger::EquipmentWritten {
            age: MATURE,
            desired: Variant::AlternateB,
            previous: Variant::Default,
        };

        assert_eq!(
            decide(&applied(Variant::Default), write),
            Decision::Defer(Variant::AlternateB)
        );
        assert_eq!(
            decide(&pending(Variant::Default, Variant::AlternateB), write),
            Decision::Nothing
        );
        assert_eq!(
            decide(&pending(Variant::Default, Variant::AlternateA), write),
            Decision::Defer(Variant::AlternateB)
        );
    }

    #[test]
    fn test_equipment_write_back_to_model_cancels() {
        let write = Trigger::EquipmentWritten {
            age: MATURE,
            desired: Variant::Default,
            previous: Variant::Default,
        };
        assert_eq!(
            decide(&pending(Variant::Default, Variant::AlternateB), write),
            Decision::CancelPending
        );
        assert_eq!(decide(&applied(Variant::Default), write), Decision::Nothing);
    }

    fn any_variant() -> impl Strategy<Value = Variant> {
        prop_oneof![
            Just(Variant::Default),
            Just(Variant::AlternateA),
            Just(Variant::AlternateB),
            Just(Variant::NotApplicable),
        ]
    }

    proptest! {
        #[test]
        fn equipment_writes_never_rebuild(
            last in any_variant(),
            pend in proptest::option::of(any_variant()),
            desired in any_variant(),
            previous in any_variant(),
            mature in any::<bool>(),
        ) {
            let age = if mature { AgeState::Mature } else { AgeState::Young };
            let state = SynchronizerState::from_parts(last, pend, false);
            let decision = decide(&state, Trigger::EquipmentWritten { age, desired, previous });
            prop_assert!(!matches!(decision, Decision::Rebuild(_) | Decision::ResolvePending(_)));
        }

        #[test]
        fn paused_frames_never_rebuild(
            last in any_variant(),
            pend in proptest::option::of(any_variant()),
            desired in any_variant(),
            mature in any::<bool>(),
        ) {
            let age = if mature { AgeState::Mature } else { AgeState::Young };
            let state = SynchronizerState::from_parts(last, pend, true);
            let frame = decide(&state, Trigger::Frame { age, desired, pause_active: true });
            let checkpoint = decide(&state, Trigger::Checkpoint { age, pause_active: true });
            prop_assert!(!matches!(frame, Decision::Rebuild(_) | Decision::ResolvePending(_)));
            prop_assert_eq!(checkpoint, Decision::Nothing);
        }
    }
}
