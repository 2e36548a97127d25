//! Host collaborator boundary.
//!
//! The synchronizer never builds models, applies equipment or tracks pause
//! state itself. It calls the host through [`HostServices`], a narrow
//! capability interface, and only ever refers to host-owned data through the
//! opaque [`ModelHandle`] and [`ResourceHandle`] tokens.
//!
//! - [`sim::SimulatedHost`]: in-memory host used by the binary and the tests

pub mod sim;

use crate::models::{AgeState, Variant};

/// Opaque reference to a host-owned character model.
///
/// The synchronizer holds no lifetime claim on the model and never frees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub u32);

/// Opaque host resource a model can be rebuilt from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(pub u32);

/// Services the host game exposes to the synchronizer.
///
/// Reads have no failure mode. The rebuild steps are order-sensitive:
/// [`pre_rebuild_init`](Self::pre_rebuild_init), then
/// [`reconstruct_model`](Self::reconstruct_model), then
/// [`post_rebuild_reinit`](Self::post_rebuild_reinit).
pub trait HostServices {
    /// Current character age category.
    fn age_state(&self) -> AgeState;

    /// Current persisted equipment bitfield.
    fn equipment_bits(&self) -> u16;

    /// Whether a blocking menu or pause overlay is active.
    fn is_pause_active(&self) -> bool;

    /// Resolve the resource backing `variant`, or `None` if the archive has none.
    fn lookup_variant_resource(&self, model: ModelHandle, variant: Variant) -> Option<ResourceHandle>;

    /// Refresh host state ahead of a reconstruction.
    fn pre_rebuild_init(&mut self, model: ModelHandle);

    /// Rebuild the model skeleton from `resource`.
    fn reconstruct_model(&mut self, model: ModelHandle, resource: ResourceHandle);

    /// Re-bind subsystems (face animation, held items, effects) to the rebuilt model.
    fn post_rebuild_reinit(&mut self, model: ModelHandle);

    /// Apply the persisted equipment to the model's visuals.
    fn apply_equipment(&mut self, model: ModelHandle);

    /// The host's own per-frame player logic.
    fn per_frame_update(&mut self, model: ModelHandle);

    /// Variant tag recorded on the model.
    fn model_variant(&self, model: ModelHandle) -> Variant;

    /// Record the variant the model was last rebuilt for.
    fn set_model_variant(&mut self, model: ModelHandle, variant: Variant);
}

/// The host's own player-actor lifecycle routines, wrapped by
/// [`crate::hooks::PlayerActor`].
pub trait HostLifecycle {
    /// Construct the player actor and its model. `None` when the host could
    /// not produce a model.
    fn init_player(&mut self) -> Option<ModelHandle>;

    fn destroy_player(&mut self, model: ModelHandle);

    fn draw_player(&mut self, model: ModelHandle);
}
