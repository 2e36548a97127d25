//! In-memory host implementation.
//!
//! Stands in for the game process: it owns the persisted age/equipment
//! state, the pause flag, an ordered resource archive and a single player
//! model. Every host call is logged so callers can check what the
//! synchronizer asked for and in which order.

use super::{HostLifecycle, HostServices, ModelHandle, ResourceHandle};
use crate::models::variant::{derive_desired_variant, with_tunic_field};
use crate::models::{AgeState, BodyResourceIndices, Variant};
use indexmap::IndexMap;

/// Archive index the host loads the young body from.
pub const YOUNG_BODY_INDEX: u32 = 1;

/// Number of entries in the standard archive (`0..STANDARD_ARCHIVE_LEN`).
pub const STANDARD_ARCHIVE_LEN: u32 = 8;

/// A host routine invoked on the simulated host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    InitPlayer,
    DestroyPlayer,
    DrawPlayer,
    PerFrameUpdate,
    PreRebuildInit,
    ReconstructModel(ResourceHandle),
    PostRebuildReinit,
    ApplyEquipment,
}

/// Bookkeeping for the simulated player model.
///
/// Generations track which skeleton build each dependent piece of state was
/// last bound to. A subsystem or equipment generation behind the build
/// generation is a dangling reference into a freed skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimModel {
    pub handle: ModelHandle,
    pub variant: Variant,
    pub resource: ResourceHandle,
    pub build_generation: u32,
    pub subsystems_generation: u32,
    pub equipment_generation: u32,
    refreshed: bool,
}

#[derive(Debug, Clone)]
pub struct SimulatedHost {
    age: AgeState,
    equipment_bits: u16,
    paused: bool,
    indices: BodyResourceIndices,
    archive: IndexMap<u32, ResourceHandle>,
    model: Option<SimModel>,
    next_handle: u32,
    calls: Vec<HostCall>,
    unsafe_rebuilds: u32,
    unprepared_rebuilds: u32,
}

impl SimulatedHost {
    /// Create a host with a fully populated archive.
    pub fn new(age: AgeState, equipment_bits: u16, indices: BodyResourceIndices) -> Self {
        let archive = (0..STANDARD_ARCHIVE_LEN)
            .map(|index| (index, ResourceHandle(0x100 + index)))
            .collect();

        Self {
            age,
            equipment_bits,
            paused: false,
            indices,
            archive,
            model: None,
            next_handle: 1,
            calls: Vec::new(),
            unsafe_rebuilds: 0,
            unprepared_rebuilds: 0,
        }
    }

    pub fn indices(&self) -> &BodyResourceIndices {
        &self.indices
    }

    pub fn set_age(&mut self, age: AgeState) {
        self.age = age;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Write the raw tunic field into the persisted equipment bits.
    ///
    /// This only changes save data; game logic then runs the equipment
    /// routine through the actor.
    pub fn write_tunic_field(&mut self, field: u16) {
        self.equipment_bits = with_tunic_field(self.equipment_bits, field);
    }

    /// Remove the archive entry backing `variant`. Returns whether an entry
    /// was removed.
    pub fn drop_resource(&mut self, variant: Variant) -> bool {
        match self.indices.index_for(variant) {
            Some(index) => self.archive.shift_remove(&index).is_some(),
            None => false,
        }
    }

    pub fn model(&self) -> Option<&SimModel> {
        self.model.as_ref()
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of model reconstructions performed so far.
    pub fn rebuild_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, HostCall::ReconstructModel(_)))
            .count()
    }

    /// Reconstructions that ran while a pause overlay was active.
    pub fn unsafe_rebuilds(&self) -> u32 {
        self.unsafe_rebuilds
    }

    /// Reconstructions not preceded by a pre-rebuild refresh.
    pub fn unprepared_rebuilds(&self) -> u32 {
        self.unprepared_rebuilds
    }

    /// True when the model's subsystems are bound to its current skeleton.
    pub fn is_consistent(&self) -> bool {
        self.model
            .as_ref()
            .is_none_or(|model| model.subsystems_generation == model.build_generation)
    }

    /// True when equipment visuals were last applied to the current
    /// skeleton. Only rebuilds followed by an equipment pass restore this.
    pub fn equipment_current(&self) -> bool {
        self.model
            .as_ref()
            .is_none_or(|model| model.equipment_generation == model.build_generation)
    }

    fn model_mut(&mut self, handle: ModelHandle) -> Option<&mut SimModel> {
        self.model.as_mut().filter(|model| model.handle == handle)
    }
}

impl HostServices for SimulatedHost {
    fn age_state(&self) -> AgeState {
        self.age
    }

    fn equipment_bits(&self) -> u16 {
        self.equipment_bits
    }

    fn is_pause_active(&self) -> bool {
        self.paused
    }

    fn lookup_variant_resource(&self, model: ModelHandle, variant: Variant) -> Option<ResourceHandle> {
        if self.model.as_ref().is_none_or(|m| m.handle != model) {
            return None;
        }
        let index = self.indices.index_for(variant)?;
        self.archive.get(&index).copied()
    }

    fn pre_rebuild_init(&mut self, model: ModelHandle) {
        self.calls.push(HostCall::PreRebuildInit);
        if let Some(model) = self.model_mut(model) {
            model.refreshed = true;
        }
    }

    fn reconstruct_model(&mut self, model: ModelHandle, resource: ResourceHandle) {
        self.calls.push(HostCall::ReconstructModel(resource));
        let paused = self.paused;
        let Some(model) = self.model_mut(model) else {
            return;
        };

        let unprepared = !model.refreshed;
        model.resource = resource;
        model.build_generation += 1;
        model.refreshed = false;

        if paused {
            tracing::warn!("Simulated host: model rebuilt while paused");
            self.unsafe_rebuilds += 1;
        }
        if unprepared {
            self.unprepared_rebuilds += 1;
        }
    }

    fn post_rebuild_reinit(&mut self, model: ModelHandle) {
        self.calls.push(HostCall::PostRebuildReinit);
        if let Some(model) = self.model_mut(model) {
            model.subsystems_generation = model.build_generation;
        }
    }

    fn apply_equipment(&mut self, model: ModelHandle) {
        self.calls.push(HostCall::ApplyEquipment);
        if let Some(model) = self.model_mut(model) {
            model.equipment_generation = model.build_generation;
        }
    }

    fn per_frame_update(&mut self, _model: ModelHandle) {
        self.calls.push(HostCall::PerFrameUpdate);
    }

    fn model_variant(&self, model: ModelHandle) -> Variant {
        self.model
            .as_ref()
            .filter(|m| m.handle == model)
            .map_or(Variant::NotApplicable, |m| m.variant)
    }

    fn set_model_variant(&mut self, model: ModelHandle, variant: Variant) {
        if let Some(model) = self.model_mut(model) {
            model.variant = variant;
        }
    }
}

impl HostLifecycle for SimulatedHost {
    fn init_player(&mut self) -> Option<ModelHandle> {
        self.calls.push(HostCall::InitPlayer);

        let index = if self.age.is_mature() {
            self.indices
                .redirect(self.age, self.equipment_bits, self.indices.default)
        } else {
            YOUNG_BODY_INDEX
        };
        let resource = *self.archive.get(&index)?;

        let handle = ModelHandle(self.next_handle);
        self.next_handle += 1;
        self.model = Some(SimModel {
            handle,
            variant: derive_desired_variant(self.age, self.equipment_bits),
            resource,
            build_generation: 1,
            subsystems_generation: 1,
            equipment_generation: 1,
            refreshed: false,
        });

        tracing::debug!("Simulated host: player initialized from archive index {}", index);
        Some(handle)
    }

    fn destroy_player(&mut self, model: ModelHandle) {
        self.calls.push(HostCall::DestroyPlayer);
        if self.model.as_ref().is_some_and(|m| m.handle == model) {
            self.model = None;
        }
    }

    fn draw_player(&mut self, _model: ModelHandle) {
        self.calls.push(HostCall::DrawPlayer);
    }
}
