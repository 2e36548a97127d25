//! Player lifecycle hooks.
//!
//! [`PlayerActor`] wraps the host's player routines (init, update, equipment,
//! draw, destroy) and calls a [`PlayerExtension`] registered when the actor
//! is constructed. The host's own routine always runs first, except for the
//! pre-update point.

use crate::host::{HostLifecycle, HostServices, ModelHandle};
use crate::models::Variant;
use crate::sync::TunicSynchronizer;

/// Extension points of the player lifecycle.
///
/// All methods default to doing nothing.
pub trait PlayerExtension<H: ?Sized> {
    /// After the host constructed the actor
    fn on_init(&mut self, _host: &mut H, _model: Option<ModelHandle>) {}

    /// Before the host's per-frame update
    fn pre_update(&mut self, _host: &mut H, _model: Option<ModelHandle>) {}

    /// After the host's per-frame update
    fn post_update(&mut self, _host: &mut H, _model: Option<ModelHandle>) {}

    /// After the host's equipment routine; `previous` is the model's variant
    /// tag from before the routine ran
    fn on_equipment_write(&mut self, _host: &mut H, _model: Option<ModelHandle>, _previous: Variant) {}

    /// After the host draws the player
    fn on_draw(&mut self, _host: &mut H, _model: Option<ModelHandle>) {}

    /// Before the host tears the actor down
    fn on_destroy(&mut self, _host: &mut H, _model: Option<ModelHandle>) {}
}

impl<H: HostServices + ?Sized> PlayerExtension<H> for TunicSynchronizer {
    fn on_init(&mut self, host: &mut H, _model: Option<ModelHandle>) {
        self.reset(host);
    }

    fn post_update(&mut self, host: &mut H, model: Option<ModelHandle>) {
        self.on_post_update(host, model);
    }

    fn on_equipment_write(&mut self, host: &mut H, model: Option<ModelHandle>, previous: Variant) {
        self.on_equipment_written(host, model, previous);
    }

    fn on_destroy(&mut self, _host: &mut H, _model: Option<ModelHandle>) {
        self.metrics().log_summary();
    }
}

/// Player actor with an extension wired into its lifecycle.
pub struct PlayerActor<H, E> {
    host: H,
    extension: E,
    model: Option<ModelHandle>,
}

impl<H, E> PlayerActor<H, E>
where
    H: HostServices + HostLifecycle,
    E: PlayerExtension<H>,
{
    /// Run the host's init, then the extension's.
    pub fn spawn(mut host: H, mut extension: E) -> Self {
        let model = host.init_player();
        if model.is_none() {
            tracing::warn!("Host produced no player model");
        }
        extension.on_init(&mut host, model);

        Self {
            host,
            extension,
            model,
        }
    }

    /// One simulation tick.
    pub fn update(&mut self) {
        self.extension.pre_update(&mut self.host, self.model);
        if let Some(model) = self.model {
            self.host.per_frame_update(model);
        }
        self.extension.post_update(&mut self.host, self.model);
    }

    /// The wrapped equipment routine, run by game logic whenever the
    /// equipment selection is applied.
    pub fn apply_equipment(&mut self) {
        let Some(model) = self.model else {
            tracing::debug!("Equipment applied without a player model");
            return;
        };
        let previous = self.host.model_variant(model);
        self.host.apply_equipment(model);
        self.extension
            .on_equipment_write(&mut self.host, Some(model), previous);
    }

    pub fn draw(&mut self) {
        if let Some(model) = self.model {
            self.host.draw_player(model);
        }
        self.extension.on_draw(&mut self.host, self.model);
    }

    /// Tear the actor down and hand back the host and extension.
    pub fn destroy(mut self) -> (H, E) {
        self.extension.on_destroy(&mut self.host, self.model);
        if let Some(model) = self.model.take() {
            self.host.destroy_player(model);
        }
        (self.host, self.extension)
    }

    pub fn model(&self) -> Option<ModelHandle> {
        self.model
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn extension(&self) -> &E {
        &self.extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::sim::{HostCall, SimulatedHost};
    use crate::models::variant::with_tunic_field;
    use crate::models::{AgeState, BodyResourceIndices};

    #[derive(Default)]
    struct Recorder {
        points: Vec<&'static str>,
        previous: Vec<Variant>,
    }

    impl<H: HostServices> PlayerExtension<H> for Recorder {
        fn on_init(&mut self, _host: &mut H, _model: Option<ModelHandle>) {
            self.points.push("init");
        }

        fn pre_update(&mut self, _host: &mut H, _model: Option<ModelHandle>) {
            self.points.push("pre_update");
        }

        fn post_update(&mut self, _host: &mut H, _model: Option<ModelHandle>) {
            self.points.push("post_update");
        }

        fn on_equipment_write(&mut self, _host: &mut H, _model: Option<ModelHandle>, previous: Variant) {
            self.points.push("equipment_write");
            self.previous.push(previous);
        }

        fn on_draw(&mut self, _host: &mut H, _model: Option<ModelHandle>) {
            self.points.push("draw");
        }

        fn on_destroy(&mut self, _host: &mut H, _model: Option<ModelHandle>) {
            self.points.push("destroy");
        }
    }

    fn host(field: u16) -> SimulatedHost {
        SimulatedHost::new(
            AgeState::Mature,
            with_tunic_field(0, field),
            BodyResourceIndices::default(),
        )
    }

    #[test]
    fn test_lifecycle_order() {
        let mut actor = PlayerActor::spawn(host(0), Recorder::default());
        actor.update();
        actor.apply_equipment();
        actor.draw();
        let (host, recorder) = actor.destroy();

        assert_eq!(
            recorder.points,
            vec!["init", "pre_update", "post_update", "equipment_write", "draw", "destroy"]
        );
        assert_eq!(
            host.calls(),
            &[
                HostCall::InitPlayer,
                HostCall::PerFrameUpdate,
                HostCall::ApplyEquipment,
                HostCall::DrawPlayer,
                HostCall::DestroyPlayer,
            ]
        );
    }

    #[test]
    fn test_equipment_write_passes_previous_variant() {
        let mut actor = PlayerActor::spawn(host(2), Recorder::default());
        actor.host_mut().write_tunic_field(3);
        actor.apply_equipment();

        assert_eq!(actor.extension().previous, vec![Variant::AlternateA]);
    }

    #[test]
    fn test_synchronizer_as_extension() {
        let mut actor = PlayerActor::spawn(host(0), TunicSynchronizer::default());
        assert_eq!(actor.extension().state().last_applied(), Variant::Default);

        actor.host_mut().set_paused(true);
        actor.host_mut().write_tunic_field(2);
        actor.apply_equipment();
        actor.update();
        assert_eq!(actor.extension().state().pending(), Some(Variant::AlternateA));
        assert_eq!(actor.host().rebuild_count(), 0);

        actor.host_mut().set_paused(false);
        actor.update();

        assert_eq!(actor.extension().state().last_applied(), Variant::AlternateA);
        assert_eq!(actor.host().rebuild_count(), 1);
        assert_eq!(actor.host().unsafe_rebuilds(), 0);
        assert!(actor.host().is_consistent());
    }

    #[test]
    fn test_missing_model_skips_host_calls() {
        let mut host = host(0);
        for variant in [Variant::Default, Variant::AlternateA, Variant::AlternateB] {
            host.drop_resource(variant);
        }

        let mut actor = PlayerActor::spawn(host, TunicSynchronizer::default());
        actor.update();
        actor.apply_equipment();

        assert_eq!(actor.model(), None);
        assert_eq!(actor.host().calls(), &[HostCall::InitPlayer]);
    }
}
