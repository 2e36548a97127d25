//! Scripted session replay.
//!
//! Drives a [`PlayerActor`] over a [`SimulatedHost`] through the steps of a
//! [`Scenario`] and reports how the synchronizer behaved.

use crate::hooks::PlayerActor;
use crate::host::HostServices;
use crate::host::sim::SimulatedHost;
use crate::models::{Scenario, Step, SyncConfig, Variant};
use crate::sync::{RebuildCause, SyncEvent, SynchronizerState, TunicSynchronizer};
use tokio::sync::broadcast;

/// Outcome of a replayed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub scenario: String,
    pub ticks: u64,
    pub rebuilds: usize,
    pub model_variant: Variant,
    pub last_applied: Variant,
    pub pending: Option<Variant>,
    pub unsafe_rebuilds: u32,
    pub unprepared_rebuilds: u32,
    /// Pending rebuilds after which equipment stayed on the old skeleton
    pub stale_equipment: u32,
    pub consistent: bool,
}

impl SessionReport {
    /// No rebuild ran in an unsafe window, every pending rebuild re-bound
    /// equipment, and the model ended up bound to its subsystems.
    pub fn is_clean(&self) -> bool {
        self.unsafe_rebuilds == 0
            && self.unprepared_rebuilds == 0
            && self.stale_equipment == 0
            && self.consistent
    }
}

pub struct SessionRunner {
    name: String,
    actor: PlayerActor<SimulatedHost, TunicSynchronizer>,
    events: broadcast::Receiver<SyncEvent>,
    ticks: u64,
    stale_equipment: u32,
}

impl SessionRunner {
    pub fn new(scenario: &Scenario, config: &SyncConfig) -> Self {
        let host = SimulatedHost::new(scenario.age, scenario.equipment_bits, config.body_resources);
        let sync = TunicSynchronizer::with_event_buffer(SynchronizerState::default(), config.event_buffer);

        tracing::info!(
            "Starting session '{}': age={:?}, equipment={:#06x}, {} steps",
            scenario.name,
            scenario.age,
            scenario.equipment_bits,
            scenario.steps.len()
        );

        let actor = PlayerActor::spawn(host, sync);
        let events = actor.extension().subscribe();

        Self {
            name: scenario.name.clone(),
            actor,
            events,
            ticks: 0,
            stale_equipment: 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.actor.extension().subscribe()
    }

    pub fn actor(&self) -> &PlayerActor<SimulatedHost, TunicSynchronizer> {
        &self.actor
    }

    pub fn step(&mut self, step: &Step) {
        tracing::debug!("Step: {:?}", step);
        match *step {
            Step::Tick { count } => {
                for _ in 0..count {
                    self.actor.update();
                    self.check_pending_resolution();
                    self.actor.draw();
                    self.ticks += 1;
                }
            }
            Step::OpenMenu => self.actor.host_mut().set_paused(true),
            Step::CloseMenu => self.actor.host_mut().set_paused(false),
            Step::Equip { tunic } => {
                self.actor.host_mut().write_tunic_field(tunic);
                self.actor.apply_equipment();
            }
            Step::SetAge { age } => self.actor.host_mut().set_age(age),
            Step::DropResource { variant } => {
                if !self.actor.host_mut().drop_resource(variant) {
                    tracing::warn!("No archive entry to drop for {}", variant);
                }
            }
        }
    }

    /// Drain this tick's events; if its last rebuild resolved a pending
    /// value, equipment must have been re-applied to the new skeleton.
    fn check_pending_resolution(&mut self) {
        let mut last_cause = None;
        loop {
            match self.events.try_recv() {
                Ok(SyncEvent::Rebuilt { cause, .. }) => last_cause = Some(cause),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Session event receiver lagged, {} events skipped", skipped);
                }
                Err(_) => break,
            }
        }

        if last_cause == Some(RebuildCause::PendingResolved) && !self.actor.host().equipment_current() {
            tracing::warn!("Pending rebuild left equipment on the old skeleton");
            self.stale_equipment += 1;
        }
    }

    pub fn run(&mut self, steps: &[Step]) {
        for step in steps {
            self.step(step);
        }
    }

    pub fn report(&self) -> SessionReport {
        let host = self.actor.host();
        let state = self.actor.extension().state();
        let model_variant = self
            .actor
            .model()
            .map_or(Variant::NotApplicable, |model| host.model_variant(model));

        SessionReport {
            scenario: self.name.clone(),
            ticks: self.ticks,
            rebuilds: host.rebuild_count(),
            model_variant,
            last_applied: state.last_applied(),
            pending: state.pending(),
            unsafe_rebuilds: host.unsafe_rebuilds(),
            unprepared_rebuilds: host.unprepared_rebuilds(),
            stale_equipment: self.stale_equipment,
            consistent: host.is_consistent(),
        }
    }

    /// Report, then destroy the actor.
    pub fn finish(self) -> SessionReport {
        let report = self.report();
        self.actor.destroy();
        tracing::info!("Session '{}' finished: {:?}", report.scenario, report);
        report
    }
}

/// Replay a whole scenario.
pub fn run_scenario(scenario: &Scenario, config: &SyncConfig) -> SessionReport {
    let mut runner = SessionRunner::new(scenario, config);
    runner.run(&scenario.steps);
    runner.finish()
}
