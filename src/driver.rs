//! Simulated frame loop that ticks every scenario timer, per frame or per fixed step

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use cadence_core::{FrameClock, Timer, TimerSnapshot};
use serde::Serialize;
use tracing::{debug, info};

use crate::scenario::{Scenario, TimerSpec};

/// A scenario timer with its log wiring
struct DrivenTimer {
    name: String,
    timer: Timer,
    cycles: Arc<AtomicU32>,
}

impl DrivenTimer {
    fn new(spec: &TimerSpec) -> Self {
        let mut timer = Timer::from_config(&spec.config);
        let cycles = Arc::new(AtomicU32::new(0));

        let name = spec.name.clone();
        timer.on_started(move |n| {
            info!(timer = %name, at = n.snapshot.current_time, "started")
        });
        let name = spec.name.clone();
        timer.on_paused(move |n| info!(timer = %name, at = n.snapshot.current_time, "paused"));
        let name = spec.name.clone();
        timer.on_resumed(move |n| info!(timer = %name, at = n.snapshot.current_time, "resumed"));
        let name = spec.name.clone();
        timer.on_stopped(move |_| info!(timer = %name, "stopped"));

        let name = spec.name.clone();
        let count = cycles.clone();
        timer.on_ended(move |_| {
            let cycle = count.fetch_add(1, Ordering::Relaxed) + 1;
            info!(timer = %name, cycle, "ended");
        });

        let name = spec.name.clone();
        timer.on_progress_changed(move |n| debug!(timer = %name, progress = n.value));

        if spec.autostart {
            timer.start();
        }

        Self {
            name: spec.name.clone(),
            timer,
            cycles,
        }
    }
}

/// Final state of one timer after a run
#[derive(Debug, Clone, Serialize)]
pub struct TimerReport {
    pub name: String,
    pub cycles: u32,
    #[serde(flatten)]
    pub snapshot: TimerSnapshot,
}

/// Owns the clock and the timers it feeds
pub struct Driver {
    clock: FrameClock,
    timers: Vec<DrivenTimer>,
}

impl Driver {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            clock: FrameClock::new(scenario.clock.clone()),
            timers: scenario.timers.iter().map(DrivenTimer::new).collect(),
        }
    }

    /// Run one frame of `raw_delta` seconds.
    ///
    /// With a fixed timestep every timer gets one `tick(step)` per whole step
    /// the frame accumulated; otherwise one `tick` with the frame delta.
    pub fn step(&mut self, raw_delta: f32) {
        self.clock.update(raw_delta);
        match self.clock.config().fixed_timestep {
            Some(step) => {
                for _ in 0..self.clock.fixed_steps() {
                    self.tick_all(step);
                }
            }
            None => {
                let delta = self.clock.delta();
                self.tick_all(delta);
            }
        }
    }

    fn tick_all(&mut self, delta: f32) {
        for driven in &mut self.timers {
            driven.timer.tick(delta);
        }
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.clock.set_time_scale(scale);
    }

    /// Run `frames` frames at a fixed raw delta
    pub fn run(&mut self, frames: u64, raw_delta: f32) {
        for _ in 0..frames {
            self.step(raw_delta);
        }
        info!(
            frames = self.clock.frame(),
            elapsed = self.clock.elapsed(),
            "run finished"
        );
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[cfg(test)]
    pub fn timer(&self, name: &str) -> Option<&Timer> {
        self.timers
            .iter()
            .find(|d| d.name == name)
            .map(|d| &d.timer)
    }

    #[cfg(test)]
    pub fn timer_mut(&mut self, name: &str) -> Option<&mut Timer> {
        self.timers
            .iter_mut()
            .find(|d| d.name == name)
            .map(|d| &mut d.timer)
    }

    pub fn report(&self) -> Vec<TimerReport> {
        self.timers
            .iter()
            .map(|d| TimerReport {
                name: d.name.clone(),
                cycles: d.cycles.load(Ordering::Relaxed),
                snapshot: d.timer.snapshot(),
            })
            .collect()
    }
}
