//! Frame clock
//!
//! Turns raw frame deltas into the scaled, clamped deltas fed to
//! [`Timer::tick`](crate::Timer::tick), either once per frame or as a
//! whole number of fixed steps.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ClockError;

/// Configuration for the frame clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Simulated seconds per real second
    pub time_scale: f32,
    /// Largest raw delta accepted per frame
    pub max_delta: f32,
    /// When set, timers advance in steps of exactly this many seconds
    pub fixed_timestep: Option<f32>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta: 0.25,
            fixed_timestep: None,
        }
    }
}

impl FrameConfig {
    /// Check every field is finite, `time_scale >= 0`, and the step sizes are positive.
    pub fn validate(&self) -> Result<(), ClockError> {
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ClockError::InvalidConfig {
                name: "time_scale",
                value: self.time_scale,
                rule: "non-negative",
            });
        }
        if !self.max_delta.is_finite() || self.max_delta <= 0.0 {
            return Err(ClockError::InvalidConfig {
                name: "max_delta",
                value: self.max_delta,
                rule: "positive",
            });
        }
        if let Some(step) = self.fixed_timestep {
            if !step.is_finite() || step <= 0.0 {
                return Err(ClockError::InvalidConfig {
                    name: "fixed_timestep",
                    value: step,
                    rule: "positive",
                });
            }
        }
        Ok(())
    }

    fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let time_scale = if self.time_scale.is_finite() {
            self.time_scale.max(0.0)
        } else {
            defaults.time_scale
        };
        let max_delta = if self.max_delta.is_finite() && self.max_delta > 0.0 {
            self.max_delta
        } else {
            defaults.max_delta
        };
        let fixed_timestep = self
            .fixed_timestep
            .filter(|step| step.is_finite() && *step > 0.0);
        Self {
            time_scale,
            max_delta,
            fixed_timestep,
        }
    }
}

/// Per-frame time source for a driver loop
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    config: FrameConfig,
    elapsed: f64,
    delta: f32,
    frame: u64,
    accumulator: f32,
}

impl FrameClock {
    /// Create a clock, replacing out-of-range settings with usable ones.
    pub fn new(config: FrameConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("{e}; falling back to sanitized clock settings");
        }
        Self {
            config: config.sanitized(),
            ..Default::default()
        }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Advance one frame. Negative or non-finite input counts as zero.
    pub fn update(&mut self, raw_delta: f32) {
        let raw_delta = if raw_delta.is_finite() {
            raw_delta.clamp(0.0, self.config.max_delta)
        } else {
            0.0
        };
        self.frame += 1;
        self.delta = raw_delta * self.config.time_scale;
        self.elapsed += self.delta as f64;
        if self.config.fixed_timestep.is_some() {
            self.accumulator += self.delta;
        }
    }

    /// Scaled delta for the current frame
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Scaled seconds since the clock was created
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Drain whole fixed steps from the accumulator. Always 0 without a fixed timestep.
    pub fn fixed_steps(&mut self) -> u32 {
        let Some(step) = self.config.fixed_timestep else {
            return 0;
        };
        let mut steps = 0;
        while self.accumulator >= step {
            self.accumulator -= step;
            steps += 1;
        }
        steps
    }

    /// Change how fast simulated time runs; negative and non-finite values become 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.config.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_scales_and_counts() {
        let mut clock = FrameClock::new(FrameConfig {
            time_scale: 2.0,
            ..Default::default()
        });
        clock.update(0.1);
        assert_eq!(clock.frame(), 1);
        assert!((clock.delta() - 0.2).abs() < 1e-6);
        assert!((clock.elapsed() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_delta_clamped() {
        let mut clock = FrameClock::default();
        clock.update(3.0);
        assert_eq!(clock.delta(), 0.25);

        clock.update(-1.0);
        assert_eq!(clock.delta(), 0.0);
        clock.update(f32::NAN);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn test_fixed_steps() {
        let mut clock = FrameClock::new(FrameConfig {
            fixed_timestep: Some(0.1),
            ..Default::default()
        });
        clock.update(0.25);
        assert_eq!(clock.fixed_steps(), 2);
        clock.update(0.06);
        assert_eq!(clock.fixed_steps(), 1);
    }

    #[test]
    fn test_no_fixed_steps_without_timestep() {
        let mut clock = FrameClock::new(FrameConfig::default());
        clock.update(0.2);
        assert_eq!(clock.fixed_steps(), 0);
        assert_eq!(clock.accumulator, 0.0);
    }

    #[test]
    fn test_time_scale_clamped() {
        let mut clock = FrameClock::default();
        clock.set_time_scale(-3.0);
        assert_eq!(clock.config().time_scale, 0.0);
        clock.set_time_scale(f32::NAN);
        assert_eq!(clock.config().time_scale, 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(FrameConfig::default().validate().is_ok());

        let negative_scale = FrameConfig {
            time_scale: -1.0,
            ..Default::default()
        };
        assert_eq!(
            negative_scale.validate(),
            Err(ClockError::InvalidConfig {
                name: "time_scale",
                value: -1.0,
                rule: "non-negative",
            })
        );

        let zero_max = FrameConfig {
            max_delta: 0.0,
            ..Default::default()
        };
        assert!(zero_max.validate().is_err());

        let zero_step = FrameConfig {
            fixed_timestep: Some(0.0),
            ..Default::default()
        };
        assert!(zero_step.validate().is_err());
    }

    #[test]
    fn test_new_sanitizes_negative_time_scale() {
        let mut clock = FrameClock::new(FrameConfig {
            time_scale: -1.0,
            max_delta: f32::NAN,
            fixed_timestep: Some(-0.5),
        });
        assert_eq!(clock.config().time_scale, 0.0);
        assert_eq!(clock.config().max_delta, 0.25);
        assert_eq!(clock.config().fixed_timestep, None);

        clock.update(0.1);
        assert_eq!(clock.delta(), 0.0);
    }
}
