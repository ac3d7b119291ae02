use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Tolerance used to decide whether a duration or time write is a change.
///
/// The smallest positive subnormal, so any nonzero difference counts.
pub const DEFAULT_EPSILON: f32 = f32::from_bits(1);

/// How many commands listeners may queue while one call is being handled.
pub const DEFAULT_MAX_DEFERRED_COMMANDS: usize = 64;

/// Static timer setup, as stored in scenario or asset files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Span the timer counts toward, in seconds.
    pub duration: f32,
    /// Restart from zero on completion.
    #[serde(alias = "loop")]
    pub looping: bool,
    /// Change-detection tolerance for duration and time writes.
    pub epsilon: f32,
    /// Upper bound on deferred commands drained after a single call.
    /// Zero disables re-entrant commands entirely.
    pub max_deferred_commands: usize,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration: 0.0,
            looping: false,
            epsilon: DEFAULT_EPSILON,
            max_deferred_commands: DEFAULT_MAX_DEFERRED_COMMANDS,
        }
    }
}

impl TimerConfig {
    pub fn new(duration: f32, looping: bool) -> Self {
        Self {
            duration,
            looping,
            ..Default::default()
        }
    }

    /// Check that duration and epsilon are finite and non-negative.
    pub fn validate(&self) -> Result<(), TimerError> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(TimerError::InvalidConfig(format!(
                "duration must be finite and non-negative, got {}",
                self.duration
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(TimerError::InvalidConfig(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }

    /// Copy of this config with out-of-range values replaced by defaults.
    pub(crate) fn sanitized(&self) -> Self {
        let duration = if self.duration.is_finite() {
            self.duration.max(0.0)
        } else {
            0.0
        };
        let epsilon = if self.epsilon.is_finite() && self.epsilon >= 0.0 {
            self.epsilon
        } else {
            DEFAULT_EPSILON
        };
        Self {
            duration,
            epsilon,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TimerConfig::default();
        assert_eq!(config.duration, 0.0);
        assert!(!config.looping);
        assert_eq!(config.epsilon, DEFAULT_EPSILON);
        assert_eq!(config.max_deferred_commands, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_epsilon_is_smallest_subnormal() {
        assert_eq!(DEFAULT_EPSILON.to_bits(), 1);
        assert!(DEFAULT_EPSILON < f32::MIN_POSITIVE);
    }

    #[test]
    fn rejects_negative_duration() {
        let config = TimerConfig::new(-3.0, false);
        assert!(matches!(
            config.validate(),
            Err(TimerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_nan_epsilon() {
        let config = TimerConfig {
            epsilon: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sanitized_clamps_bad_values() {
        let config = TimerConfig {
            duration: -2.0,
            epsilon: -1.0,
            looping: true,
            max_deferred_commands: 3,
        };
        let fixed = config.sanitized();
        assert_eq!(fixed.duration, 0.0);
        assert_eq!(fixed.epsilon, DEFAULT_EPSILON);
        assert!(fixed.looping);
        assert_eq!(fixed.max_deferred_commands, 3);
    }

    #[test]
    fn parses_partial_toml_with_loop_alias() {
        let config: TimerConfig = toml::from_str("duration = 2.5\nloop = true\n").unwrap();
        assert_eq!(config.duration, 2.5);
        assert!(config.looping);
        assert_eq!(config.max_deferred_commands, DEFAULT_MAX_DEFERRED_COMMANDS);
    }
}
