/// Errors reported by the strict timer API and config validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimerError {
    #[error("invalid {name}: {value} (must not be negative or NaN)")]
    InvalidArgument { name: &'static str, value: f32 },

    #[error("invalid timer config: {0}")]
    InvalidConfig(String),
}

impl TimerError {
    /// Accept any value that is neither NaN nor negative. Infinity passes so
    /// callers can clamp it.
    pub(crate) fn check_non_negative(name: &'static str, value: f32) -> Result<f32, Self> {
        if value.is_nan() || value < 0.0 {
            Err(Self::InvalidArgument { name, value })
        } else {
            Ok(value)
        }
    }

    /// Durations must also be finite; an infinite span has no progress.
    pub(crate) fn check_duration(value: f32) -> Result<f32, Self> {
        let value = Self::check_non_negative("duration", value)?;
        if value.is_infinite() {
            return Err(Self::InvalidArgument {
                name: "duration",
                value,
            });
        }
        Ok(value)
    }
}

/// Errors reported when validating frame clock settings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    #[error("invalid {name}: {value} (must be finite and {rule})")]
    InvalidConfig {
        name: &'static str,
        value: f32,
        rule: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_positive_and_infinity() {
        assert_eq!(TimerError::check_non_negative("current time", 0.0), Ok(0.0));
        assert_eq!(TimerError::check_non_negative("current time", 2.5), Ok(2.5));
        assert_eq!(
            TimerError::check_non_negative("current time", f32::INFINITY),
            Ok(f32::INFINITY)
        );
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert!(TimerError::check_non_negative("current time", -0.1).is_err());
        assert!(TimerError::check_non_negative("current time", f32::NAN).is_err());
        assert!(TimerError::check_non_negative("current time", f32::NEG_INFINITY).is_err());
    }

    #[test]
    fn duration_must_be_finite() {
        assert_eq!(TimerError::check_duration(4.0), Ok(4.0));
        assert!(TimerError::check_duration(f32::INFINITY).is_err());
        assert!(TimerError::check_duration(-1.0).is_err());
    }

    #[test]
    fn message_names_the_argument() {
        let err = TimerError::check_non_negative("current time", -1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid current time: -1 (must not be negative or NaN)"
        );
    }
}
