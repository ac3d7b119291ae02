use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimerState {
    #[default]
    Idle,
    Playing,
    Paused,
    Ended,
}

impl TimerState {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Ended => "Ended",
        }
    }

    /// States from which `start` is allowed
    pub fn can_start(self) -> bool {
        matches!(self, Self::Idle | Self::Ended)
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Read-only view of a timer at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub current_time: f32,
    pub duration: f32,
    pub progress: f32,
    pub looping: bool,
}

impl TimerSnapshot {
    /// Time left until completion
    pub fn remaining(&self) -> f32 {
        (self.duration - self.current_time).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_guard() {
        assert!(TimerState::Idle.can_start());
        assert!(TimerState::Ended.can_start());
        assert!(!TimerState::Playing.can_start());
        assert!(!TimerState::Paused.can_start());
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(TimerState::Paused.to_string(), "Paused");
        assert_eq!(TimerState::default(), TimerState::Idle);
    }

    #[test]
    fn snapshot_serializes_state_by_name() {
        let snapshot = TimerSnapshot {
            state: TimerState::Ended,
            current_time: 3.0,
            duration: 3.0,
            progress: 1.0,
            looping: false,
        };
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["state"], "Ended");
        assert_eq!(snapshot.remaining(), 0.0);
    }
}
