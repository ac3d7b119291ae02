//! Cadence Core - Tick-driven timers for frame-based runtimes
//!
//! This crate provides:
//! - [`Timer`], a state machine that advances toward a duration on each tick
//! - Per-channel notifications with subscribe/unsubscribe
//! - Deferred commands for listeners that need to act on their timer
//! - [`FrameClock`], a scaled and clamped per-frame delta source

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
mod signal;
pub mod state;
pub mod timer;

pub use clock::{FrameClock, FrameConfig};
pub use command::TimerCommand;
pub use config::{TimerConfig, DEFAULT_EPSILON, DEFAULT_MAX_DEFERRED_COMMANDS};
pub use error::{ClockError, TimerError};
pub use signal::{ListenerId, Notification};
pub use state::{TimerSnapshot, TimerState};
pub use timer::Timer;
