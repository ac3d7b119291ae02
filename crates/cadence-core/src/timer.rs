//! Tick-driven timer state machine
//!
//! A [`Timer`] advances toward its duration on every [`Timer::tick`] while
//! playing and notifies listeners of each observable change.
//!
//! Listeners cannot borrow the timer. Anything they want to change is queued
//! through [`Notification::defer`] and applied after the call that notified
//! them has delivered all of its own notifications. Commands queued while
//! that queue is drained go to the back of it, so a chain of reactions runs
//! breadth-first. At most `max_deferred_commands` run per call. The rest are
//! dropped with a warning, which stops listeners from feeding each other
//! forever.
//!
//! A zero duration counts as instantly complete: progress reads 1 and the
//! first tick while playing ends the run.

use tracing::{debug, trace, warn};

use crate::command::{CommandQueue, TimerCommand};
use crate::config::TimerConfig;
use crate::error::TimerError;
use crate::signal::{ListenerId, Notification, Signals};
use crate::state::{TimerSnapshot, TimerState};

macro_rules! emit {
    ($timer:ident . $channel:ident, $value:expr) => {{
        let value = $value;
        let snapshot = $timer.snapshot();
        $timer
            .signals
            .$channel
            .emit(value, snapshot, &mut $timer.deferred);
    }};
}

/// Time-tracking state machine driven by an external frame loop.
#[derive(Debug)]
pub struct Timer {
    duration: f32,
    current_time: f32,
    state: TimerState,
    looping: bool,
    epsilon: f32,
    max_deferred_commands: usize,
    signals: Signals,
    next_listener: u64,
    deferred: CommandQueue,
    draining: bool,
}

impl Default for Timer {
    fn default() -> Self {
        Self::from_config(&TimerConfig::default())
    }
}

impl Timer {
    /// Create an idle timer. A negative or non-finite duration becomes zero.
    pub fn new(duration: f32, looping: bool) -> Self {
        Self::from_config(&TimerConfig::new(duration, looping))
    }

    /// Create an idle timer from config, replacing invalid values.
    pub fn from_config(config: &TimerConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("{e}; falling back to sanitized values");
        }
        let config = config.sanitized();
        Self {
            duration: config.duration,
            current_time: 0.0,
            state: TimerState::Idle,
            looping: config.looping,
            epsilon: config.epsilon,
            max_deferred_commands: config.max_deferred_commands,
            signals: Signals::default(),
            next_listener: 0,
            deferred: CommandQueue::default(),
            draining: false,
        }
    }

    /// Create an idle timer, refusing invalid config.
    pub fn try_from_config(config: &TimerConfig) -> Result<Self, TimerError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    // ---- Queries ----

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TimerState::Idle
    }

    pub fn is_playing(&self) -> bool {
        self.state == TimerState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    pub fn is_ended(&self) -> bool {
        self.state == TimerState::Ended
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Time left in the current run, never negative.
    pub fn remaining(&self) -> f32 {
        (self.duration - self.current_time).max(0.0)
    }

    /// Normalized progress: 0 when idle, 1 when ended, elapsed fraction otherwise.
    pub fn progress(&self) -> f32 {
        match self.state {
            TimerState::Playing | TimerState::Paused => self.ratio(),
            TimerState::Ended => 1.0,
            TimerState::Idle => 0.0,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            current_time: self.current_time,
            duration: self.duration,
            progress: self.progress(),
            looping: self.looping,
        }
    }

    fn ratio(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        // current_time can briefly exceed a duration that was just lowered
        (self.current_time / self.duration).min(1.0)
    }

    // ---- Transitions ----

    /// Start from zero. Only valid from `Idle` or `Ended`.
    pub fn start(&mut self) -> bool {
        let started = self.begin(0.0);
        self.flush_deferred();
        started
    }

    /// Start at `time`, clamped to `[0, duration]`. Only valid from `Idle` or `Ended`.
    pub fn start_at(&mut self, time: f32) -> bool {
        let started = self.begin(time);
        self.flush_deferred();
        started
    }

    /// Stop, then start from zero, whatever the current state.
    pub fn force_start(&mut self) {
        self.force_begin(0.0);
        self.flush_deferred();
    }

    /// Stop, then start at `time`, whatever the current state.
    pub fn force_start_at(&mut self, time: f32) {
        self.force_begin(time);
        self.flush_deferred();
    }

    /// Pause a playing timer.
    pub fn pause(&mut self) -> bool {
        let paused = self.halt();
        self.flush_deferred();
        paused
    }

    /// Resume a paused timer.
    pub fn resume(&mut self) -> bool {
        let resumed = self.unhalt();
        self.flush_deferred();
        resumed
    }

    /// Return to `Idle` and reset the time. Fails only when already idle.
    pub fn stop(&mut self) -> bool {
        let stopped = self.reset();
        self.flush_deferred();
        stopped
    }

    /// Advance a playing timer by `delta` seconds.
    ///
    /// Does nothing unless playing. Negative or NaN deltas are ignored.
    pub fn tick(&mut self, delta: f32) {
        self.advance(delta);
        self.flush_deferred();
    }

    fn begin(&mut self, time: f32) -> bool {
        if !self.state.can_start() {
            trace!(state = %self.state, "start rejected");
            return false;
        }
        self.current_time = if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, self.duration)
        };
        self.state = TimerState::Playing;
        debug!(current_time = self.current_time, duration = self.duration, "timer started");
        emit!(self.state_changed, TimerState::Playing);
        emit!(self.started, ());
        true
    }

    fn force_begin(&mut self, time: f32) {
        self.reset();
        self.begin(time);
    }

    fn halt(&mut self) -> bool {
        if self.state != TimerState::Playing {
            trace!(state = %self.state, "pause rejected");
            return false;
        }
        self.state = TimerState::Paused;
        debug!(current_time = self.current_time, "timer paused");
        emit!(self.state_changed, TimerState::Paused);
        emit!(self.paused, ());
        true
    }

    fn unhalt(&mut self) -> bool {
        if self.state != TimerState::Paused {
            trace!(state = %self.state, "resume rejected");
            return false;
        }
        self.state = TimerState::Playing;
        debug!(current_time = self.current_time, "timer resumed");
        emit!(self.state_changed, TimerState::Playing);
        emit!(self.resumed, ());
        true
    }

    fn reset(&mut self) -> bool {
        if self.state == TimerState::Idle {
            trace!("stop rejected: already idle");
            return false;
        }
        self.current_time = 0.0;
        self.state = TimerState::Idle;
        debug!("timer stopped");
        emit!(self.state_changed, TimerState::Idle);
        emit!(self.stopped, ());
        true
    }

    fn advance(&mut self, delta: f32) {
        if self.state != TimerState::Playing {
            return;
        }
        if delta.is_nan() || delta < 0.0 {
            trace!(delta, "ignoring invalid tick delta");
            return;
        }

        self.current_time = self.duration.min(self.current_time + delta);
        emit!(self.current_time_changed, self.current_time);

        let progress = self.ratio();
        emit!(self.progress_changed, progress);

        if progress >= 1.0 {
            self.complete();
        }
    }

    fn complete(&mut self) {
        self.state = TimerState::Ended;
        debug!(duration = self.duration, looping = self.looping, "timer ended");
        emit!(self.state_changed, TimerState::Ended);
        emit!(self.ended, ());

        if self.looping {
            self.begin(0.0);
        }
    }

    // ---- Value setters ----

    /// Set the duration. Negative, NaN, or infinite values are ignored.
    ///
    /// The current time is not re-clamped; the next tick or time write does that.
    pub fn set_duration(&mut self, duration: f32) {
        if let Err(e) = self.try_set_duration(duration) {
            trace!("{e}");
        }
    }

    /// Set the duration, reporting rejected input. `Ok(false)` means the
    /// value was already within epsilon.
    pub fn try_set_duration(&mut self, duration: f32) -> Result<bool, TimerError> {
        let changed = self.write_duration(duration)?;
        self.flush_deferred();
        Ok(changed)
    }

    /// Set the current time, clamped to `[0, duration]`. Negative or NaN
    /// values are ignored.
    pub fn set_current_time(&mut self, time: f32) {
        if let Err(e) = self.try_set_current_time(time) {
            trace!("{e}");
        }
    }

    /// Set the current time, reporting rejected input. `Ok(false)` means
    /// the clamped value was already within epsilon.
    pub fn try_set_current_time(&mut self, time: f32) -> Result<bool, TimerError> {
        let changed = self.write_current_time(time)?;
        self.flush_deferred();
        Ok(changed)
    }

    /// Jump to a fraction of the duration. `progress` is clamped to `[0, 1]`;
    /// NaN is ignored. State is left alone.
    pub fn set_progress(&mut self, progress: f32) {
        self.write_progress(progress);
        self.flush_deferred();
    }

    /// Toggle restart-on-completion. Emits nothing.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn write_duration(&mut self, duration: f32) -> Result<bool, TimerError> {
        let duration = TimerError::check_duration(duration)?;
        if (self.duration - duration).abs() <= self.epsilon {
            return Ok(false);
        }
        self.duration = duration;
        emit!(self.duration_changed, duration);
        Ok(true)
    }

    fn write_current_time(&mut self, time: f32) -> Result<bool, TimerError> {
        let time = TimerError::check_non_negative("current time", time)?.min(self.duration);
        if (time - self.current_time).abs() <= self.epsilon {
            return Ok(false);
        }
        self.current_time = time;
        emit!(self.current_time_changed, time);
        emit!(self.progress_changed, self.progress());
        Ok(true)
    }

    fn write_progress(&mut self, progress: f32) -> bool {
        if progress.is_nan() {
            trace!("ignoring NaN progress");
            return false;
        }
        let progress = progress.clamp(0.0, 1.0);
        self.current_time = self.duration * progress;
        emit!(self.current_time_changed, self.current_time);
        emit!(self.progress_changed, progress);
        true
    }

    // ---- Subscriptions ----

    fn next_listener_id(&mut self) -> ListenerId {
        self.next_listener += 1;
        ListenerId::new(self.next_listener)
    }

    pub fn on_started<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut Notification<'_, ()>) + Send + 'static,
    {
        let id = self.next_listener_id();
        self.signals.started.connect(id, listener);
        id
    }

    pub fn on_stopped<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut Notification<'_, ()>) + Send + 'static,
    {
        let id = self.next_listener_id();
        self.signals.stopped.connect(id, listener);
        id
    }

    pub fn on_paused<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut Notification<'_, ()>) + Send + 'static,
    {
        let id = self.next_listener_id();
        self.signals.paused.connect(id, listener);
        id
    }

    pub fn on_resumed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut Notification<'_, ()>) + Send + 'static,
    {
        let id = self.next_listener_id();
        self.signals.resumed.connect(id, listener);
        id
    }

    pub fn on_ended<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut Notification<'_, ()>) + Send + 'static,
    {
        let id = self.next_listener_id();
        self.signals.ended.connect(id, listener);
        id
    }

    pub fn on_state_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut Notification<'_, TimerState>) + Send + 'static,
    {
        let id = self.next_listener_id();
        self.signals.state_changed.connect(id, listener);
        id
    }

    pub fn on_current_time_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut Notification<'_, f32>) + Send + 'static,
    {
        let id = self.next_listener_id();
        self.signals.current_time_changed.connect(id, listener);
        id
    }

    pub fn on_duration_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut Notification<'_, f32>) + Send + 'static,
    {
        let id = self.next_listener_id();
        self.signals.duration_changed.connect(id, listener);
        id
    }

    pub fn on_progress_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut Notification<'_, f32>) + Send + 'static,
    {
        let id = self.next_listener_id();
        self.signals.progress_changed.connect(id, listener);
        id
    }

    /// Remove a listener from whichever channel it was registered on.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.signals.disconnect(id)
    }

    /// Remove every listener on every channel.
    pub fn clear_listeners(&mut self) {
        self.signals.clear();
    }

    /// Total listeners across all channels.
    pub fn listener_count(&self) -> usize {
        self.signals.len()
    }

    // ---- Commands ----

    /// Run a command as if called directly. Returns whether it took effect.
    pub fn apply(&mut self, command: TimerCommand) -> bool {
        let applied = self.execute(command);
        self.flush_deferred();
        applied
    }

    fn execute(&mut self, command: TimerCommand) -> bool {
        match command {
            TimerCommand::Start => self.begin(0.0),
            TimerCommand::StartAt(time) => self.begin(time),
            TimerCommand::Pause => self.halt(),
            TimerCommand::Resume => self.unhalt(),
            TimerCommand::Stop => self.reset(),
            TimerCommand::ForceStart => {
                self.force_begin(0.0);
                true
            }
            TimerCommand::ForceStartAt(time) => {
                self.force_begin(time);
                true
            }
            TimerCommand::SetDuration(duration) => {
                self.write_duration(duration).unwrap_or(false)
            }
            TimerCommand::SetCurrentTime(time) => {
                self.write_current_time(time).unwrap_or(false)
            }
            TimerCommand::SetProgress(progress) => self.write_progress(progress),
            TimerCommand::SetLooping(looping) => {
                self.looping = looping;
                true
            }
            TimerCommand::Unsubscribe(id) => self.signals.disconnect(id),
        }
    }

    fn flush_deferred(&mut self) {
        if self.draining {
            return;
        }
        self.draining = true;

        let mut executed = 0;
        while let Some(command) = self.deferred.pop() {
            if executed >= self.max_deferred_commands {
                let dropped = self.deferred.len() + 1;
                self.deferred.clear();
                warn!(
                    dropped,
                    limit = self.max_deferred_commands,
                    "deferred timer commands exceeded limit, dropping the rest"
                );
                break;
            }
            executed += 1;
            trace!(?command, "applying deferred command");
            self.execute(command);
        }

        self.draining = false;
    }
}
