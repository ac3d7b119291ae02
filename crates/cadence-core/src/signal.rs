//! Notification channels
//!
//! Each channel keeps its own ordered listener list. Delivery is synchronous
//! and follows subscription order.

use std::fmt;

use crate::command::{CommandQueue, TimerCommand};
use crate::state::{TimerSnapshot, TimerState};

/// Handle returned on subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// What a listener receives: the emitted value, the timer as it stood after
/// the change, and a way to queue follow-up commands.
pub struct Notification<'a, T> {
    pub value: T,
    pub snapshot: TimerSnapshot,
    queue: &'a mut CommandQueue,
}

impl<T> Notification<'_, T> {
    /// Queue a command. It runs after the current timer call has finished
    /// delivering its own notifications.
    pub fn defer(&mut self, command: TimerCommand) {
        self.queue.push(command);
    }
}

type Listener<T> = Box<dyn FnMut(&mut Notification<'_, T>) + Send>;

/// Ordered listener list for one kind of notification.
pub struct Signal<T> {
    listeners: Vec<(ListenerId, Listener<T>)>,
}

impl<T: Copy> Signal<T> {
    pub(crate) fn connect<F>(&mut self, id: ListenerId, listener: F)
    where
        F: FnMut(&mut Notification<'_, T>) + Send + 'static,
    {
        self.listeners.push((id, Box::new(listener)));
    }

    pub(crate) fn disconnect(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub(crate) fn emit(&mut self, value: T, snapshot: TimerSnapshot, queue: &mut CommandQueue) {
        for (_, listener) in &mut self.listeners {
            let mut notification = Notification {
                value,
                snapshot,
                queue: &mut *queue,
            };
            listener(&mut notification);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Every channel a timer publishes.
#[derive(Debug, Default)]
pub(crate) struct Signals {
    pub started: Signal<()>,
    pub stopped: Signal<()>,
    pub paused: Signal<()>,
    pub resumed: Signal<()>,
    pub ended: Signal<()>,
    pub state_changed: Signal<TimerState>,
    pub current_time_changed: Signal<f32>,
    pub duration_changed: Signal<f32>,
    pub progress_changed: Signal<f32>,
}

impl Signals {
    /// Remove a listener from whichever channel holds it.
    pub fn disconnect(&mut self, id: ListenerId) -> bool {
        self.started.disconnect(id)
            || self.stopped.disconnect(id)
            || self.paused.disconnect(id)
            || self.resumed.disconnect(id)
            || self.ended.disconnect(id)
            || self.state_changed.disconnect(id)
            || self.current_time_changed.disconnect(id)
            || self.duration_changed.disconnect(id)
            || self.progress_changed.disconnect(id)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn len(&self) -> usize {
        self.started.len()
            + self.stopped.len()
            + self.paused.len()
            + self.resumed.len()
            + self.ended.len()
            + self.state_changed.len()
            + self.current_time_changed.len()
            + self.duration_changed.len()
            + self.progress_changed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn snapshot() -> TimerSnapshot {
        TimerSnapshot {
            state: TimerState::Playing,
            current_time: 1.0,
            duration: 4.0,
            progress: 0.25,
            looping: false,
        }
    }

    #[test]
    fn emits_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut signal = Signal::<f32>::default();
        let mut queue = CommandQueue::default();

        let log1 = log.clone();
        signal.connect(ListenerId::new(1), move |n| log1.lock().unwrap().push((1, n.value)));
        let log2 = log.clone();
        signal.connect(ListenerId::new(2), move |n| log2.lock().unwrap().push((2, n.value)));

        signal.emit(0.5, snapshot(), &mut queue);
        assert_eq!(*log.lock().unwrap(), vec![(1, 0.5), (2, 0.5)]);
    }

    #[test]
    fn disconnect_removes_only_that_listener() {
        let mut signal = Signal::<()>::default();
        signal.connect(ListenerId::new(1), |_| {});
        signal.connect(ListenerId::new(2), |_| {});

        assert!(signal.disconnect(ListenerId::new(1)));
        assert!(!signal.disconnect(ListenerId::new(1)));
        assert_eq!(signal.len(), 1);
    }

    #[test]
    fn deferred_commands_land_in_queue() {
        let mut signal = Signal::<()>::default();
        let mut queue = CommandQueue::default();
        signal.connect(ListenerId::new(7), |n| n.defer(TimerCommand::Stop));
        signal.connect(ListenerId::new(8), |n| n.defer(TimerCommand::Start));

        signal.emit((), snapshot(), &mut queue);
        assert_eq!(queue.pop(), Some(TimerCommand::Stop));
        assert_eq!(queue.pop(), Some(TimerCommand::Start));
    }

    #[test]
    fn signals_disconnect_searches_every_channel() {
        let mut signals = Signals::default();
        signals.progress_changed.connect(ListenerId::new(3), |_| {});
        signals.started.connect(ListenerId::new(4), |_| {});
        assert_eq!(signals.len(), 2);

        assert!(signals.disconnect(ListenerId::new(3)));
        assert_eq!(signals.len(), 1);
        signals.clear();
        assert_eq!(signals.len(), 0);
    }
}
