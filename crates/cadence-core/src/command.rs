//! Commands that listeners queue against the timer that notified them.
//!
//! A listener never holds the timer while it runs. It records what it wants
//! done and the timer applies the queue, in order, once the call that fired
//! the notification has finished emitting.

use std::collections::VecDeque;

use crate::signal::ListenerId;

/// A mutation requested from inside a notification handler.
///
/// There is no tick variant: only the frame driver advances time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerCommand {
    Start,
    StartAt(f32),
    Pause,
    Resume,
    Stop,
    ForceStart,
    ForceStartAt(f32),
    SetDuration(f32),
    SetCurrentTime(f32),
    SetProgress(f32),
    SetLooping(bool),
    Unsubscribe(ListenerId),
}

/// FIFO of commands waiting to be applied.
#[derive(Debug, Default)]
pub(crate) struct CommandQueue {
    pending: VecDeque<TimerCommand>,
}

impl CommandQueue {
    pub(crate) fn push(&mut self, command: TimerCommand) {
        self.pending.push_back(command);
    }

    pub(crate) fn pop(&mut self) -> Option<TimerCommand> {
        self.pending.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_push_order() {
        let mut queue = CommandQueue::default();
        queue.push(TimerCommand::Stop);
        queue.push(TimerCommand::StartAt(2.0));
        queue.push(TimerCommand::Pause);
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.pop(), Some(TimerCommand::Stop));
        assert_eq!(queue.pop(), Some(TimerCommand::StartAt(2.0)));
        assert_eq!(queue.pop(), Some(TimerCommand::Pause));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn clear_drops_everything() {
        let mut queue = CommandQueue::default();
        queue.push(TimerCommand::Resume);
        queue.push(TimerCommand::SetLooping(true));
        queue.clear();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.pop(), None);
    }
}
