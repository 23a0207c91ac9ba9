//! One-shot broadcast gate.
//!
//! A [`Signal`] fires exactly once and stays fired. It is backed by a
//! crossbeam channel that never carries a message: firing drops the only
//! sender, and every receiver, present or future, observes the disconnect.
//! A signal may additionally carry a deadline, after which it counts as fired
//! without anyone touching the sender.
use crossbeam_channel::{at, never, select, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::{Duration, Instant};

enum Never {}

/// The observing half of a one-shot gate. Cloning shares the same gate.
#[derive(Debug, Clone)]
pub struct Signal {
    receiver: Receiver<Never>,
    deadline: Option<Instant>,
}

/// The firing half. Dropping it without calling [`Trigger::fire`] fires too.
#[derive(Debug)]
pub(crate) struct Trigger {
    _sender: Sender<Never>,
}

/// Which of two signals opened first in [`Signal::wait_either`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fired {
    This,
    Other,
}

impl Trigger {
    pub(crate) fn fire(self) {}
}

pub(crate) fn pair() -> (Trigger, Signal) {
    let (sender, receiver) = crossbeam_channel::bounded(0);
    (
        Trigger { _sender: sender },
        Signal {
            receiver,
            deadline: None,
        },
    )
}

impl Signal {
    /// A signal that never fires on its own.
    pub fn never() -> Self {
        Self {
            receiver: never(),
            deadline: None,
        }
    }

    /// The same gate, additionally fired once `deadline` passes.
    pub(crate) fn until(self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self {
            receiver: self.receiver,
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check.
    pub fn is_fired(&self) -> bool {
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return true;
        }
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Blocks until the signal fires.
    pub fn wait(&self) {
        match self.deadline {
            Some(deadline) => {
                let _ = self.receiver.recv_deadline(deadline);
            }
            None => {
                let _ = self.receiver.recv();
            }
        }
    }

    /// Blocks for at most `timeout`; returns whether the signal fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let limit = Instant::now() + timeout;
        let limit = match self.deadline {
            Some(deadline) if deadline <= limit => deadline,
            _ => limit,
        };
        match self.receiver.recv_deadline(limit) {
            Err(RecvTimeoutError::Timeout) => self.is_fired(),
            _ => true,
        }
    }

    /// Blocks until either signal fires. Holds no lock while blocked.
    pub(crate) fn wait_either(&self, other: &Signal) -> Fired {
        let this_deadline = self.deadline.map(at).unwrap_or_else(never);
        let other_deadline = other.deadline.map(at).unwrap_or_else(never);
        select! {
            recv(&self.receiver) -> _ => Fired::This,
            recv(&this_deadline) -> _ => Fired::This,
            recv(&other.receiver) -> _ => Fired::Other,
            recv(&other_deadline) -> _ => Fired::Other,
        }
    }
}
