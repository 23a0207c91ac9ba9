//! The settlement cell: a write-once slot plus the gate announcing it.
use crate::signal::{self, Signal, Trigger};
use crate::{Error, MissingReason, Reason, Status};
use parking_lot::RwLock;
use std::task::{Poll, Waker};
use tracing::{debug, trace, warn};

#[derive(Debug)]
enum Outcome<T> {
    Pending,
    Fulfilled(T),
    Rejected(Reason),
}

impl<T> Outcome<T> {
    fn status(&self) -> Option<Status> {
        match self {
            Outcome::Pending => None,
            Outcome::Fulfilled(_) => Some(Status::Fulfilled),
            Outcome::Rejected(_) => Some(Status::Rejected),
        }
    }
}

#[derive(Debug)]
struct State<T> {
    outcome: Outcome<T>,
    // Taken and fired by the one settlement that wins.
    trigger: Option<Trigger>,
    wakers: Vec<Waker>,
}

#[derive(Debug)]
pub(crate) struct Cell<T> {
    state: RwLock<State<T>>,
    signal: Signal,
    missing_reason: MissingReason,
}

impl<T> Cell<T> {
    pub(crate) fn new(missing_reason: MissingReason) -> Self {
        let (trigger, signal) = signal::pair();
        Self {
            state: RwLock::new(State {
                outcome: Outcome::Pending,
                trigger: Some(trigger),
                wakers: vec![],
            }),
            signal,
            missing_reason,
        }
    }

    pub(crate) fn signal(&self) -> &Signal {
        &self.signal
    }

    pub(crate) fn fulfill(&self, value: T) -> bool {
        self.settle(move || Outcome::Fulfilled(value))
    }

    pub(crate) fn reject(&self, reason: Reason) -> bool {
        let missing_reason = self.missing_reason;
        self.settle(move || {
            if !reason.is_empty() {
                return Outcome::Rejected(reason);
            }
            match missing_reason {
                MissingReason::Panic => panic!("promise rejected without a reason"),
                MissingReason::Substitute => {
                    warn!("promise rejected without a reason, substituting one");
                    Outcome::Rejected(Error::MissingReason.into())
                }
            }
        })
    }

    /// Records a terminal outcome unless one is already there. The check and
    /// the write happen under one write lock; the gate opens before the lock
    /// is released, so anyone who sees it open reads the final outcome.
    fn settle(&self, outcome: impl FnOnce() -> Outcome<T>) -> bool {
        let wakers = {
            let mut state = self.state.write();
            if state.outcome.status().is_some() {
                debug!("promise already settled, ignoring");
                return false;
            }
            state.outcome = outcome();
            if let Some(status) = state.outcome.status() {
                trace!(%status, "promise settled");
            }
            if let Some(trigger) = state.trigger.take() {
                trigger.fire();
            }
            std::mem::take(&mut state.wakers)
        };
        for waker in wakers {
            waker.wake()
        }
        true
    }

    pub(crate) fn status(&self) -> Option<Status> {
        self.state.read().outcome.status()
    }

    pub(crate) fn reason(&self) -> Option<Reason> {
        match &self.state.read().outcome {
            Outcome::Rejected(reason) => Some(reason.clone()),
            _ => None,
        }
    }
}

impl<T: Clone> Cell<T> {
    pub(crate) fn value(&self) -> Option<T> {
        match &self.state.read().outcome {
            Outcome::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// The terminal outcome as a `Result`. Only meaningful once the gate is
    /// open; a pending cell reads as [`Error::MissingValue`].
    pub(crate) fn snapshot(&self) -> Result<T, Reason> {
        match &self.state.read().outcome {
            Outcome::Fulfilled(value) => Ok(value.clone()),
            Outcome::Rejected(reason) => Err(reason.clone()),
            Outcome::Pending => Err(Error::MissingValue.into()),
        }
    }

    pub(crate) fn poll_settled(&self, waker: &Waker) -> Poll<Result<T, Reason>> {
        let mut state = self.state.write();
        match &state.outcome {
            Outcome::Fulfilled(value) => Poll::Ready(Ok(value.clone())),
            Outcome::Rejected(reason) => Poll::Ready(Err(reason.clone())),
            Outcome::Pending => {
                if !state.wakers.iter().any(|known| known.will_wake(waker)) {
                    state.wakers.push(waker.clone());
                }
                Poll::Pending
            }
        }
    }
}
