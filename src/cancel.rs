//! Cancellation of waits.
//!
//! Waiting on a promise takes a [`Cancel`] implementation. When its signal
//! fires first, the wait is abandoned and the token's reason is returned; the
//! promise itself keeps settling for everybody else.
use crate::signal::{self, Signal, Trigger};
use crate::{Error, Reason};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// A source of "stop waiting" signals.
pub trait Cancel {
    /// Fires when the token is cancelled.
    fn signal(&self) -> &Signal;

    /// Why the token fired. `None` while it has not fired.
    fn reason(&self) -> Option<Reason>;

    fn is_cancelled(&self) -> bool {
        self.signal().is_fired()
    }
}

impl<C: Cancel + ?Sized> Cancel for &C {
    fn signal(&self) -> &Signal {
        (**self).signal()
    }

    fn reason(&self) -> Option<Reason> {
        (**self).reason()
    }
}

impl<C: Cancel + ?Sized> Cancel for Arc<C> {
    fn signal(&self) -> &Signal {
        (**self).signal()
    }

    fn reason(&self) -> Option<Reason> {
        (**self).reason()
    }
}

/// A cloneable token, cancelled by hand or by a deadline.
///
/// # Examples
///
/// ```
/// use promise_settle::{Cancel, CancelToken, Error};
///
/// let token = CancelToken::new();
/// let observer = token.clone();
/// assert!(observer.reason().is_none());
/// token.cancel();
/// assert!(observer.is_cancelled());
/// let reason = observer.reason().unwrap();
/// assert_eq!(reason.downcast_ref::<Error>(), Some(&Error::Canceled));
/// ```
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    trigger: Mutex<Option<Trigger>>,
    signal: Signal,
    reason: OnceLock<Reason>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = signal::pair();
        Self::from_parts(Some(trigger), signal)
    }

    /// A token that never fires. Cancelling it does nothing.
    pub fn never() -> Self {
        Self::from_parts(None, Signal::never())
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        let (trigger, signal) = signal::pair();
        Self::from_parts(Some(trigger), signal.until(deadline))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    fn from_parts(trigger: Option<Trigger>, signal: Signal) -> Self {
        Self {
            inner: Arc::new(Inner {
                trigger: Mutex::new(trigger),
                signal,
                reason: OnceLock::new(),
            }),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.signal.deadline()
    }

    /// Fires with [`Error::Canceled`].
    pub fn cancel(&self) {
        self.cancel_with(Error::Canceled)
    }

    /// Fires with the given reason. Later calls change nothing.
    pub fn cancel_with(&self, reason: impl Into<Reason>) {
        let mut trigger = self.inner.trigger.lock();
        if let Some(trigger) = trigger.take() {
            self.expire();
            let _ = self.inner.reason.set(reason.into());
            trigger.fire();
        }
    }

    fn deadline_passed(&self) -> bool {
        self.deadline()
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn expire(&self) {
        if self.deadline_passed() {
            let _ = self.inner.reason.set(Error::DeadlineExceeded.into());
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancel for CancelToken {
    fn signal(&self) -> &Signal {
        &self.inner.signal
    }

    fn reason(&self) -> Option<Reason> {
        if let Some(reason) = self.inner.reason.get() {
            return Some(reason.clone());
        }
        if self.deadline_passed() {
            self.expire();
            return self.inner.reason.get().cloned();
        }
        None
    }
}
