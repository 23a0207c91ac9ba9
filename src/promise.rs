use crate::cancel::Cancel;
use crate::cell::Cell;
use crate::signal::{Fired, Signal};
use crate::{Error, Reason, Status};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;
use tracing::{debug, error};

/// What to do when a promise is rejected with an empty [`Reason`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingReason {
    /// Reject with [`Error::MissingReason`] instead.
    #[default]
    Substitute,
    /// Panic on the rejecting thread.
    Panic,
}

/// Eventual outcome of an executor running on its own thread.
///
/// A `Promise` settles exactly once, either fulfilled with a `T` or rejected
/// with a [`Reason`]. Handles are cheap to clone and every clone observes the
/// same outcome.
///
/// # Examples
///
/// ```
/// use promise_settle::{CancelToken, Promise};
///
/// let token = CancelToken::new();
/// let promise = Promise::new(|resolve, _reject| resolve.resolve(String::from("🍓")));
/// assert_eq!(promise.wait(&token).unwrap(), "🍓");
/// ```
pub struct Promise<T> {
    cell: Arc<Cell<T>>,
}

/// Fulfills the promise it was handed out for. Repeat calls are no-ops.
pub struct Resolve<T> {
    cell: Arc<Cell<T>>,
}

/// Rejects the promise it was handed out for. Repeat calls are no-ops.
pub struct Reject<T> {
    cell: Arc<Cell<T>>,
}

impl<T> Resolve<T> {
    pub fn resolve(&self, value: T) {
        self.cell.fulfill(value);
    }
}

impl<T> Reject<T> {
    /// An empty reason is handled according to the promise's
    /// [`MissingReason`] policy.
    pub fn reject(&self, reason: impl Into<Reason>) {
        self.cell.reject(reason.into());
    }
}

impl<T> Clone for Resolve<T> {
    fn clone(&self) -> Self {
        Self { cell: self.cell.clone() }
    }
}

impl<T> Clone for Reject<T> {
    fn clone(&self) -> Self {
        Self { cell: self.cell.clone() }
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self { cell: self.cell.clone() }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("status", &self.cell.status())
            .finish_non_exhaustive()
    }
}

/// Configures how a promise's executor is launched.
///
/// ```
/// use promise_settle::{Builder, CancelToken, MissingReason, Reason};
///
/// let promise = Builder::new()
///     .name("loader".into())
///     .missing_reason(MissingReason::Substitute)
///     .spawn(|_resolve: promise_settle::Resolve<u8>, reject| reject.reject(Reason::msg("")));
/// let reason = promise.wait(&CancelToken::new()).unwrap_err();
/// assert_eq!(reason.to_string(), "promise rejected without a reason");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    name: Option<String>,
    stack_size: Option<usize>,
    missing_reason: MissingReason,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the executor thread.
    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    pub fn missing_reason(mut self, policy: MissingReason) -> Self {
        self.missing_reason = policy;
        self
    }

    /// Starts `executor` on a new thread and returns immediately.
    ///
    /// If the executor never calls `resolve` or `reject`, the promise stays
    /// pending forever. If the thread cannot be started, the promise is
    /// rejected with [`Error::Spawn`].
    pub fn spawn<T, F>(self, executor: F) -> Promise<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Resolve<T>, Reject<T>) + Send + 'static,
    {
        let promise = Promise {
            cell: Arc::new(Cell::new(self.missing_reason)),
        };
        let resolve = Resolve { cell: promise.cell.clone() };
        let reject = Reject { cell: promise.cell.clone() };

        let mut thread = thread::Builder::new();
        if let Some(name) = self.name {
            thread = thread.name(name);
        }
        if let Some(size) = self.stack_size {
            thread = thread.stack_size(size);
        }
        if let Err(err) = thread.spawn(move || executor(resolve, reject)) {
            error!(%err, "failed to spawn promise executor");
            promise.cell.reject(Error::Spawn(err.to_string()).into());
        }
        promise
    }
}

impl<T> Promise<T>
where
    T: Send + Sync + 'static,
{
    /// Runs `executor` concurrently; see [`Builder::spawn`].
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(Resolve<T>, Reject<T>) + Send + 'static,
    {
        Builder::new().spawn(executor)
    }
}

impl<T> Promise<T> {
    /// An already fulfilled promise. No thread is started.
    pub fn resolved(value: T) -> Self {
        let cell = Cell::new(MissingReason::default());
        cell.fulfill(value);
        Self { cell: Arc::new(cell) }
    }

    /// An already rejected promise. No thread is started.
    pub fn rejected(reason: impl Into<Reason>) -> Self {
        let cell = Cell::new(MissingReason::default());
        cell.reject(reason.into());
        Self { cell: Arc::new(cell) }
    }

    /// Fires once the promise settles.
    pub fn done(&self) -> &Signal {
        self.cell.signal()
    }

    // Settlement observed at entry wins over an already fired token.
    fn wait_settled<C: Cancel + ?Sized>(&self, token: &C) -> Result<(), Reason> {
        let done = self.cell.signal();
        if done.is_fired() {
            return Ok(());
        }
        match done.wait_either(token.signal()) {
            Fired::This => Ok(()),
            Fired::Other => {
                debug!("wait on promise abandoned");
                Err(token.reason().unwrap_or_else(|| Error::Canceled.into()))
            }
        }
    }

    /// Runs `on_fulfilled` on this thread once the promise is fulfilled.
    ///
    /// A rejected promise skips the callback. `Err` carries the token's
    /// reason and means the token fired first and the callback did not run.
    pub fn then<C, F>(&self, token: &C, on_fulfilled: F) -> Result<&Self, Reason>
    where
        T: Clone,
        C: Cancel + ?Sized,
        F: FnOnce(T),
    {
        self.wait_settled(token)?;
        if let Some(value) = self.cell.value() {
            on_fulfilled(value);
        }
        Ok(self)
    }

    /// Like [`Promise::then`], for the rejected branch.
    pub fn catch<C, F>(&self, token: &C, on_rejected: F) -> Result<&Self, Reason>
    where
        C: Cancel + ?Sized,
        F: FnOnce(Reason),
    {
        self.wait_settled(token)?;
        if let Some(reason) = self.cell.reason() {
            on_rejected(reason);
        }
        Ok(self)
    }

    /// Like [`Promise::then`], whatever the outcome.
    pub fn finally<C, F>(&self, token: &C, on_finally: F) -> Result<&Self, Reason>
    where
        C: Cancel + ?Sized,
        F: FnOnce(),
    {
        self.wait_settled(token)?;
        on_finally();
        Ok(self)
    }

    /// The reason, if rejected. Racy: call after waiting.
    pub fn reason(&self) -> Option<Reason> {
        self.cell.reason()
    }

    /// `None` while pending. Racy: call after waiting.
    pub fn status(&self) -> Option<Status> {
        self.cell.status()
    }

    /// Racy: call after waiting.
    pub fn is_fulfilled(&self) -> bool {
        self.status() == Some(Status::Fulfilled)
    }

    /// Racy: call after waiting.
    pub fn is_rejected(&self) -> bool {
        self.status() == Some(Status::Rejected)
    }

    /// Racy: call after waiting.
    pub fn is_settled(&self) -> bool {
        self.status().is_some()
    }
}

impl<T: Clone> Promise<T> {
    /// Blocks until the promise settles or `token` fires, whichever comes
    /// first.
    ///
    /// A fired token returns its reason and leaves the promise untouched: the
    /// executor keeps running and other waiters still see the settlement.
    pub fn wait<C: Cancel + ?Sized>(&self, token: &C) -> Result<T, Reason> {
        self.wait_settled(token)?;
        self.cell.snapshot()
    }

    /// The fulfilled value, if any. Racy: call after waiting.
    pub fn value(&self) -> Option<T> {
        self.cell.value()
    }

    /// Awaits settlement from async code. Dropping the future abandons the
    /// wait.
    ///
    /// Each task that polls a pending `Settled` leaves its waker with the
    /// promise until it settles, even if the future is dropped first. Waiting
    /// asynchronously on a promise that may never settle keeps those wakers
    /// alive for as long as the promise lives.
    ///
    /// ```
    /// use futures::executor::block_on;
    /// use promise_settle::Promise;
    ///
    /// let promise = Promise::new(|resolve, _reject| resolve.resolve(7));
    /// assert_eq!(block_on(promise.settled()).unwrap(), 7);
    /// ```
    pub fn settled(&self) -> Settled<T> {
        Settled { cell: self.cell.clone() }
    }
}

/// Future returned by [`Promise::settled`].
pub struct Settled<T> {
    cell: Arc<Cell<T>>,
}

impl<T: Clone> Future for Settled<T> {
    type Output = Result<T, Reason>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.cell.poll_settled(cx.waker())
    }
}
