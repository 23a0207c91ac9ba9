//! Single-assignment promises for threaded code.
//!
//! A [`Promise`] runs an executor on its own thread and settles exactly once,
//! fulfilled with a value or rejected with a [`Reason`]. Any number of threads
//! can block on it with [`Promise::wait`], each passing a [`Cancel`] token that
//! lets it give up waiting without touching the work itself. [`all`] and
//! [`all_settled`] combine many promises into one.
//!
//! # Examples
//!
//! ```
//! use promise_settle::{all_settled, CancelToken, Promise, Reason};
//! use std::thread;
//! use std::time::Duration;
//!
//! let token = CancelToken::new();
//! let slow = Promise::new(|resolve, _reject| {
//!     thread::sleep(Duration::from_millis(10));
//!     resolve.resolve(1)
//! });
//! let broken = Promise::new(|_resolve, reject| reject.reject(Reason::msg("💥")));
//!
//! let results = all_settled(&token, [slow, broken]).wait(&token).unwrap();
//! assert_eq!(results[0].value, Some(1));
//! assert_eq!(results[1].reason.as_ref().unwrap().to_string(), "💥");
//! ```
mod cancel;
mod cell;
mod combinator;
mod promise;
mod reason;
mod signal;
mod status;

pub use cancel::{Cancel, CancelToken};
pub use combinator::{all, all_settled};
pub use promise::{Builder, MissingReason, Promise, Reject, Resolve, Settled};
pub use reason::Reason;
pub use signal::Signal;
pub use status::{SettledResult, Status};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("promise rejected without a reason")]
    MissingReason,
    #[error("promise settled without a value")]
    MissingValue,
    #[error("wait canceled")]
    Canceled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("failed to spawn thread: {0}")]
    Spawn(String),
}
