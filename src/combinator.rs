//! Fan-in over many promises.
//!
//! Both combinators wait on every input on its own scoped thread, join them
//! all, and only then settle the combined promise. Slot `i` of the output
//! always belongs to input `i`; each waiter borrows exactly one slot mutably,
//! so the slots need no lock beyond the join.
use crate::cancel::Cancel;
use crate::{Error, Promise, Reason, SettledResult};
use std::thread::{self, Scope};
use tracing::warn;

fn fan_out<'scope, F>(scope: &'scope Scope<'scope, '_>, waiter: F) -> Option<Error>
where
    F: FnOnce() + Send + 'scope,
{
    match thread::Builder::new().spawn_scoped(scope, waiter) {
        Ok(_) => None,
        Err(err) => {
            warn!(%err, "failed to spawn waiter thread");
            Some(Error::Spawn(err.to_string()))
        }
    }
}

/// Resolves to every input's value in input order, or rejects with a failure
/// reason if any input rejects (or the token fires before it settles).
///
/// Every input is waited on before the combined promise settles; a rejection
/// does not cut the others short.
///
/// # Examples
///
/// ```
/// use promise_settle::{all, CancelToken, Promise};
///
/// let token = CancelToken::new();
/// let promises = (0..3).map(|i| Promise::new(move |resolve, _reject| resolve.resolve(i)));
/// let combined = all(&token, promises);
/// assert_eq!(combined.wait(&token).unwrap(), vec![0, 1, 2]);
/// ```
pub fn all<T, C, I>(token: &C, promises: I) -> Promise<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
    C: Cancel + Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let token = token.clone();
    let promises: Vec<Promise<T>> = promises.into_iter().collect();
    Promise::new(move |resolve, reject| match settle_slots(join_all(&token, &promises)) {
        Ok(values) => resolve.resolve(values),
        Err(reason) => reject.reject(reason),
    })
}

/// Resolves to every input's outcome in input order. Never rejects.
///
/// # Examples
///
/// ```
/// use promise_settle::{all_settled, CancelToken, Promise, Reason, Status};
///
/// let token = CancelToken::new();
/// let promises = vec![Promise::resolved(1), Promise::rejected(Reason::msg("💥"))];
/// let results = all_settled(&token, promises).wait(&token).unwrap();
/// assert_eq!(results[0].status, Status::Fulfilled);
/// assert_eq!(results[1].status, Status::Rejected);
/// ```
pub fn all_settled<T, C, I>(token: &C, promises: I) -> Promise<Vec<SettledResult<T>>>
where
    T: Clone + Send + Sync + 'static,
    C: Cancel + Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let token = token.clone();
    let promises: Vec<Promise<T>> = promises.into_iter().collect();
    Promise::new(move |resolve, _reject| {
        resolve.resolve(settle_outcomes(join_all(&token, &promises)))
    })
}

/// Waits on every promise, one scoped thread each, and returns once all of
/// them are done. Slot `i` stays `None` only if its waiter never stored.
fn join_all<T, C>(token: &C, promises: &[Promise<T>]) -> Vec<Option<Result<T, Reason>>>
where
    T: Clone + Send + Sync,
    C: Cancel + Sync,
{
    let mut slots: Vec<Option<Result<T, Reason>>> = promises.iter().map(|_| None).collect();
    let mut unstarted = vec![];
    thread::scope(|scope| {
        for (index, (promise, slot)) in promises.iter().zip(slots.iter_mut()).enumerate() {
            let waiter = move || *slot = Some(promise.wait(token));
            if let Some(err) = fan_out(scope, waiter) {
                unstarted.push((index, err));
            }
        }
    });
    for (index, err) in unstarted {
        slots[index] = Some(Err(err.into()));
    }
    slots
}

/// Every value in order, or the lowest-index failure. An empty slot is an
/// anomaly and fails with [`Error::MissingValue`].
fn settle_slots<T>(slots: Vec<Option<Result<T, Reason>>>) -> Result<Vec<T>, Reason> {
    slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| Err(Error::MissingValue.into())))
        .collect()
}

fn settle_outcomes<T>(slots: Vec<Option<Result<T, Reason>>>) -> Vec<SettledResult<T>> {
    slots
        .into_iter()
        .map(|slot| match slot {
            Some(result) => SettledResult::from(result),
            None => SettledResult::rejected(Error::MissingValue),
        })
        .collect()
}
