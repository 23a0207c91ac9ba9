use crate::Reason;
use std::fmt;

/// Terminal state of a settled promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    Fulfilled = 0,
    Rejected = 1,
}

const STATUS_STRINGS: [&str; 2] = ["fulfilled", "rejected"];

impl Status {
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn as_str(self) -> &'static str {
        STATUS_STRINGS[self as usize]
    }

    /// Renders a raw status code; anything out of range is `"unknown"`.
    ///
    /// ```
    /// use promise_settle::Status;
    ///
    /// assert_eq!(Status::describe(1), "rejected");
    /// assert_eq!(Status::describe(7), "unknown");
    /// ```
    pub fn describe(code: i32) -> &'static str {
        Status::try_from(code).map_or("unknown", Status::as_str)
    }
}

impl TryFrom<i32> for Status {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Status::Fulfilled),
            1 => Ok(Status::Rejected),
            other => Err(other),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slot of an [`all_settled`](crate::all_settled) result.
///
/// `value` is `Some` iff the status is `Fulfilled`, `reason` is `Some` iff it
/// is `Rejected`.
#[derive(Debug, Clone)]
pub struct SettledResult<T> {
    pub status: Status,
    pub value: Option<T>,
    pub reason: Option<Reason>,
}

impl<T> SettledResult<T> {
    pub fn fulfilled(value: T) -> Self {
        Self {
            status: Status::Fulfilled,
            value: Some(value),
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<Reason>) -> Self {
        Self {
            status: Status::Rejected,
            value: None,
            reason: Some(reason.into()),
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status == Status::Fulfilled
    }

    pub fn is_rejected(&self) -> bool {
        self.status == Status::Rejected
    }

    pub fn into_result(self) -> Result<T, Reason> {
        match (self.value, self.reason) {
            (Some(value), None) => Ok(value),
            (_, Some(reason)) => Err(reason),
            (None, None) => Err(crate::Error::MissingValue.into()),
        }
    }
}

impl<T> From<Result<T, Reason>> for SettledResult<T> {
    fn from(result: Result<T, Reason>) -> Self {
        match result {
            Ok(value) => Self::fulfilled(value),
            Err(reason) => Self::rejected(reason),
        }
    }
}
