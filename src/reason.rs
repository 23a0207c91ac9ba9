use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};
use std::ops::Deref;
use std::sync::Arc;

/// Why a promise was rejected.
///
/// A `Reason` is shared by every observer of a rejected promise, so it is a
/// cheap `Clone` over an `Arc`'d error. Any `std::error::Error` converts into
/// it; plain messages go through [`Reason::msg`].
///
/// A reason whose message renders empty counts as *absent*: rejecting with it
/// records [`Error::MissingReason`](crate::Error::MissingReason) instead (or
/// panics, see [`MissingReason`](crate::MissingReason)).
///
/// ```
/// use promise_settle::{Error, Reason};
///
/// let reason = Reason::from(Error::Canceled);
/// assert!(reason.is::<Error>());
/// assert_eq!(reason.to_string(), "wait canceled");
/// assert!(Reason::msg("").is_empty());
/// ```
#[derive(Clone)]
pub struct Reason(Arc<dyn StdError + Send + Sync + 'static>);

impl Reason {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    pub fn msg<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self(Arc::new(Message(message)))
    }

    /// True when the reason carries no message at all.
    pub fn is_empty(&self) -> bool {
        use std::fmt::Write;
        // Errors out on the first byte, so nothing past it is formatted.
        struct FirstByte;
        impl Write for FirstByte {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                if s.is_empty() {
                    Ok(())
                } else {
                    Err(fmt::Error)
                }
            }
        }
        write!(FirstByte, "{}", self.0).is_ok()
    }

    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.0.is::<E>()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    /// Whether both handles point at the very same rejection.
    pub fn ptr_eq(&self, other: &Reason) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<E> From<E> for Reason
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl Deref for Reason {
    type Target = dyn StdError + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl AsRef<dyn StdError + Send + Sync> for Reason {
    fn as_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.0
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Debug for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

struct Message<M>(M);

impl<M: Display> Display for Message<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<M: Debug> Debug for Message<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl<M: Display + Debug> StdError for Message<M> {}
