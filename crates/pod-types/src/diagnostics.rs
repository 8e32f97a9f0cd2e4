//! Injected diagnostics sink.
//!
//! Components are handed a [`Diagnostics`] when they are built and emit their
//! `tracing` events inside it, instead of logging to whatever happens to be
//! the process-wide subscriber at the time.

use std::fmt;

use tracing::Dispatch;

/// A cloneable handle to the subscriber a component reports to.
#[derive(Clone)]
pub struct Diagnostics {
    dispatch: Dispatch,
}

impl Diagnostics {
    /// The dispatcher that is current for the calling thread.
    pub fn current() -> Self {
        Self {
            dispatch: tracing::dispatcher::get_default(Dispatch::clone),
        }
    }

    /// A sink that drops everything.
    pub fn none() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    pub fn from_dispatch(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Run `f` with this sink as the default dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}

impl From<Dispatch> for Diagnostics {
    fn from(dispatch: Dispatch) -> Self {
        Self::from_dispatch(dispatch)
    }
}
