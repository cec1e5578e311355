//! Lifecycle callback chains.
//!
//! # Design
//! Two ordered chains bracket every request: before-send callbacks see the
//! built [`HttpRequest`] and may veto the send, on-complete callbacks see
//! the decoded [`Payload`] together with the raw [`HttpResponse`]. Insertion
//! order is execution order, and any callback can stop the remainder of its
//! own chain by returning [`Flow::Stop`]. Stopping is ordinary control flow,
//! never an error.
//!
//! Callback inputs arrive in several shapes; [`CallbackInput`] models them
//! as an explicit tagged variant so dispatch is a `match`, not runtime type
//! probing.

use crate::http::{HttpRequest, HttpResponse, Payload};

/// Verdict returned by a callback: keep going or stop this chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Skip the remaining callbacks in this chain. From a before-send
    /// callback this also vetoes the send.
    Stop,
}

/// A callback run before the request is handed to the transport.
pub type BeforeFn = Box<dyn FnMut(&HttpRequest) -> Flow>;

/// A callback run after the transport signals completion.
pub type AfterFn = Box<dyn FnMut(&Payload, &HttpResponse) -> Flow>;

/// The shapes accepted when registering callbacks.
///
/// `Single` and `List` target the on-complete chain; `Phased` routes each
/// side to its matching chain.
pub enum CallbackInput {
    Single(AfterFn),
    List(Vec<AfterFn>),
    Phased {
        before: Vec<BeforeFn>,
        after: Vec<AfterFn>,
    },
}

impl CallbackInput {
    /// A single on-complete callback.
    pub fn single(f: impl FnMut(&Payload, &HttpResponse) -> Flow + 'static) -> Self {
        Self::Single(Box::new(f))
    }
}

impl<F> From<F> for CallbackInput
where
    F: FnMut(&Payload, &HttpResponse) -> Flow + 'static,
{
    fn from(f: F) -> Self {
        Self::Single(Box::new(f))
    }
}

/// The two ordered chains owned by a builder.
#[derive(Default)]
pub struct CallbackChains {
    pub(crate) before: Vec<BeforeFn>,
    pub(crate) after: Vec<AfterFn>,
}

impl CallbackChains {
    pub(crate) fn clear(&mut self) {
        self.before.clear();
        self.after.clear();
    }

    /// Route an input to the matching chain(s).
    pub(crate) fn add(&mut self, input: CallbackInput) {
        match input {
            CallbackInput::Single(f) => self.after.push(f),
            CallbackInput::List(fns) => self.after.extend(fns),
            CallbackInput::Phased { before, after } => {
                self.before.extend(before);
                self.after.extend(after);
            }
        }
    }

    /// Run the before-send chain. Returns `Flow::Stop` if any callback
    /// vetoed; the remaining callbacks are skipped.
    pub(crate) fn run_before(&mut self, request: &HttpRequest) -> Flow {
        for callback in &mut self.before {
            if callback(request) == Flow::Stop {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Run the on-complete chain in insertion order, stopping early if a
    /// callback returns `Flow::Stop`.
    pub(crate) fn run_after(&mut self, payload: &Payload, response: &HttpResponse) {
        for callback in &mut self.after {
            if callback(payload, response) == Flow::Stop {
                break;
            }
        }
    }
}

impl std::fmt::Debug for CallbackChains {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackChains")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}
