//! Error types for request execution.
//!
//! # Design
//! Capability failure gets a dedicated variant because it is fatal: no
//! candidate transport could be constructed, and no request can ever
//! proceed in that environment. Everything else that can go wrong during a
//! single request is local to it — transport I/O failures carry the
//! underlying message, and a response body that fails JSON decoding is not
//! an error at all but a [`Payload::Invalid`](crate::Payload) delivered to
//! the on-complete chain.

use std::fmt;

/// Errors surfaced by transport acquisition and [`Ajax::execute`](crate::Ajax::execute).
#[derive(Debug)]
pub enum AjaxError {
    /// No candidate transport could be constructed.
    Unsupported,

    /// The transport failed to carry out the round-trip.
    Transport(String),
}

impl fmt::Display for AjaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AjaxError::Unsupported => write!(f, "Ajax is not supported."),
            AjaxError::Transport(msg) => write!(f, "transport failed: {msg}"),
        }
    }
}

impl std::error::Error for AjaxError {}
