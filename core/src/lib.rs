//! Declarative single-request HTTP convenience layer.
//!
//! # Overview
//! Configure a request once — URL, verb, headers, payload, credentials —
//! then fire it with lifecycle callbacks bracketing the send: before-send
//! callbacks may veto the request, on-complete callbacks receive the
//! response decoded as strict JSON. Each execution drives exactly one
//! request through open → send → complete; there is no retry, queuing, or
//! multi-request coordination.
//!
//! # Design
//! - [`Ajax`] is the mutable builder; every mutator returns `&mut Self` for
//!   fluent chaining, and the builder keeps an append-only history of raw
//!   response bodies and built requests.
//! - Transports are probed once per process from an ordered candidate list
//!   and cached; [`Transport`] is the seam for injecting test doubles.
//! - Response bodies are only ever decoded with `serde_json`; a body that
//!   is not valid JSON reaches the completion chain as
//!   [`Payload::Invalid`], never as an evaluation of remote text.

pub mod builder;
pub mod callbacks;
pub mod encode;
pub mod error;
pub mod http;
pub mod transport;

mod executor;

pub use builder::{Ajax, DataInput, Options};
pub use callbacks::{AfterFn, BeforeFn, CallbackInput, Flow};
pub use error::AjaxError;
pub use http::{Credentials, HttpRequest, HttpResponse, HttpVerb, Payload, RequestBody};
pub use transport::{Probe, Transport, UreqTransport};
