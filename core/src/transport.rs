//! Transport handles and capability probing.
//!
//! # Design
//! A [`Transport`] carries exactly one built request through its round-trip
//! and reports whether it can encode multipart form bodies. Acquisition
//! walks an ordered candidate list once per process, caches the winning
//! candidate, and afterwards hands out fresh handles as a pure function —
//! there is no global error handling involved, and an exhausted list is the
//! fatal "Ajax is not supported." condition.
//!
//! The stock candidate list holds a single ureq-backed transport. The list
//! shape is kept so tests (and embedders with their own transports) can
//! drive [`probe`] with alternative candidates.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::encode;
use crate::error::AjaxError;
use crate::http::{HttpRequest, HttpResponse, HttpVerb, RequestBody};

/// A handle capable of carrying one request through open → send → complete.
pub trait Transport {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Whether this transport can encode multipart form bodies. When it
    /// cannot, the executor falls back to a percent-encoded query string.
    fn supports_multipart(&self) -> bool;

    /// Execute the round-trip, returning the response as plain data.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AjaxError>;
}

/// A candidate constructor tried during probing. Returning `None` means the
/// implementation is unavailable in this environment.
pub type Probe = fn() -> Option<Box<dyn Transport>>;

fn probe_ureq() -> Option<Box<dyn Transport>> {
    Some(Box::new(UreqTransport::new()))
}

/// Candidates in preference order.
const CANDIDATES: &[Probe] = &[probe_ureq];

static CHOSEN: OnceLock<Option<Probe>> = OnceLock::new();

/// Walk a candidate list in order and return the first winner.
fn select(candidates: &[Probe]) -> Option<Probe> {
    for candidate in candidates {
        if let Some(transport) = candidate() {
            tracing::debug!(target: "ajax_core", transport = transport.name(), "transport selected");
            return Some(*candidate);
        }
    }
    None
}

/// Probe a candidate list and return a handle from the first winner.
///
/// An exhausted list yields [`AjaxError::Unsupported`].
pub fn probe(candidates: &[Probe]) -> Result<Box<dyn Transport>, AjaxError> {
    match select(candidates) {
        Some(winner) => winner().ok_or(AjaxError::Unsupported),
        None => Err(AjaxError::Unsupported),
    }
}

/// Return a fresh handle from the stock candidates.
///
/// The winning candidate is resolved once per process and cached; later
/// calls construct a new handle from the cached winner without re-probing.
pub fn acquire() -> Result<Box<dyn Transport>, AjaxError> {
    match CHOSEN.get_or_init(|| select(CANDIDATES)) {
        Some(winner) => winner().ok_or(AjaxError::Unsupported),
        None => Err(AjaxError::Unsupported),
    }
}

/// Transport backed by a blocking ureq agent.
///
/// Status codes are never mapped to errors here; completion fires for any
/// status and interpretation is left to the on-complete chain.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    fn body_text(request: &HttpRequest) -> Option<String> {
        match &request.body {
            RequestBody::None => None,
            RequestBody::Encoded(query) => Some(query.clone()),
            // This transport reports no multipart support, so the executor
            // never produces this shape for it; a hand-built request still
            // goes out as an encoded string.
            RequestBody::Form(entries) => Some(encode::encode_pairs(entries)),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn name(&self) -> &'static str {
        "ureq"
    }

    fn supports_multipart(&self) -> bool {
        false
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AjaxError> {
        let url = &request.url;
        let body = Self::body_text(request);

        let mut authorization = None;
        if !request.credentials.is_empty() {
            let raw = format!("{}:{}", request.credentials.user, request.credentials.pass);
            authorization = Some(format!("Basic {}", BASE64.encode(raw)));
        }

        let result = if request.method.takes_body() {
            let mut builder = match request.method {
                HttpVerb::Post => self.agent.post(url),
                HttpVerb::Put => self.agent.put(url),
                HttpVerb::Patch => self.agent.patch(url),
                _ => unreachable!("takes_body covers exactly these verbs"),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(auth) = &authorization {
                builder = builder.header("Authorization", auth.as_str());
            }
            match body {
                Some(text) => builder.send(text.as_bytes()),
                None => builder.send_empty(),
            }
        } else {
            let mut builder = match request.method {
                HttpVerb::Head => self.agent.head(url),
                HttpVerb::Get => self.agent.get(url),
                HttpVerb::Delete => self.agent.delete(url),
                HttpVerb::Trace => self.agent.trace(url),
                HttpVerb::Options => self.agent.options(url),
                HttpVerb::Connect => self.agent.connect(url),
                _ => unreachable!("bodyless verbs only"),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(auth) = &authorization {
                builder = builder.header("Authorization", auth.as_str());
            }
            builder.call()
        };

        let mut response = result.map_err(|e| AjaxError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.body_mut().read_to_string().unwrap_or_default();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
