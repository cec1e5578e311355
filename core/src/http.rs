//! HTTP request and response types.
//!
//! # Design
//! Requests are described as plain data. The builder assembles an
//! `HttpRequest` value and hands it to a [`Transport`](crate::Transport)
//! for the actual round-trip, so everything up to the send is deterministic
//! and testable without a network. All fields use owned types (`String`,
//! `Vec`) so values can be appended to the request history without lifetime
//! concerns.

use serde_json::Value;

/// The fixed set of HTTP verbs a request can carry.
///
/// Anything outside this set normalizes to `Get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Head,
    Get,
    Post,
    Put,
    Delete,
    Trace,
    Options,
    Connect,
    Patch,
}

impl HttpVerb {
    /// Normalize a method string to a canonical verb.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Unrecognized input falls back to `Get`.
    pub fn normalize(method: &str) -> Self {
        match method.trim().to_ascii_uppercase().as_str() {
            "HEAD" => Self::Head,
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "TRACE" => Self::Trace,
            "OPTIONS" => Self::Options,
            "CONNECT" => Self::Connect,
            "PATCH" => Self::Patch,
            _ => Self::Get,
        }
    }

    /// The canonical uppercase wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Trace => "TRACE",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Patch => "PATCH",
        }
    }

    /// Whether a request with this verb carries a body on the wire.
    pub fn takes_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl std::fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic credentials applied when `user` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.user.is_empty()
    }
}

/// Serialized request payload, shaped by the transport's capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// No data was configured.
    None,
    /// Multipart form entries, for transports that support form encoding.
    Form(Vec<(String, String)>),
    /// Percent-encoded `key=value&key=value` string.
    Encoded(String),
}

/// A fully built request, ready to hand to a transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpVerb,
    pub url: String,
    /// Insertion-ordered; the implicit `X-Requested-With` marker comes first.
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub credentials: Credentials,
}

impl HttpRequest {
    /// Look up a header value by name (exact match).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// The transport's answer, as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// The decoded response payload handed to on-complete callbacks.
///
/// Response text is always decoded with a strict JSON parser; it is never
/// evaluated. A body that fails to parse arrives as `Invalid` so callbacks
/// can observe the failure without the request erroring out.
#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    Invalid { error: String },
}

impl Payload {
    pub(crate) fn decode(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(value) => Self::Json(value),
            Err(e) => {
                tracing::warn!(target: "ajax_core", "response body is not valid JSON: {e}");
                Self::Invalid {
                    error: e.to_string(),
                }
            }
        }
    }

    /// The parsed JSON value, if decoding succeeded.
    pub fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Invalid { .. } => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}
