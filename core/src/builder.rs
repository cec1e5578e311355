//! The request builder.
//!
//! # Design
//! [`Ajax`] owns one request configuration plus its lifecycle callback
//! chains and a grow-only history of what it has sent and received. Every
//! mutating method returns `&mut Self` so configuration reads as one fluent
//! chain:
//!
//! ```ignore
//! let mut request = Ajax::new(Options {
//!     url: "http://example.test/search".into(),
//!     method: Some("get".into()),
//!     ..Options::default()
//! });
//! request
//!     .set_data([("q", json!("rust"))], false)
//!     .set_headers([("Accept", "application/json")], false)
//!     .on_complete(|payload, _| {
//!         println!("{:?}", payload.json());
//!         Flow::Continue
//!     })
//!     .execute()?;
//! ```

use serde_json::Value;

use crate::callbacks::{CallbackChains, CallbackInput, Flow};
use crate::http::{Credentials, HttpRequest, HttpResponse, HttpVerb, Payload};

/// Data accepted by [`Ajax::set_data`]: either named entries or a positional
/// sequence. Sequence entries are keyed by their index rendered as a string
/// (`"0"`, `"1"`, ...).
pub enum DataInput {
    Map(Vec<(String, Value)>),
    List(Vec<Value>),
}

impl From<Vec<(String, Value)>> for DataInput {
    fn from(entries: Vec<(String, Value)>) -> Self {
        Self::Map(entries)
    }
}

impl<K: Into<String>, const N: usize> From<[(K, Value); N]> for DataInput {
    fn from(entries: [(K, Value); N]) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<const N: usize> From<[Value; N]> for DataInput {
    fn from(values: [Value; N]) -> Self {
        Self::List(values.into_iter().collect())
    }
}

impl From<Value> for DataInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Map(map.into_iter().collect()),
            Value::Array(values) => Self::List(values),
            other => Self::List(vec![other]),
        }
    }
}

/// Construction options. Unset fields keep their defaults: method POST,
/// response type `"json"`, everything else empty.
#[derive(Default)]
pub struct Options {
    pub url: String,
    /// Method string, normalized through [`HttpVerb::normalize`].
    pub method: Option<String>,
    pub data: Option<DataInput>,
    pub headers: Vec<(String, String)>,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Informational; recorded but not interpreted.
    pub response_type: Option<String>,
    pub callbacks: Option<CallbackInput>,
    /// Skip re-detecting multipart form support on each execution and keep
    /// the currently cached capability instead.
    pub dont_check_form_data: bool,
}

/// A configurable, reusable single-request builder.
///
/// Each call to [`execute`](Ajax::execute) drives one independent request
/// through its lifecycle; the raw response body and the built request are
/// appended to this builder's history afterwards and kept for its lifetime.
pub struct Ajax {
    pub(crate) url: String,
    pub(crate) method: HttpVerb,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) data: Vec<(String, Value)>,
    pub(crate) credentials: Credentials,
    pub(crate) response_type: String,
    pub(crate) chains: CallbackChains,
    pub(crate) responses: Vec<String>,
    pub(crate) requests: Vec<HttpRequest>,
    pub(crate) dont_check_form_data: bool,
    pub(crate) use_form_data: bool,
}

impl Ajax {
    pub fn new(options: Options) -> Self {
        let mut ajax = Self {
            url: options.url,
            method: HttpVerb::Post,
            headers: Vec::new(),
            data: Vec::new(),
            credentials: Credentials::default(),
            response_type: "json".to_string(),
            chains: CallbackChains::default(),
            responses: Vec::new(),
            requests: Vec::new(),
            dont_check_form_data: options.dont_check_form_data,
            use_form_data: false,
        };

        if let Some(method) = options.method {
            ajax.method = HttpVerb::normalize(&method);
        }
        if let Some(data) = options.data {
            ajax.set_data(data, false);
        }
        ajax.set_headers(options.headers, false);
        if let Some(user) = options.user {
            ajax.credentials.user = user;
        }
        if let Some(pass) = options.pass {
            ajax.credentials.pass = pass;
        }
        if let Some(response_type) = options.response_type {
            ajax.response_type = response_type;
        }
        if let Some(callbacks) = options.callbacks {
            ajax.add_callback(callbacks, false);
        }

        ajax
    }

    /// Factory form of [`Ajax::new`].
    pub fn create(options: Options) -> Self {
        Self::new(options)
    }

    /// Merge data entries into the configured set. A later write to an
    /// existing key replaces its value in place; new keys append in input
    /// order. `reset` clears the set first.
    pub fn set_data(&mut self, data: impl Into<DataInput>, reset: bool) -> &mut Self {
        if reset {
            self.data.clear();
        }
        match data.into() {
            DataInput::Map(entries) => {
                for (key, value) in entries {
                    self.merge_entry(key, value);
                }
            }
            DataInput::List(values) => {
                for (index, value) in values.into_iter().enumerate() {
                    self.merge_entry(index.to_string(), value);
                }
            }
        }
        self
    }

    /// Alias of [`set_data`](Ajax::set_data).
    pub fn add_data(&mut self, data: impl Into<DataInput>, reset: bool) -> &mut Self {
        self.set_data(data, reset)
    }

    /// Merge headers with the same replace-in-place semantics as
    /// [`set_data`](Ajax::set_data).
    pub fn set_headers<K, V>(
        &mut self,
        headers: impl IntoIterator<Item = (K, V)>,
        reset: bool,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        if reset {
            self.headers.clear();
        }
        for (name, value) in headers {
            let name = name.into();
            let value = value.into();
            if let Some(slot) = self.headers.iter_mut().find(|(n, _)| *n == name) {
                slot.1 = value;
            } else {
                self.headers.push((name, value));
            }
        }
        self
    }

    /// Register callbacks; the input shape decides which chain(s) they join.
    /// `reset` clears both chains first.
    pub fn add_callback(&mut self, input: impl Into<CallbackInput>, reset: bool) -> &mut Self {
        if reset {
            self.chains.clear();
        }
        self.chains.add(input.into());
        self
    }

    /// Append a single before-send callback.
    pub fn before_send(&mut self, f: impl FnMut(&HttpRequest) -> Flow + 'static) -> &mut Self {
        self.chains.before.push(Box::new(f));
        self
    }

    /// Append a single on-complete callback.
    pub fn on_complete(
        &mut self,
        f: impl FnMut(&Payload, &HttpResponse) -> Flow + 'static,
    ) -> &mut Self {
        self.chains.after.push(Box::new(f));
        self
    }

    fn merge_entry(&mut self, key: String, value: Value) {
        if let Some(slot) = self.data.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.data.push((key, value));
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpVerb {
        self.method
    }

    pub fn data(&self) -> &[(String, Value)] {
        &self.data
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn response_type(&self) -> &str {
        &self.response_type
    }

    /// Raw response bodies from every completed execution, oldest first.
    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    /// The built requests handed to a transport, oldest first.
    pub fn requests(&self) -> &[HttpRequest] {
        &self.requests
    }
}

impl std::fmt::Debug for Ajax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ajax")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("data", &self.data)
            .field("response_type", &self.response_type)
            .field("chains", &self.chains)
            .field("responses", &self.responses.len())
            .field("requests", &self.requests.len())
            .finish()
    }
}
