//! Request execution: the open → send → complete lifecycle.
//!
//! # Design
//! Each execution is independent: it acquires its own transport handle,
//! serializes the configured data against that transport's capabilities,
//! runs the before-send chain (which may veto), performs the round-trip,
//! decodes the payload, and runs the on-complete chain. Before-send
//! callbacks always run strictly before the transport sees the request;
//! on-complete callbacks run strictly after it signals completion, in
//! registration order.

use crate::builder::Ajax;
use crate::callbacks::{CallbackInput, Flow};
use crate::encode;
use crate::error::AjaxError;
use crate::http::{HttpRequest, Payload, RequestBody};
use crate::transport::{self, Transport};

/// Marker header carried by every outgoing request.
const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

impl Ajax {
    /// Execute one request on the process-wide probed transport.
    ///
    /// Returns `Ok` when the lifecycle ran to completion or was vetoed by a
    /// before-send callback; a veto is control flow, not an error. Fails
    /// with [`AjaxError::Unsupported`] when no transport is available and
    /// [`AjaxError::Transport`] when the round-trip itself failed — in that
    /// case the on-complete chain does not run, since the request never
    /// completed.
    pub fn execute(&mut self) -> Result<&mut Self, AjaxError> {
        let transport = transport::acquire()?;
        self.execute_on(transport.as_ref())
    }

    /// Register callbacks, then execute.
    pub fn execute_with(
        &mut self,
        callbacks: impl Into<CallbackInput>,
    ) -> Result<&mut Self, AjaxError> {
        self.add_callback(callbacks, false);
        self.execute()
    }

    /// Execute one request on an explicitly supplied transport.
    pub fn execute_on(&mut self, transport: &dyn Transport) -> Result<&mut Self, AjaxError> {
        let use_form = if self.dont_check_form_data {
            self.use_form_data
        } else {
            self.use_form_data = transport.supports_multipart();
            self.use_form_data
        };

        let request = self.build_request(use_form);
        tracing::debug!(
            target: "ajax_core",
            method = %request.method,
            url = %request.url,
            transport = transport.name(),
            "dispatching request"
        );

        if self.chains.run_before(&request) == Flow::Stop {
            tracing::debug!(target: "ajax_core", "send vetoed by before-send callback");
            return Ok(self);
        }

        match transport.send(&request) {
            Ok(response) => {
                self.responses.push(response.body.clone());
                let payload = Payload::decode(&response.body);
                self.chains.run_after(&payload, &response);
                self.requests.push(request);
                Ok(self)
            }
            Err(err) => {
                // The request was handed to the transport, so it still
                // lands in the history even though it never completed.
                self.requests.push(request);
                Err(err)
            }
        }
    }

    /// Assemble the wire-ready request from the current configuration.
    fn build_request(&self, use_form: bool) -> HttpRequest {
        let body = if self.data.is_empty() {
            RequestBody::None
        } else if use_form {
            RequestBody::Form(encode::form_entries(&self.data))
        } else {
            RequestBody::Encoded(encode::encode_query(&self.data))
        };

        let mut headers = Vec::with_capacity(self.headers.len() + 1);
        headers.push((REQUESTED_WITH.0.to_string(), REQUESTED_WITH.1.to_string()));
        headers.extend(self.headers.iter().cloned());

        HttpRequest {
            method: self.method,
            url: self.url.clone(),
            headers,
            body,
            credentials: self.credentials.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Options;
    use crate::http::HttpResponse;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every request it is handed and replies with a canned body.
    struct MockTransport {
        sent: RefCell<Vec<HttpRequest>>,
        reply: String,
        multipart: bool,
        fail: bool,
    }

    impl MockTransport {
        fn replying(reply: &str) -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
                reply: reply.to_string(),
                multipart: false,
                fail: false,
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.borrow().len()
        }
    }

    impl Transport for MockTransport {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn supports_multipart(&self) -> bool {
            self.multipart
        }

        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AjaxError> {
            self.sent.borrow_mut().push(request.clone());
            if self.fail {
                return Err(AjaxError::Transport("connection refused".to_string()));
            }
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: self.reply.clone(),
            })
        }
    }

    fn ajax() -> Ajax {
        Ajax::new(Options {
            url: "http://example.test/api".to_string(),
            ..Options::default()
        })
    }

    #[test]
    fn before_send_veto_prevents_the_send() {
        let transport = MockTransport::replying("{}");
        let ran = Rc::new(RefCell::new(Vec::new()));
        let mut request = ajax();

        let first = ran.clone();
        request.before_send(move |_| {
            first.borrow_mut().push("first");
            Flow::Stop
        });
        let second = ran.clone();
        request.before_send(move |_| {
            second.borrow_mut().push("second");
            Flow::Continue
        });

        request.execute_on(&transport).unwrap();

        assert_eq!(*ran.borrow(), vec!["first"]);
        assert_eq!(transport.sent_count(), 0, "transport must not be touched");
        assert!(request.requests().is_empty());
        assert!(request.responses().is_empty());
    }

    #[test]
    fn on_complete_chain_stops_after_second_callback() {
        let transport = MockTransport::replying(r#"{"ok":true}"#);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut request = ajax();

        for (index, verdict) in [Flow::Continue, Flow::Stop, Flow::Continue]
            .into_iter()
            .enumerate()
        {
            let seen = seen.clone();
            request.on_complete(move |payload, _| {
                seen.borrow_mut()
                    .push((index, payload.json().cloned()));
                verdict
            });
        }

        request.execute_on(&transport).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2, "third callback must not run");
        for (_, payload) in seen.iter() {
            assert_eq!(payload.as_ref().unwrap()["ok"], true);
        }
    }

    #[test]
    fn callbacks_receive_the_response_handle() {
        let transport = MockTransport::replying(r#"{"ok":true}"#);
        let status = Rc::new(RefCell::new(0u16));
        let mut request = ajax();

        let seen = status.clone();
        request.on_complete(move |_, response| {
            *seen.borrow_mut() = response.status;
            Flow::Continue
        });
        request.execute_on(&transport).unwrap();

        assert_eq!(*status.borrow(), 200);
    }

    #[test]
    fn invalid_json_reaches_the_chain_as_invalid_payload() {
        let transport = MockTransport::replying("<html>oops</html>");
        let invalid = Rc::new(RefCell::new(false));
        let mut request = ajax();

        let seen = invalid.clone();
        request.on_complete(move |payload, _| {
            *seen.borrow_mut() = payload.is_invalid();
            Flow::Continue
        });
        request.execute_on(&transport).unwrap();

        assert!(*invalid.borrow());
        // The raw body is still recorded verbatim.
        assert_eq!(request.responses(), &["<html>oops</html>".to_string()]);
    }

    #[test]
    fn encoded_body_used_without_multipart_support() {
        let transport = MockTransport::replying("{}");
        let mut request = ajax();
        request.set_data([("a", json!("x y")), ("b", json!("1"))], false);
        request.execute_on(&transport).unwrap();

        let sent = transport.sent.borrow();
        assert_eq!(
            sent[0].body,
            RequestBody::Encoded("a=x%20y&b=1".to_string())
        );
    }

    #[test]
    fn form_body_used_when_transport_supports_multipart() {
        let mut transport = MockTransport::replying("{}");
        transport.multipart = true;
        let mut request = ajax();
        request.set_data([("a", json!("x y"))], false);
        request.execute_on(&transport).unwrap();

        let sent = transport.sent.borrow();
        assert_eq!(
            sent[0].body,
            RequestBody::Form(vec![("a".to_string(), "x y".to_string())])
        );
    }

    #[test]
    fn dont_check_form_data_pins_the_cached_capability() {
        let mut transport = MockTransport::replying("{}");
        transport.multipart = true;
        let mut request = Ajax::new(Options {
            url: "http://example.test/api".to_string(),
            dont_check_form_data: true,
            ..Options::default()
        });
        request.set_data([("a", json!(1))], false);
        request.execute_on(&transport).unwrap();

        // Capability re-detection skipped: the cached default (off) holds.
        let sent = transport.sent.borrow();
        assert!(matches!(sent[0].body, RequestBody::Encoded(_)));
    }

    #[test]
    fn marker_header_precedes_user_headers() {
        let transport = MockTransport::replying("{}");
        let mut request = ajax();
        request.set_headers([("Accept", "application/json")], false);
        request.execute_on(&transport).unwrap();

        let sent = transport.sent.borrow();
        assert_eq!(
            sent[0].headers,
            vec![
                ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn empty_data_sends_no_body() {
        let transport = MockTransport::replying("{}");
        let mut request = ajax();
        request.execute_on(&transport).unwrap();
        assert_eq!(transport.sent.borrow()[0].body, RequestBody::None);
    }

    #[test]
    fn history_grows_per_execution_and_is_never_pruned() {
        let transport = MockTransport::replying(r#"{"n":1}"#);
        let mut request = ajax();
        request.execute_on(&transport).unwrap();
        request.execute_on(&transport).unwrap();

        assert_eq!(request.responses().len(), 2);
        assert_eq!(request.requests().len(), 2);
        assert_eq!(request.responses()[0], r#"{"n":1}"#);
    }

    #[test]
    fn transport_failure_is_an_error_and_skips_completion() {
        let mut transport = MockTransport::replying("{}");
        transport.fail = true;
        let completed = Rc::new(RefCell::new(false));
        let mut request = ajax();

        let seen = completed.clone();
        request.on_complete(move |_, _| {
            *seen.borrow_mut() = true;
            Flow::Continue
        });
        let err = request.execute_on(&transport).unwrap_err();

        assert!(matches!(err, AjaxError::Transport(_)));
        assert!(!*completed.borrow());
        assert!(request.responses().is_empty());
        // The attempted request is still visible in the history.
        assert_eq!(request.requests().len(), 1);
    }

    #[test]
    fn single_closure_input_lands_on_the_completion_chain() {
        let transport = MockTransport::replying(r#"{"ok":true}"#);
        let seen = Rc::new(RefCell::new(false));
        let mut request = ajax();

        let flag = seen.clone();
        request.add_callback(
            move |payload: &Payload, _: &HttpResponse| {
                *flag.borrow_mut() = payload.json().is_some();
                Flow::Continue
            },
            false,
        );
        request.execute_on(&transport).unwrap();

        assert!(*seen.borrow());
    }

    #[test]
    fn credentials_travel_with_the_request() {
        let transport = MockTransport::replying("{}");
        let mut request = Ajax::new(Options {
            url: "http://example.test/api".to_string(),
            user: Some("user".to_string()),
            pass: Some("secret".to_string()),
            ..Options::default()
        });
        request.execute_on(&transport).unwrap();

        let sent = transport.sent.borrow();
        assert_eq!(sent[0].credentials.user, "user");
        assert_eq!(sent[0].credentials.pass, "secret");
    }
}
