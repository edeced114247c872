//! Request and response carriers handed to every handler.
//!
//! These are deliberately thin: the transport layer lives in the routing
//! engine, which fills a [`Request`] and reads back a [`Response`].

use crate::verb::Verb;
use std::collections::BTreeMap;

/// An incoming request as seen by a handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    verb: Verb,
    path: String,
    accept: Option<String>,
    headers: BTreeMap<String, String>,
    params: BTreeMap<String, String>,
    body: String,
}

impl Request {
    /// Create a request for `verb` on `path` with no headers and an empty body.
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            accept: None,
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
            body: String::new(),
        }
    }

    /// Set the `Accept` type of the request.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Add a header. Header names are matched case-insensitively.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Add a path or query parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Replace the request body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// The request verb.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The `Accept` type, if the client sent one.
    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    /// Look up a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Look up a parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The request body.
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// The outgoing response a handler may mutate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: BTreeMap<String, String>,
    body: Option<String>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// A `200` response with no headers and no body.
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// The status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Replace the status code.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Look up a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Set a header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// The body, if one has been written.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Replace the body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }
}
