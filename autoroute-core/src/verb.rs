//! The closed set of HTTP verbs a route can be declared for.

use serde::Serialize;
use std::fmt;

/// An HTTP verb.
///
/// The set is fixed. Variants are ordered the way routes are bound, which is
/// also the order of [`Verb::ALL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `PUT`
    Put,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `DELETE`
    Delete,
    /// `CONNECT`
    Connect,
    /// `TRACE`
    Trace,
}

impl Verb {
    /// Every verb, in binding order.
    pub const ALL: [Verb; 9] = [
        Verb::Get,
        Verb::Post,
        Verb::Patch,
        Verb::Put,
        Verb::Head,
        Verb::Options,
        Verb::Delete,
        Verb::Connect,
        Verb::Trace,
    ];

    /// The upper-case method name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Patch => "PATCH",
            Verb::Put => "PUT",
            Verb::Head => "HEAD",
            Verb::Options => "OPTIONS",
            Verb::Delete => "DELETE",
            Verb::Connect => "CONNECT",
            Verb::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
