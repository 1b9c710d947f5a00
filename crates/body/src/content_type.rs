//! Resolution of a MIME string, or of a message's headers, to a [`ContentKind`].
//!
//! The mapping is a fixed table, in declaration order:
//!
//! | kind     | MIME types                          |
//! |----------|-------------------------------------|
//! | `text`   | `text/plain`                        |
//! | `html`   | `text/html`                         |
//! | `json`   | `application/json`                  |
//! | `xml`    | `text/xml`                          |
//! | `soap`   | `application/soap+xml`              |
//! | `yaml`   | `text/yaml`, `application/x-yaml`   |
//! | `native` | `application/php` (internal only)   |
//!
//! Matching is a case-insensitive substring search, so parameters such as
//! `; charset=utf-8` and lists such as `text/html,application/xhtml+xml` still match.
//! The first kind in table order that matches wins.

use std::fmt;
use std::str::FromStr;

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName};

use crate::BodyError;

/// The logical kind of content a message carries or asks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Html,
    Json,
    Xml,
    Soap,
    Yaml,
    /// An in-process structured value, never sent on the wire.
    Native,
}

impl ContentKind {
    /// Every kind, in table order.
    pub const ALL: [ContentKind; 7] = [
        ContentKind::Text,
        ContentKind::Html,
        ContentKind::Json,
        ContentKind::Xml,
        ContentKind::Soap,
        ContentKind::Yaml,
        ContentKind::Native,
    ];

    /// The MIME types associated with this kind.
    pub fn mime_types(self) -> &'static [&'static str] {
        match self {
            ContentKind::Text => &["text/plain"],
            ContentKind::Html => &["text/html"],
            ContentKind::Json => &["application/json"],
            ContentKind::Xml => &["text/xml"],
            ContentKind::Soap => &["application/soap+xml"],
            ContentKind::Yaml => &["text/yaml", "application/x-yaml"],
            ContentKind::Native => &["application/php"],
        }
    }

    /// The canonical MIME type, suitable for a `Content-Type` header.
    pub fn mime_type(self) -> &'static str {
        self.mime_types()[0]
    }

    pub fn name(self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Html => "html",
            ContentKind::Json => "json",
            ContentKind::Xml => "xml",
            ContentKind::Soap => "soap",
            ContentKind::Yaml => "yaml",
            ContentKind::Native => "native",
        }
    }

    /// Resolves a MIME string, e.g. a header value, to a kind.
    pub fn from_mime(mime: &str) -> Option<ContentKind> {
        let mime = mime.to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.mime_types().iter().any(|candidate| mime.contains(candidate)))
    }

    /// Resolves the kind of a message.
    ///
    /// `Accept` values are tried first, in header order; if none of them resolves,
    /// `Content-Type` values are tried the same way.
    pub fn from_message<M: HasHeaders + ?Sized>(message: &M) -> Option<ContentKind> {
        let headers = message.headers();
        Self::from_header(headers, &ACCEPT).or_else(|| Self::from_header(headers, &CONTENT_TYPE))
    }

    fn from_header(headers: &HeaderMap, name: &HeaderName) -> Option<ContentKind> {
        headers.get_all(name).iter().filter_map(|value| value.to_str().ok()).find_map(Self::from_mime)
    }

    /// Returns true if `name` names a kind, ignoring case.
    pub fn is_valid_kind(name: &str) -> bool {
        name.parse::<ContentKind>().is_ok()
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentKind {
    type Err = BodyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| BodyError::invalid_argument(format!("unsupported content kind: {s}")))
    }
}

/// Anything that exposes HTTP headers.
///
/// This is the only thing content kind resolution needs from a message.
#[cfg_attr(test, mockall::automock)]
pub trait HasHeaders {
    fn headers(&self) -> &HeaderMap;
}

impl HasHeaders for HeaderMap {
    fn headers(&self) -> &HeaderMap {
        self
    }
}

impl<T> HasHeaders for http::Request<T> {
    fn headers(&self) -> &HeaderMap {
        http::Request::headers(self)
    }
}

impl<T> HasHeaders for http::Response<T> {
    fn headers(&self) -> &HeaderMap {
        http::Response::headers(self)
    }
}
