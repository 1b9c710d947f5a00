//! The request envelope.
//!
//! A [`Request`] owns its head (method, URI, version, headers), its [`Body`] and the
//! memoized result of decoding that body. Decoding happens on the first call to
//! [`Request::parsed_body`] and is answered from the cache afterwards.

use http::{HeaderMap, Method, Uri, Version};
use micro_body::BodyError;
use micro_body::content_type::{ContentKind, HasHeaders};
use micro_body::parser::{BodyParser, ParsedBody};
use micro_body::stream::Body;
use serde_json::Value;
use tracing::trace;

use crate::{Message, MessageError, MethodMask};

/// An HTTP request with an in-memory body.
///
/// Cloning a request deep-copies its body: changing the body of the clone never
/// affects the original, and the other way around.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    request_target: Option<String>,
    body: Body,
    parsed_body: ParsedBody,
}

impl Request {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            request_target: None,
            body: Body::empty(),
            parsed_body: ParsedBody::default(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The bit of the request method, `None` for extension methods.
    pub fn method_mask(&self) -> Option<MethodMask> {
        MethodMask::of(&self.method)
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The request target as it appears in the request line.
    ///
    /// This is the explicitly set target if there is one, otherwise the path and query
    /// of the URI, otherwise `/`.
    pub fn request_target(&self) -> &str {
        if let Some(target) = &self.request_target {
            return target;
        }
        match self.uri.path_and_query() {
            Some(path_and_query) if !path_and_query.as_str().is_empty() => path_and_query.as_str(),
            _ => "/",
        }
    }

    pub fn into_body(self) -> Body {
        self.body
    }

    /// Decodes the body on first use and returns the cached value afterwards.
    ///
    /// `Ok(None)` means the body was empty or carried nothing to decode for its
    /// content kind.
    pub fn parsed_body(&mut self) -> Result<Option<&Value>, BodyError> {
        let parser = BodyParser::new(&self.method, &self.headers);
        self.parsed_body.get_or_parse(&parser, &mut self.body)
    }

    /// Returns true once the body has been decoded or a decoded value was injected.
    pub fn is_body_parsed(&self) -> bool {
        self.parsed_body.is_parsed()
    }

    pub fn is_content_json(&self) -> bool {
        self.content_kind() == Some(ContentKind::Json)
    }

    pub fn is_content_html(&self) -> bool {
        self.content_kind() == Some(ContentKind::Html)
    }

    pub fn is_content_xml(&self) -> bool {
        self.content_kind() == Some(ContentKind::Xml)
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    /// Sets an explicit request target, which must not contain whitespace.
    pub fn with_request_target(mut self, target: impl Into<String>) -> Result<Self, MessageError> {
        let target = target.into();
        if target.chars().any(char::is_whitespace) {
            return Err(MessageError::invalid_argument(format!(
                "request target must not contain whitespace: {target:?}"
            )));
        }
        self.request_target = Some(target);
        Ok(self)
    }

    /// Injects an already decoded body, which [`Request::parsed_body`] then returns.
    #[must_use]
    pub fn with_parsed_body(mut self, value: Option<Value>) -> Self {
        self.parsed_body.set(value);
        self
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new(Method::GET, Uri::from_static("/"))
    }
}

impl HasHeaders for Request {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl Message for Request {
    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// A new body invalidates the decoded one.
    fn replace_body(&mut self, body: Body) -> Body {
        if self.parsed_body.is_parsed() {
            trace!("request body replaced, dropping the parsed body");
        }
        self.parsed_body.reset();
        std::mem::replace(&mut self.body, body)
    }
}

/// Converts an `http::Request` whose body converts into a [`Body`].
impl<B: Into<Body>> From<http::Request<B>> for Request {
    fn from(request: http::Request<B>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            request_target: None,
            body: body.into(),
            parsed_body: ParsedBody::default(),
        }
    }
}
