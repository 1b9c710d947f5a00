//! The response envelope.

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode, Version};
use micro_body::content_type::{ContentKind, HasHeaders};
use micro_body::stream::{Body, JsonFormat, Stream, StructuredStream};
use serde_json::Value;

use crate::{Message, MessageError};

/// An HTTP response with an in-memory body.
///
/// Like [`Request`](crate::Request), cloning a response deep-copies its body.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Body,
    reason: Option<String>,
}

impl Response {
    /// Creates a response with the given status, no headers and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self { status, version: Version::HTTP_11, headers: HeaderMap::new(), body: Body::empty(), reason: None }
    }

    /// Creates a `200 OK` response whose body holds `value` and renders it as JSON.
    pub fn structured(value: Value, format: JsonFormat) -> Self {
        let mut response = Self::new(StatusCode::OK);
        response.headers.insert(CONTENT_TYPE, HeaderValue::from_static(ContentKind::Json.mime_type()));
        response.body = StructuredStream::new(value).with_format(format).into();
        response
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The custom reason phrase if one was set, otherwise the canonical one of the
    /// status, empty if it has none.
    pub fn reason_phrase(&self) -> &str {
        match &self.reason {
            Some(reason) => reason.as_str(),
            None => self.status.canonical_reason().unwrap_or(""),
        }
    }

    /// Changes the status and drops any custom reason phrase; the code must be a
    /// registered status with a reason phrase.
    pub fn with_status(mut self, code: u16) -> Result<Self, MessageError> {
        self.status = registered_status(code)?;
        self.reason = None;
        Ok(self)
    }

    /// Changes the status with a custom reason phrase. An empty `reason` falls back
    /// to the canonical phrase.
    pub fn with_status_reason(mut self, code: u16, reason: impl Into<String>) -> Result<Self, MessageError> {
        let reason = reason.into();
        if reason.chars().any(char::is_control) {
            return Err(MessageError::invalid_argument(format!(
                "reason phrase must not contain control characters: {reason:?}"
            )));
        }
        self.status = registered_status(code)?;
        self.reason = Some(reason).filter(|reason| !reason.is_empty());
        Ok(self)
    }

    /// Reads the whole body as a string; never fails, see [`Stream::to_full_string`].
    pub fn to_full_string(&mut self) -> String {
        self.body.to_full_string()
    }

    pub fn into_body(self) -> Body {
        self.body
    }

    pub fn is_content_json(&self) -> bool {
        self.content_kind() == Some(ContentKind::Json)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

impl HasHeaders for Response {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl Message for Response {
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

    fn replace_body(&mut self, body: Body) -> Body {
        std::mem::replace(&mut self.body, body)
    }
}

/// Converts an `http::Response` whose body converts into a [`Body`].
impl<B: Into<Body>> From<http::Response<B>> for Response {
    fn from(response: http::Response<B>) -> Self {
        let (parts, body) = response.into_parts();
        Self { status: parts.status, version: parts.version, headers: parts.headers, body: body.into(), reason: None }
    }
}

fn registered_status(code: u16) -> Result<StatusCode, MessageError> {
    StatusCode::from_u16(code)
        .ok()
        .filter(|status| status.canonical_reason().is_some())
        .ok_or_else(|| MessageError::invalid_argument(format!("invalid http status code {code}")))
}
