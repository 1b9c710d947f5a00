//! The operations shared by requests and responses.
//!
//! [`Message`] gives both envelopes the same header and body accessors. The `with_*`
//! methods consume the message and return the changed one, so call sites read like
//! immutable updates while no copy is made.

use http::header::AsHeaderName;
use http::{HeaderMap, HeaderName, HeaderValue, Version};
use micro_body::content_type::{ContentKind, HasHeaders};
use micro_body::stream::Body;

use crate::MessageError;

pub trait Message: HasHeaders + Sized {
    fn version(&self) -> Version;

    fn set_version(&mut self, version: Version);

    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn body(&self) -> &Body;

    fn body_mut(&mut self) -> &mut Body;

    /// Swaps the body and returns the previous one.
    fn replace_body(&mut self, body: Body) -> Body;

    /// Returns every value of the header `name` that is valid visible ASCII.
    fn header<K: AsHeaderName>(&self, name: K) -> Vec<&str> {
        self.headers().get_all(name).iter().filter_map(|value| value.to_str().ok()).collect()
    }

    /// Returns the values of the header `name` joined by a comma.
    fn header_line<K: AsHeaderName>(&self, name: K) -> String {
        self.header(name).join(", ")
    }

    fn has_header<K: AsHeaderName>(&self, name: K) -> bool {
        self.headers().contains_key(name)
    }

    /// Resolves the content kind from the `Accept` and `Content-Type` headers.
    fn content_kind(&self) -> Option<ContentKind> {
        ContentKind::from_message(self)
    }

    #[must_use]
    fn with_version(mut self, version: Version) -> Self {
        self.set_version(version);
        self
    }

    /// Replaces every value of the header with `value`.
    fn with_header<K, V>(mut self, name: K, value: V) -> Result<Self, MessageError>
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        let (name, value) = header_pair(name, value)?;
        self.headers_mut().insert(name, value);
        Ok(self)
    }

    /// Adds `value` after the existing values of the header.
    fn with_added_header<K, V>(mut self, name: K, value: V) -> Result<Self, MessageError>
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        let (name, value) = header_pair(name, value)?;
        self.headers_mut().append(name, value);
        Ok(self)
    }

    #[must_use]
    fn without_header<K: AsHeaderName>(mut self, name: K) -> Self {
        self.headers_mut().remove(name);
        self
    }

    #[must_use]
    fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.replace_body(body.into());
        self
    }
}

fn header_pair<K, V>(name: K, value: V) -> Result<(HeaderName, HeaderValue), MessageError>
where
    HeaderName: TryFrom<K>,
    <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
    HeaderValue: TryFrom<V>,
    <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
{
    let name = <HeaderName as TryFrom<K>>::try_from(name).map_err(invalid_header)?;
    let value = <HeaderValue as TryFrom<V>>::try_from(value).map_err(invalid_header)?;
    Ok((name, value))
}

fn invalid_header<E: Into<http::Error>>(e: E) -> MessageError {
    let error: http::Error = e.into();
    MessageError::invalid_argument(error)
}
