//! Content negotiated decoding of a message body into a [`serde_json::Value`].
//!
//! Decoding a body walks through these steps:
//!
//! 1. the body is rewound, drained with [`Stream::contents`], and rewound again so
//!    later consumers can still read the raw bytes. Rewinding first means the whole
//!    body is decoded, not only what remains after the cursor, so a body that was
//!    partly read or built with `write` still parses in full
//! 2. an empty body decodes to `None`, which is not an error
//! 3. the [`ContentKind`] is resolved from the message headers
//! 4. the body is decoded by the strategy of that kind:
//!    - `html`: a `POST` with an `application/x-www-form-urlencoded` content type is
//!      decoded as an ordered form map; `multipart/form-data` is not implemented;
//!      anything else decodes to `None`
//!    - `json`: decoded as a generic JSON value
//!    - `native`: the value held by a [`StructuredStream`](crate::stream::StructuredStream) body
//!    - `text`, `xml`, `soap`, `yaml` and unresolved kinds are not implemented
//!
//! [`ParsedBody`] memoizes the outcome on the owning message. A failed decode is not
//! memoized. There is no invalidation: changing the body stream after it has been
//! parsed leaves the cached value stale.

use http::Method;
use http::header::CONTENT_TYPE;
use mime::Mime;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::BodyError;
use crate::content_type::{ContentKind, HasHeaders};
use crate::stream::{Body, Stream};

/// Decodes the body of one message.
#[derive(Debug)]
pub struct BodyParser<'a, M: HasHeaders + ?Sized> {
    method: &'a Method,
    message: &'a M,
}

impl<'a, M: HasHeaders + ?Sized> BodyParser<'a, M> {
    pub fn new(method: &'a Method, message: &'a M) -> Self {
        Self { method, message }
    }

    /// Decodes `body`, returning `None` when there is nothing to decode.
    pub fn parse(&self, body: &mut Body) -> Result<Option<Value>, BodyError> {
        body.rewind()?;
        let contents = body.contents()?;
        body.rewind()?;

        if contents.is_empty() {
            debug!("body is empty, nothing to parse");
            return Ok(None);
        }

        let kind = ContentKind::from_message(self.message);
        debug!(kind = ?kind, size = contents.len(), "parsing body");

        match kind {
            Some(ContentKind::Html) => self.decode_form(&contents),
            Some(ContentKind::Json) => decode_json(&contents).map(Some),
            Some(ContentKind::Native) => decode_native(body).map(Some),
            Some(kind @ (ContentKind::Text | ContentKind::Xml | ContentKind::Soap | ContentKind::Yaml)) => {
                Err(BodyError::not_implemented(format!("parsing a {kind} body")))
            }
            None => Err(BodyError::not_implemented("parsing a body of unknown content type")),
        }
    }

    /// Only `POST` form submissions carry decodable html-kind bodies.
    fn decode_form(&self, contents: &[u8]) -> Result<Option<Value>, BodyError> {
        if *self.method != Method::POST {
            return Ok(None);
        }

        let Some(media_type) = self.content_type() else {
            return Ok(None);
        };

        if media_type.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
            decode_urlencoded(contents).map(Some)
        } else if media_type.type_() == mime::MULTIPART && media_type.subtype() == mime::FORM_DATA {
            Err(BodyError::not_implemented("parsing a multipart/form-data body"))
        } else {
            Ok(None)
        }
    }

    /// The media type of the last `Content-Type` header, parameters stripped by `mime`.
    fn content_type(&self) -> Option<Mime> {
        let value = self.message.headers().get_all(CONTENT_TYPE).iter().last()?;
        value.to_str().ok()?.parse().ok()
    }
}

fn decode_json(contents: &[u8]) -> Result<Value, BodyError> {
    Ok(serde_json::from_slice(contents)?)
}

/// Repeated keys keep their first position and take the last value.
fn decode_urlencoded(contents: &[u8]) -> Result<Value, BodyError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(contents)?;

    let mut form = Map::with_capacity(pairs.len());
    for (key, value) in pairs {
        form.insert(key, Value::String(value));
    }
    Ok(Value::Object(form))
}

fn decode_native(body: &Body) -> Result<Value, BodyError> {
    match body.as_structured() {
        Some(stream) => Ok(stream.structure()?.clone()),
        None => Err(BodyError::decode(format!(
            "a native body was declared but the body is a {} instead of a StructuredStream",
            body.kind_name()
        ))),
    }
}

/// The memoized outcome of decoding a message body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ParsedBody {
    /// The body has not been decoded yet.
    #[default]
    Unparsed,
    /// The body has been decoded; `None` means there was nothing to decode.
    Parsed(Option<Value>),
}

impl ParsedBody {
    /// Returns the cached value: `None` when unparsed, `Some(None)` for an empty result.
    pub fn get(&self) -> Option<Option<&Value>> {
        match self {
            ParsedBody::Unparsed => None,
            ParsedBody::Parsed(value) => Some(value.as_ref()),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParsedBody::Parsed(_))
    }

    /// Caches `value` as if it had been decoded from the body.
    pub fn set(&mut self, value: Option<Value>) {
        *self = ParsedBody::Parsed(value);
    }

    pub fn reset(&mut self) {
        *self = ParsedBody::Unparsed;
    }

    /// Returns the cached value, decoding `body` with `parser` on first use.
    pub fn get_or_parse<M>(&mut self, parser: &BodyParser<'_, M>, body: &mut Body) -> Result<Option<&Value>, BodyError>
    where
        M: HasHeaders + ?Sized,
    {
        if self.is_parsed() {
            trace!("answering parsed body from cache");
        } else {
            *self = ParsedBody::Parsed(parser.parse(body)?);
        }
        Ok(self.get().flatten())
    }
}

#[cfg(test)]
mod tests {
    use http::header::ACCEPT;
    use http::{HeaderMap, HeaderValue};
    use indoc::indoc;
    use serde_json::json;

    use super::*;
    use crate::stream::{ByteStream, Capabilities, StructuredStream};

    fn content_type(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    fn parse(method: &Method, headers: &HeaderMap, body: impl Into<Body>) -> Result<Option<Value>, BodyError> {
        let mut body = body.into();
        BodyParser::new(method, headers).parse(&mut body)
    }

    #[test]
    fn test_empty_body() {
        let headers = content_type("application/json");
        assert_eq!(parse(&Method::POST, &headers, "").unwrap(), None);

        // an empty body is fine even when the kind could not be decoded
        let headers = content_type("text/yaml");
        assert_eq!(parse(&Method::POST, &headers, "").unwrap(), None);
    }

    #[test]
    fn test_json() {
        let headers = content_type("application/json; charset=utf-8");
        let value = parse(&Method::POST, &headers, r#"{"a":1,"b":[2,3]}"#).unwrap();
        assert_eq!(value, Some(json!({"a": 1, "b": [2, 3]})));

        let body = indoc! {r#"
            [
                {"name": "a/b", "tags": ["ü"]},
                null
            ]
        "#};
        let value = parse(&Method::PUT, &headers, body).unwrap();
        assert_eq!(value, Some(json!([{"name": "a/b", "tags": ["ü"]}, null])));
    }

    #[test]
    fn test_malformed_json() {
        let headers = content_type("application/json");
        let error = parse(&Method::POST, &headers, r#"{"a":"#).unwrap_err();
        assert!(matches!(error, BodyError::Json { .. }));
        assert!(error.is_decode_failure());
    }

    #[test]
    fn test_accept_is_resolved_before_content_type() {
        let mut headers = content_type("application/x-www-form-urlencoded");
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let error = parse(&Method::POST, &headers, "a=1").unwrap_err();
        assert!(error.is_decode_failure());
    }

    #[test]
    fn test_form() {
        let mut headers = content_type("application/x-www-form-urlencoded; charset=UTF-8");
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));

        let value = parse(&Method::POST, &headers, "name=micro+http&zip=10%2F20&empty=").unwrap().unwrap();
        assert_eq!(value, json!({"name": "micro http", "zip": "10/20", "empty": ""}));
    }

    #[test]
    fn test_form_repeated_keys_take_last_value() {
        let mut headers = content_type("application/x-www-form-urlencoded");
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));

        let value = parse(&Method::POST, &headers, "b=1&a=2&b=3").unwrap().unwrap();
        assert_eq!(value, json!({"b": "3", "a": "2"}));

        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn test_form_needs_post() {
        let mut headers = content_type("application/x-www-form-urlencoded");
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));

        assert_eq!(parse(&Method::PUT, &headers, "a=1").unwrap(), None);
        assert_eq!(parse(&Method::GET, &headers, "a=1").unwrap(), None);
    }

    #[test]
    fn test_html_without_form_content_type() {
        let headers = content_type("text/html");
        assert_eq!(parse(&Method::POST, &headers, "<p>hello</p>").unwrap(), None);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
        assert_eq!(parse(&Method::POST, &headers, "a=1").unwrap(), None);
    }

    #[test]
    fn test_multipart_is_not_implemented() {
        let mut headers = content_type("multipart/form-data; boundary=----x");
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));

        let error = parse(&Method::POST, &headers, "------x\r\n").unwrap_err();
        assert!(matches!(error, BodyError::NotImplemented { .. }));
    }

    #[test]
    fn test_unsupported_kinds_are_not_implemented() {
        for mime in ["text/yaml", "application/x-yaml", "text/xml", "application/soap+xml", "text/plain"] {
            let headers = content_type(mime);
            let error = parse(&Method::POST, &headers, "payload").unwrap_err();
            assert!(matches!(error, BodyError::NotImplemented { .. }), "{mime}: {error}");
        }

        let error = parse(&Method::POST, &content_type("application/octet-stream"), "payload").unwrap_err();
        assert_eq!(error.to_string(), "parsing a body of unknown content type is not implemented");
    }

    #[test]
    fn test_native() {
        let headers = content_type("application/php");
        let body = StructuredStream::new(json!({"id": 1, "roles": ["admin"]}));

        let value = parse(&Method::POST, &headers, body).unwrap();
        assert_eq!(value, Some(json!({"id": 1, "roles": ["admin"]})));
    }

    #[test]
    fn test_native_requires_structured_body() {
        let headers = content_type("application/php");
        let error = parse(&Method::POST, &headers, r#"{"id":1}"#).unwrap_err();

        assert!(matches!(error, BodyError::Decode { .. }));
        assert!(error.to_string().contains("ByteStream"));
    }

    #[test]
    fn test_body_is_rewound() {
        let headers = content_type("application/json");
        let mut stream = ByteStream::new();
        stream.write(br#"{"a":1}"#).unwrap();
        let mut body = Body::from(stream);

        let value = BodyParser::new(&Method::POST, &headers).parse(&mut body).unwrap();
        assert_eq!(value, Some(json!({"a": 1})));
        assert_eq!(body.tell(), 0);
        assert_eq!(body.to_full_string(), r#"{"a":1}"#);
    }

    #[test]
    fn test_partly_read_body_parses_in_full() {
        let headers = content_type("application/json");
        let mut body = Body::from(r#"{"a":[1,2]}"#);
        assert_eq!(&body.read(5).unwrap()[..], br#"{"a":"#);

        let value = BodyParser::new(&Method::POST, &headers).parse(&mut body).unwrap();
        assert_eq!(value, Some(json!({"a": [1, 2]})));
        assert_eq!(body.tell(), 0);
    }

    #[test]
    fn test_unseekable_body() {
        let headers = content_type("application/json");
        let capabilities = Capabilities { readable: true, writable: false, seekable: false };
        let body = ByteStream::with_capabilities("{}", capabilities);

        assert!(matches!(parse(&Method::POST, &headers, body), Err(BodyError::NotSeekable)));
    }

    #[test]
    fn test_cache_answers_without_reading() {
        let headers = content_type("application/json");
        let method = Method::POST;
        let parser = BodyParser::new(&method, &headers);
        let mut body = Body::from(r#"{"a":1}"#);
        let mut parsed = ParsedBody::default();

        assert!(!parsed.is_parsed());
        assert_eq!(parsed.get(), None);
        assert_eq!(parsed.get_or_parse(&parser, &mut body).unwrap(), Some(&json!({"a": 1})));

        // the stream changes after the first parse, the cached value does not
        body.write(b"not json").unwrap();
        assert_eq!(parsed.get_or_parse(&parser, &mut body).unwrap(), Some(&json!({"a": 1})));
        assert_eq!(body.tell(), 8);

        parsed.reset();
        assert!(parsed.get_or_parse(&parser, &mut body).is_err());
    }

    #[test]
    fn test_cache_keeps_empty_result() {
        let headers = content_type("application/json");
        let method = Method::POST;
        let parser = BodyParser::new(&method, &headers);
        let mut body = Body::empty();
        let mut parsed = ParsedBody::default();

        assert_eq!(parsed.get_or_parse(&parser, &mut body).unwrap(), None);
        assert_eq!(parsed, ParsedBody::Parsed(None));

        body.write(b"[1]").unwrap();
        assert_eq!(parsed.get_or_parse(&parser, &mut body).unwrap(), None);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let headers = content_type("application/json");
        let method = Method::POST;
        let parser = BodyParser::new(&method, &headers);
        let mut body = Body::from("[1,");
        let mut parsed = ParsedBody::default();

        assert!(parsed.get_or_parse(&parser, &mut body).is_err());
        assert_eq!(parsed, ParsedBody::Unparsed);

        body.seek(std::io::SeekFrom::Start(3)).unwrap();
        body.write(b"2]").unwrap();
        assert_eq!(parsed.get_or_parse(&parser, &mut body).unwrap(), Some(&json!([1, 2])));
    }

    #[test]
    fn test_set_overrides_cache() {
        let mut parsed = ParsedBody::default();
        parsed.set(Some(json!({"injected": true})));

        assert!(parsed.is_parsed());
        assert_eq!(parsed.get(), Some(Some(&json!({"injected": true}))));
    }
}
