//! In-memory HTTP message bodies and content negotiated body parsing.
//!
//! This crate models the body of an HTTP message as a seekable in-memory stream and
//! decodes raw body bytes into structured data based on the content kind a message
//! negotiates through its `Accept` and `Content-Type` headers.
//!
//! # Architecture
//!
//! - [`stream`]: the [`Stream`](stream::Stream) capability surface and its two
//!   implementations, [`ByteStream`](stream::ByteStream) and
//!   [`StructuredStream`](stream::StructuredStream), joined in [`Body`](stream::Body)
//! - [`content_type`]: the fixed table of [`ContentKind`](content_type::ContentKind)s
//!   and MIME resolution
//! - [`parser`]: the [`BodyParser`](parser::BodyParser) and its memo cache
//!   [`ParsedBody`](parser::ParsedBody)
//!
//! Every operation is synchronous and in-memory; there is no I/O anywhere in this crate.
//!
//! # Example
//!
//! ```
//! use http::header::CONTENT_TYPE;
//! use http::{HeaderMap, HeaderValue, Method};
//! use micro_body::parser::BodyParser;
//! use micro_body::stream::{Body, Stream};
//!
//! let mut headers = HeaderMap::new();
//! headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
//!
//! let mut body = Body::from(r#"{"name":"micro"}"#);
//! let value = BodyParser::new(&Method::POST, &headers).parse(&mut body).unwrap();
//!
//! assert_eq!(value, Some(serde_json::json!({"name": "micro"})));
//! assert_eq!(body.to_full_string(), r#"{"name":"micro"}"#);
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`BodyError`]. The only operation that swallows
//! errors is [`Stream::to_full_string`](stream::Stream::to_full_string), which
//! yields an empty string instead.

pub mod content_type;
pub mod parser;
pub mod stream;

mod error;
pub use error::BodyError;

mod utils;
pub(crate) use utils::ensure;
