//! HTTP request and response envelopes over in-memory bodies.
//!
//! This crate plugs the streams and the body parser of `micro-body` into real HTTP
//! messages. The head types (method, URI, status, headers) come from the `http` crate.
//!
//! - [`Request`]: a request whose body is decoded on demand and memoized
//! - [`Response`]: a response, optionally with a structured body rendered as JSON
//! - [`Message`]: the header and body operations shared by both
//! - [`MethodMask`]: sets of HTTP methods as a bitmask
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use http::header::CONTENT_TYPE;
//! use micro_message::{Message, Request};
//!
//! let mut request: Request = http::Request::builder()
//!     .method(Method::POST)
//!     .header(CONTENT_TYPE, "application/json")
//!     .body(r#"{"id":7}"#)
//!     .unwrap()
//!     .into();
//!
//! let id = request.parsed_body().unwrap().and_then(|body| body["id"].as_u64());
//! assert_eq!(id, Some(7));
//! assert!(request.is_content_json());
//! ```

mod error;
mod message;
mod method;
mod request;
mod response;

pub use error::MessageError;
pub use message::Message;
pub use method::MethodMask;
pub use request::Request;
pub use response::Response;
