//! The body a message owns.
//!
//! [`Body`] joins both stream kinds behind one [`Stream`] implementation that forwards
//! every call to the stream it holds.

use std::io::SeekFrom;

use bytes::Bytes;
use serde_json::Value;

use crate::BodyError;
use crate::stream::{ByteStream, Stream, StructuredStream};

/// The body owned by a message: raw bytes or a structured value.
///
/// Cloning a `Body` deep-copies the underlying stream, so a duplicated message
/// never shares its body with the original.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Bytes(ByteStream),
    Structured(StructuredStream),
}

impl Body {
    /// An empty byte body.
    pub fn empty() -> Self {
        Self::Bytes(ByteStream::new())
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Body::Structured(_))
    }

    pub fn as_bytes_stream(&self) -> Option<&ByteStream> {
        match self {
            Body::Bytes(stream) => Some(stream),
            Body::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&StructuredStream> {
        match self {
            Body::Bytes(_) => None,
            Body::Structured(stream) => Some(stream),
        }
    }

    pub fn as_structured_mut(&mut self) -> Option<&mut StructuredStream> {
        match self {
            Body::Bytes(_) => None,
            Body::Structured(stream) => Some(stream),
        }
    }

    /// The name of the stream kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Body::Bytes(_) => "ByteStream",
            Body::Structured(_) => "StructuredStream",
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

macro_rules! delegate {
    ($self:ident, $stream:ident => $call:expr) => {
        match $self {
            Body::Bytes($stream) => $call,
            Body::Structured($stream) => $call,
        }
    };
}

impl Stream for Body {
    fn read(&mut self, length: usize) -> Result<Bytes, BodyError> {
        delegate!(self, stream => stream.read(length))
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, BodyError> {
        delegate!(self, stream => stream.write(data))
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<(), BodyError> {
        delegate!(self, stream => stream.seek(pos))
    }

    fn rewind(&mut self) -> Result<(), BodyError> {
        delegate!(self, stream => stream.rewind())
    }

    fn tell(&self) -> u64 {
        delegate!(self, stream => stream.tell())
    }

    fn eof(&self) -> bool {
        delegate!(self, stream => stream.eof())
    }

    fn is_readable(&self) -> bool {
        delegate!(self, stream => stream.is_readable())
    }

    fn is_writable(&self) -> bool {
        delegate!(self, stream => stream.is_writable())
    }

    fn is_seekable(&self) -> bool {
        delegate!(self, stream => stream.is_seekable())
    }

    fn contents(&mut self) -> Result<Bytes, BodyError> {
        delegate!(self, stream => stream.contents())
    }

    fn size(&self) -> Option<u64> {
        delegate!(self, stream => stream.size())
    }

    fn detach(&mut self) {
        delegate!(self, stream => stream.detach())
    }

    fn close(&mut self) {
        delegate!(self, stream => stream.close())
    }

    fn metadata(&self, key: Option<&str>) -> Option<Value> {
        delegate!(self, stream => stream.metadata(key))
    }
}

impl From<ByteStream> for Body {
    fn from(stream: ByteStream) -> Self {
        Body::Bytes(stream)
    }
}

impl From<StructuredStream> for Body {
    fn from(stream: StructuredStream) -> Self {
        Body::Structured(stream)
    }
}

impl From<Value> for Body {
    fn from(structure: Value) -> Self {
        Body::Structured(StructuredStream::new(structure))
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::Bytes(value.into())
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Bytes(value.into())
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::Bytes(value.into())
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Body::Bytes(value.into())
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_delegates_to_byte_stream() {
        let mut body = Body::from("abc");

        assert!(!body.is_structured());
        assert_eq!(body.kind_name(), "ByteStream");
        assert_eq!(body.size(), Some(3));
        assert_eq!(&body.read(2).unwrap()[..], b"ab");
        assert_eq!(body.tell(), 2);

        body.write(b"z").unwrap();
        assert_eq!(body.to_full_string(), "abz");
        assert_eq!(body.as_bytes_stream().and_then(ByteStream::buffer), Some(&b"abz"[..]));
    }

    #[test]
    fn test_delegates_to_structured_stream() {
        let mut body = Body::from(json!({"a": [1]}));

        assert!(body.is_structured());
        assert_eq!(body.kind_name(), "StructuredStream");
        assert_eq!(body.size(), Some(1));
        assert!(matches!(body.write(b"x"), Err(BodyError::StructuredAccess { .. })));
        assert_eq!(body.metadata(None), None);

        body.as_structured_mut().unwrap().mutate(|value| value["b"] = json!(2)).unwrap();
        assert_eq!(body.as_structured().unwrap().structure().unwrap(), &json!({"a": [1], "b": 2}));
    }

    #[test]
    fn test_default_is_empty_bytes() {
        let mut body = Body::default();
        assert_eq!(body.size(), Some(0));
        assert!(body.eof());
        assert!(body.contents().unwrap().is_empty());
        assert_eq!(Body::from(()), Body::empty());
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = Body::from("abc");
        let mut copy = original.clone();

        copy.rewind().unwrap();
        copy.write(b"x").unwrap();
        original.detach();

        assert_eq!(copy.to_full_string(), "x");
        assert!(!original.is_readable());
    }
}
