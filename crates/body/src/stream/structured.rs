//! A body holding a decoded value tree instead of bytes.
//!
//! [`StructuredStream`] keeps a [`serde_json::Value`] and only turns it into bytes
//! when its contents are requested. Byte-level reads and writes are rejected: the
//! value is read through [`StructuredStream::structure`] and changed through
//! [`StructuredStream::replace_structure`] or [`StructuredStream::mutate`].
//!
//! Seeking is accepted but has no effect, the cursor of a value tree is meaningless.

use std::io::SeekFrom;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::trace;

use crate::BodyError;
use crate::stream::{Capabilities, Stream, StreamState};
use crate::ensure;

/// How a [`StructuredStream`] renders its value as JSON.
///
/// Both formats leave forward slashes and non-ASCII characters unescaped.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Four-space indented output.
    #[default]
    Pretty,
    /// No insignificant whitespace.
    Compact,
}

impl JsonFormat {
    /// Serializes `value` in this format.
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<Vec<u8>, BodyError> {
        match self {
            JsonFormat::Compact => Ok(serde_json::to_vec(value)?),
            JsonFormat::Pretty => {
                let mut writer = Vec::with_capacity(128);
                let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
                value.serialize(&mut serializer)?;
                Ok(writer)
            }
        }
    }
}

/// A stream over a structured value.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredStream {
    state: StreamState<Value>,
    format: JsonFormat,
}

impl StructuredStream {
    /// Creates a stream over `structure` with every capability.
    pub fn new(structure: Value) -> Self {
        Self::with_capabilities(structure, Capabilities::ALL)
    }

    pub fn with_capabilities(structure: Value, capabilities: Capabilities) -> Self {
        Self { state: StreamState::open(structure, capabilities), format: JsonFormat::default() }
    }

    /// Creates a stream from anything serializable.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, BodyError> {
        Ok(Self::new(serde_json::to_value(value)?))
    }

    /// Sets the format used when the contents are read.
    #[must_use]
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    pub fn format(&self) -> JsonFormat {
        self.format
    }

    pub fn capabilities(&self) -> Capabilities {
        self.state.capabilities()
    }

    /// Borrows the held value.
    pub fn structure(&self) -> Result<&Value, BodyError> {
        self.state.readable()
    }

    /// Replaces the held value and returns the previous one.
    pub fn replace_structure(&mut self, structure: Value) -> Result<Value, BodyError> {
        let current = self.state.writable_mut()?;
        Ok(std::mem::replace(current, structure))
    }

    /// Runs `f` against the held value and returns its result.
    pub fn mutate<R, F>(&mut self, f: F) -> Result<R, BodyError>
    where
        F: FnOnce(&mut Value) -> R,
    {
        let structure = self.state.writable_mut()?;
        Ok(f(structure))
    }

    /// Consumes the stream and returns the held value, or `None` once detached.
    pub fn into_structure(self) -> Option<Value> {
        self.state.into_inner()
    }
}

impl Default for StructuredStream {
    fn default() -> Self {
        Self::new(Value::Object(serde_json::Map::new()))
    }
}

impl From<Value> for StructuredStream {
    fn from(structure: Value) -> Self {
        Self::new(structure)
    }
}

impl Stream for StructuredStream {
    fn read(&mut self, _length: usize) -> Result<Bytes, BodyError> {
        ensure!(self.is_readable(), BodyError::NotReadable);
        Err(BodyError::StructuredAccess { operation: "read" })
    }

    fn write(&mut self, _data: &[u8]) -> Result<usize, BodyError> {
        ensure!(self.is_writable(), BodyError::NotWritable);
        Err(BodyError::StructuredAccess { operation: "write" })
    }

    fn seek(&mut self, _pos: SeekFrom) -> Result<(), BodyError> {
        self.state.seekable_mut()?;
        Ok(())
    }

    fn tell(&self) -> u64 {
        0
    }

    fn eof(&self) -> bool {
        false
    }

    fn is_readable(&self) -> bool {
        self.state.capabilities().readable
    }

    fn is_writable(&self) -> bool {
        self.state.capabilities().writable
    }

    fn is_seekable(&self) -> bool {
        self.state.capabilities().seekable
    }

    fn contents(&mut self) -> Result<Bytes, BodyError> {
        let structure = self.state.readable()?;
        self.format.encode(structure).map(Bytes::from)
    }

    /// The number of top level entries: map keys or sequence items.
    fn size(&self) -> Option<u64> {
        let count = match self.state.inner()? {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            Value::Null => 0,
            _ => 1,
        };
        Some(count as u64)
    }

    fn detach(&mut self) {
        if self.state.detach().is_some() {
            trace!("structured stream detached");
        }
    }

    fn metadata(&self, _key: Option<&str>) -> Option<Value> {
        None
    }
}
