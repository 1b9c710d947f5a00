//! An in-memory, position-tracked byte buffer.
//!
//! [`ByteStream`] behaves like a file opened for reading and writing, without any
//! backing storage. Writes are not inserts: a write truncates the buffer at the
//! cursor before appending, so everything past the cursor is discarded.
//!
//! Seeking past the end is allowed. Reads from there return nothing, and the next
//! write fills the gap between the old end and the cursor with zero bytes. That gap
//! is capped at [`ByteStream::MAX_SEEK_GAP`] bytes.

use std::io::SeekFrom;

use bytes::{Bytes, BytesMut};
use serde_json::{Value, json};
use tracing::trace;

use crate::{BodyError, ensure};
use crate::stream::{Capabilities, Stream, StreamState};

/// A readable, writable and seekable byte buffer.
///
/// Cloning a `ByteStream` copies the buffer, the cursor and the current
/// capabilities, so the copy evolves independently from the original.
#[derive(Debug, Clone, PartialEq)]
pub struct ByteStream {
    state: StreamState<Buffer>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Buffer {
    data: BytesMut,
    position: usize,
}

impl ByteStream {
    /// The largest gap, in bytes, a write after an over-seek may zero-fill.
    pub const MAX_SEEK_GAP: usize = 16 * 1024 * 1024;

    /// Creates an empty stream with every capability.
    pub fn new() -> Self {
        Self::with_capabilities(b"", Capabilities::ALL)
    }

    /// Creates a stream seeded with `data` and the given capabilities.
    ///
    /// The cursor starts at the beginning of the seeded data.
    pub fn with_capabilities(data: impl AsRef<[u8]>, capabilities: Capabilities) -> Self {
        let buffer = Buffer { data: BytesMut::from(data.as_ref()), position: 0 };
        Self { state: StreamState::open(buffer, capabilities) }
    }

    /// Returns the whole buffer regardless of the cursor, or `None` once detached.
    pub fn buffer(&self) -> Option<&[u8]> {
        self.state.inner().map(|buffer| &buffer.data[..])
    }

    /// Returns the capabilities the stream currently has.
    pub fn capabilities(&self) -> Capabilities {
        self.state.capabilities()
    }

    /// Consumes the stream and returns its buffer, or `None` once detached.
    pub fn into_bytes(self) -> Option<Bytes> {
        self.state.into_inner().map(|buffer| buffer.data.freeze())
    }
}

impl Default for ByteStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Stream for ByteStream {
    fn read(&mut self, length: usize) -> Result<Bytes, BodyError> {
        let buffer = self.state.readable_mut()?;

        let start = buffer.position.min(buffer.data.len());
        let end = buffer.position.saturating_add(length).min(buffer.data.len());
        let bytes = Bytes::copy_from_slice(&buffer.data[start..end]);

        buffer.position += bytes.len();
        Ok(bytes)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, BodyError> {
        let buffer = self.state.writable_mut()?;

        let gap = buffer.position.saturating_sub(buffer.data.len());
        ensure!(
            gap <= Self::MAX_SEEK_GAP,
            BodyError::invalid_argument(format!(
                "writing at offset {} would zero-fill {gap} bytes, more than the {} allowed",
                buffer.position,
                Self::MAX_SEEK_GAP
            ))
        );
        let end = buffer
            .position
            .checked_add(data.len())
            .ok_or_else(|| BodyError::invalid_argument("write would overflow the stream size"))?;

        if gap > 0 {
            buffer.data.resize(buffer.position, 0);
        } else {
            buffer.data.truncate(buffer.position);
        }
        buffer.data.extend_from_slice(data);
        buffer.position = end;

        Ok(data.len())
    }

    /// Any absolute offset is accepted, including one past the end of the buffer.
    /// A later write there fails with [`BodyError::InvalidArgument`] if the gap to fill
    /// exceeds [`ByteStream::MAX_SEEK_GAP`].
    fn seek(&mut self, pos: SeekFrom) -> Result<(), BodyError> {
        let buffer = self.state.seekable_mut()?;
        match pos {
            SeekFrom::Start(offset) => {
                buffer.position = usize::try_from(offset).map_err(BodyError::invalid_argument)?;
                Ok(())
            }
            other => Err(BodyError::invalid_argument(format!("only SeekFrom::Start is supported, got {other:?}"))),
        }
    }

    fn tell(&self) -> u64 {
        self.state.inner().map_or(0, |buffer| buffer.position as u64)
    }

    fn eof(&self) -> bool {
        self.state.inner().is_none_or(|buffer| buffer.position == buffer.data.len())
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
        let buffer = self.state.readable_mut()?;

        let contents = buffer.data.get(buffer.position..).map(Bytes::copy_from_slice).unwrap_or_default();
        buffer.position = buffer.data.len();

        Ok(contents)
    }

    fn size(&self) -> Option<u64> {
        self.state.inner().map(|buffer| buffer.data.len() as u64)
    }

    fn detach(&mut self) {
        if let Some(buffer) = self.state.detach() {
            trace!(size = buffer.data.len(), "byte stream detached");
        }
    }

    fn metadata(&self, key: Option<&str>) -> Option<Value> {
        let buffer = self.state.inner()?;
        let capabilities = self.state.capabilities();

        let mut metadata = json!({
            "stream_type": "memory",
            "readable": capabilities.readable,
            "writable": capabilities.writable,
            "seekable": capabilities.seekable,
            "size": buffer.data.len(),
        });

        match key {
            None => Some(metadata),
            Some(key) => metadata.get_mut(key).map(Value::take),
        }
    }
}

impl From<&str> for ByteStream {
    fn from(value: &str) -> Self {
        Self::with_capabilities(value, Capabilities::ALL)
    }
}

impl From<String> for ByteStream {
    fn from(value: String) -> Self {
        Self::with_capabilities(value, Capabilities::ALL)
    }
}

impl From<&[u8]> for ByteStream {
    fn from(value: &[u8]) -> Self {
        Self::with_capabilities(value, Capabilities::ALL)
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(value: Vec<u8>) -> Self {
        Self::with_capabilities(value, Capabilities::ALL)
    }
}

impl From<Bytes> for ByteStream {
    fn from(value: Bytes) -> Self {
        Self::with_capabilities(value, Capabilities::ALL)
    }
}
