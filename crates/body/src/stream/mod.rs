//! Stream shaped message bodies.
//!
//! A message body is exposed through the [`Stream`] capability surface: a file-like
//! read/write/seek interface without any OS resource behind it. Two implementations
//! exist:
//!
//! - [`ByteStream`]: a position-tracked byte buffer
//! - [`StructuredStream`]: a decoded value tree that serializes to JSON when read
//!
//! [`Body`] is the closed sum of both and is what a message owns.
//!
//! Both stream kinds are either open with a set of [`Capabilities`] or detached.
//! Detaching is terminal: every operation afterwards fails with a capability error.

use std::io::SeekFrom;

use bytes::Bytes;
use serde_json::Value;
use tracing::warn;

use crate::BodyError;

mod body;
mod byte_stream;
mod structured;

pub use body::Body;
pub use byte_stream::ByteStream;
pub use structured::{JsonFormat, StructuredStream};

/// The capability surface shared by every body stream.
pub trait Stream {
    /// Reads up to `length` bytes from the current position.
    ///
    /// Fewer bytes are returned near the end of the stream; an empty result means
    /// nothing is left to read.
    fn read(&mut self, length: usize) -> Result<Bytes, BodyError>;

    /// Writes `data` at the current position and returns the number of bytes written.
    fn write(&mut self, data: &[u8]) -> Result<usize, BodyError>;

    /// Moves the cursor. Only [`SeekFrom::Start`] is supported.
    fn seek(&mut self, pos: SeekFrom) -> Result<(), BodyError>;

    /// Moves the cursor back to the beginning of the stream.
    fn rewind(&mut self) -> Result<(), BodyError> {
        self.seek(SeekFrom::Start(0))
    }

    /// Returns the current cursor position.
    fn tell(&self) -> u64;

    /// Returns true if the cursor is at the end of the stream.
    fn eof(&self) -> bool;

    fn is_readable(&self) -> bool;

    fn is_writable(&self) -> bool;

    fn is_seekable(&self) -> bool;

    /// Returns the remaining contents, from the cursor to the end.
    fn contents(&mut self) -> Result<Bytes, BodyError>;

    /// Returns the size of the stream if known.
    fn size(&self) -> Option<u64>;

    /// Separates the underlying storage from the stream, leaving it unusable.
    ///
    /// All three capabilities are cleared, seekable included, so that every operation
    /// on a detached stream fails. Calling `detach` more than once has no further effect.
    fn detach(&mut self);

    /// Closes the stream. In-memory streams hold no external resource, so this does nothing.
    fn close(&mut self) {}

    /// Returns stream metadata: the whole map when `key` is `None`, otherwise the
    /// value stored under `key`, if any.
    fn metadata(&self, key: Option<&str>) -> Option<Value>;

    /// Reads the whole stream, from the beginning, into a string.
    ///
    /// This is the string-cast path and never fails: an unreadable stream, or any
    /// error while reading, yields an empty string.
    fn to_full_string(&mut self) -> String {
        if !self.is_readable() {
            warn!("can not convert the stream to a string because it is not readable");
            return String::new();
        }

        match self.rewind().and_then(|()| self.contents()) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(cause = %e, "failed to convert the stream to a string");
                String::new()
            }
        }
    }
}

/// The independent capability flags of an open stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub readable: bool,
    pub writable: bool,
    pub seekable: bool,
}

impl Capabilities {
    /// Readable, writable and seekable; the capabilities of a freshly created stream.
    pub const ALL: Capabilities = Capabilities { readable: true, writable: true, seekable: true };

    /// Readable and seekable, rejecting writes.
    pub const READ_ONLY: Capabilities = Capabilities { readable: true, writable: false, seekable: true };

    /// What a detached stream reports.
    pub const NONE: Capabilities = Capabilities { readable: false, writable: false, seekable: false };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::ALL
    }
}

/// Lifecycle of a stream: open with its storage and capabilities, or detached.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StreamState<T> {
    Open { inner: T, capabilities: Capabilities },
    Detached,
}

impl<T> StreamState<T> {
    pub(crate) fn open(inner: T, capabilities: Capabilities) -> Self {
        Self::Open { inner, capabilities }
    }

    pub(crate) fn capabilities(&self) -> Capabilities {
        match self {
            StreamState::Open { capabilities, .. } => *capabilities,
            StreamState::Detached => Capabilities::NONE,
        }
    }

    pub(crate) fn inner(&self) -> Option<&T> {
        match self {
            StreamState::Open { inner, .. } => Some(inner),
            StreamState::Detached => None,
        }
    }

    pub(crate) fn readable(&self) -> Result<&T, BodyError> {
        match self {
            StreamState::Open { inner, capabilities } if capabilities.readable => Ok(inner),
            _ => Err(BodyError::NotReadable),
        }
    }

    pub(crate) fn readable_mut(&mut self) -> Result<&mut T, BodyError> {
        match self {
            StreamState::Open { inner, capabilities } if capabilities.readable => Ok(inner),
            _ => Err(BodyError::NotReadable),
        }
    }

    pub(crate) fn writable_mut(&mut self) -> Result<&mut T, BodyError> {
        match self {
            StreamState::Open { inner, capabilities } if capabilities.writable => Ok(inner),
            _ => Err(BodyError::NotWritable),
        }
    }

    pub(crate) fn seekable_mut(&mut self) -> Result<&mut T, BodyError> {
        match self {
            StreamState::Open { inner, capabilities } if capabilities.seekable => Ok(inner),
            _ => Err(BodyError::NotSeekable),
        }
    }

    /// Moves the storage out and leaves the state detached.
    pub(crate) fn detach(&mut self) -> Option<T> {
        match std::mem::replace(self, StreamState::Detached) {
            StreamState::Open { inner, .. } => Some(inner),
            StreamState::Detached => None,
        }
    }

    pub(crate) fn into_inner(self) -> Option<T> {
        match self {
            StreamState::Open { inner, .. } => Some(inner),
            StreamState::Detached => None,
        }
    }
}
