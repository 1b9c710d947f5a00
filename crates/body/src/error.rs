use thiserror::Error;

/// Errors raised by body streams, the content kind table and the body parser.
///
/// Every error is raised synchronously to the caller; nothing here is retried
/// since all operations are in-memory.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("stream is not readable")]
    NotReadable,

    #[error("stream is not writable")]
    NotWritable,

    #[error("stream is not seekable")]
    NotSeekable,

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("{what} is not implemented")]
    NotImplemented { what: String },

    #[error("structured body does not support {operation}, use the structure accessor instead")]
    StructuredAccess { operation: &'static str },

    #[error("decode failure: {reason}")]
    Decode { reason: String },

    #[error("json error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("form error: {source}")]
    Form {
        #[from]
        source: serde_urlencoded::de::Error,
    },
}

impl BodyError {
    pub fn invalid_argument<S: ToString>(str: S) -> Self {
        Self::InvalidArgument { reason: str.to_string() }
    }

    pub fn not_implemented<S: ToString>(str: S) -> Self {
        Self::NotImplemented { what: str.to_string() }
    }

    pub fn decode<S: ToString>(str: S) -> Self {
        Self::Decode { reason: str.to_string() }
    }

    /// Returns true for failures produced while decoding or encoding body content.
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Json { .. } | Self::Form { .. })
    }

    /// Returns true when the error comes from a missing stream capability.
    pub fn is_capability(&self) -> bool {
        matches!(self, Self::NotReadable | Self::NotWritable | Self::NotSeekable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(BodyError::NotSeekable.to_string(), "stream is not seekable");
        assert_eq!(
            BodyError::not_implemented("parsing a yaml body").to_string(),
            "parsing a yaml body is not implemented"
        );
        assert_eq!(
            BodyError::StructuredAccess { operation: "read" }.to_string(),
            "structured body does not support read, use the structure accessor instead"
        );
    }

    #[test]
    fn test_error_groups() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(BodyError::from(json_error).is_decode_failure());
        assert!(BodyError::decode("native body mismatch").is_decode_failure());
        assert!(!BodyError::NotReadable.is_decode_failure());

        assert!(BodyError::NotWritable.is_capability());
        assert!(!BodyError::invalid_argument("whence").is_capability());
    }
}
