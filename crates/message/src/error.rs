use micro_body::BodyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("body error: {source}")]
    Body {
        #[from]
        source: BodyError,
    },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

impl MessageError {
    pub fn invalid_argument<S: ToString>(str: S) -> Self {
        Self::InvalidArgument { reason: str.to_string() }
    }
}
