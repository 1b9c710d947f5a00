//! Utility macros for the body crate.

/// Returns early with an error if a condition is not met.
///
/// Like `assert!`, but yields `Err($error)` instead of panicking, which keeps the
/// capability checks of the stream types on a single line.
///
/// # Example
///
/// ```ignore
/// ensure!(capabilities.readable, BodyError::NotReadable);
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
