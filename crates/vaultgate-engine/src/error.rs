//! Engine error type.

use thiserror::Error;

/// Errors reported by a [`CryptoEngine`](crate::CryptoEngine).
///
/// The broker maps these onto its closed wire status set; variants without a
/// direct wire counterpart (`VerificationFailed`, `BufferTooSmall`) map to
/// invalid-argument.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine does not implement this operation or algorithm.
    #[error("operation not supported by this engine")]
    NotSupported,

    /// The key handle is unknown to the engine.
    #[error("invalid or unknown key handle")]
    InvalidHandle,

    /// An argument was malformed or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The operation context or key slot is in the wrong state.
    #[error("operation attempted in the wrong state")]
    BadState,

    /// The engine could not allocate working memory.
    #[error("insufficient memory")]
    InsufficientMemory,

    /// A signature, tag, or digest comparison failed.
    #[error("verification failed")]
    VerificationFailed,

    /// The caller-declared output capacity is too small for the result.
    #[error("output buffer too small: need {needed} bytes")]
    BufferTooSmall {
        /// Bytes the result requires.
        needed: usize,
    },
}
