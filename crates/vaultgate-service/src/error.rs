//! Service error type and its mapping onto wire statuses.

use thiserror::Error;
use vaultgate_engine::EngineError;
use vaultgate_proto::{ProtocolError, Status};

/// Errors a service handler can produce while processing one call.
///
/// Every variant maps to exactly one wire [`Status`]; the dispatcher sends
/// that status as the single reply for the message. Protocol violations
/// (declared/actual transfer mismatch) are not errors at this level, they
/// abort the process via [`crate::fatal`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The crypto engine rejected or failed the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A fixed-layout request header failed to decode.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The broker refused the request before reaching the engine.
    #[error("request refused with status {0:?}")]
    Refused(Status),
}

impl ServiceError {
    /// The wire status this error replies with.
    pub fn status(&self) -> Status {
        match self {
            Self::Engine(err) => match err {
                EngineError::NotSupported => Status::NotSupported,
                EngineError::InvalidHandle => Status::InvalidHandle,
                EngineError::BadState => Status::BadState,
                EngineError::InsufficientMemory => Status::InsufficientMemory,
                EngineError::InvalidArgument(_)
                | EngineError::VerificationFailed
                | EngineError::BufferTooSmall { .. } => Status::InvalidArgument,
            },
            Self::Protocol(_) => Status::CommunicationFailure,
            Self::Refused(status) => *status,
        }
    }

    /// Shorthand for a pre-engine refusal.
    pub fn refused(status: Status) -> Self {
        Self::Refused(status)
    }
}

/// Handler result alias; `Ok(())` replies [`Status::Success`].
pub type CallResult = Result<(), ServiceError>;
