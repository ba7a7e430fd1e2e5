//! Vaultgate message model and wire headers.
//!
//! Defines the typed vocabulary shared by the broker and its clients:
//!
//! - [`Message`]: one inbound event (connect, call, disconnect) with its
//!   declared parameter sizes
//! - [`ServiceKind`] and [`SignalSet`]: the multiplexed signal space the
//!   dispatch loop waits on
//! - [`Status`]: the closed set of status codes returned to callers
//! - request headers ([`CryptoRequest`], [`AsymRequest`], [`AeadRequest`],
//!   [`KeyRequest`], [`DerivationRequest`]): fixed-layout structs carried in
//!   input parameter 0 of every call
//!
//! Headers use little-endian fixed layouts with explicit encode/decode; a
//! length mismatch during decode is a recoverable [`ProtocolError`], mapped to
//! [`Status::CommunicationFailure`] by the service. How the bytes move across
//! the partition boundary is the transport's concern, not ours.

pub mod message;
pub mod ops;
pub mod request;
pub mod status;

pub use message::{CallerId, ChannelId, Message, MessageKind, PARAM_COUNT, ServiceKind, SignalSet};
pub use ops::{AeadOp, AsymOp, CipherOp, DerivationOp, HashOp, KeyOp, MacOp};
pub use request::{
    AeadRequest, AsymRequest, CryptoRequest, DerivationRequest, KeyRequest, ProtocolError,
};
pub use status::Status;
