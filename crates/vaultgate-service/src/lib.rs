//! Trusted-side crypto service broker.
//!
//! Vaultgate brokers cryptographic operations for isolated client partitions
//! across a privilege boundary. Clients send bounded, typed messages over a
//! [`SecureChannel`]; the broker performs the operation through a
//! [`CryptoEngine`](vaultgate_engine::CryptoEngine) and returns only results
//! the caller is authorized to see. Key material and operation state never
//! cross the boundary.
//!
//! The pieces:
//!
//! - [`dispatch`] - the wait/dispatch loop owning all shared state
//! - [`channel`] - the transport seam and an in-process loopback
//! - [`registry`] - key handle custody per caller
//! - [`clone_pool`] - the fixed-capacity hash clone slot pool
//! - [`context`] - per-connection operation contexts
//! - [`error`] - handler errors and their wire-status mapping

pub mod channel;
pub mod clone_pool;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod registry;

mod fatal;
mod services;
mod transfer;

pub use channel::{CompletedMessage, MemoryChannel, ReceiveError, SecureChannel};
pub use clone_pool::HashClonePool;
pub use context::{ContextTable, OpContext};
pub use dispatch::{Dispatcher, ServiceConfig};
pub use error::ServiceError;
pub use registry::{AccessRegistry, assemble_key_id};
