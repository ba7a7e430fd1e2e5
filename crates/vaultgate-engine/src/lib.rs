//! Crypto engine interface for the Vaultgate broker.
//!
//! The broker never implements cryptography; it routes caller requests to a
//! [`CryptoEngine`]. This crate defines that seam - the trait, the handle and
//! policy types that cross it, and [`EngineError`] - plus
//! [`SoftwareEngine`], a volatile reference engine backed by RustCrypto
//! primitives, used by the demo binary and the integration tests.
//!
//! Multi-part operation state (hash, MAC, cipher, derivation) is expressed as
//! engine-defined associated types. The broker owns the contexts and passes
//! them back by reference on every call, so the engine itself stays free of
//! per-connection bookkeeping.

pub mod engine;
pub mod error;
pub mod software;

pub use engine::{CryptoEngine, KeyHandle, KeyInfo, KeyPolicy};
pub use error::EngineError;
pub use software::{SoftwareEngine, alg, key_type};
