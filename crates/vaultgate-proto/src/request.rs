//! Fixed-layout request headers.
//!
//! Every call carries one of these in input parameter 0: the operation code
//! plus the small fixed fields the sub-operation needs (key handle, algorithm
//! identifier, packed-payload lengths). Variable-length payloads travel in
//! the remaining parameters.
//!
//! Layouts are little-endian and padding-free. Decode checks the exact
//! length: a header of the wrong size means the caller's libc and the service
//! disagree about the struct layout, which is reported as
//! [`Status::CommunicationFailure`](crate::Status::CommunicationFailure)
//! rather than guessed around.

use bytes::{Buf, BufMut};
use thiserror::Error;

/// Errors decoding a request header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Header bytes had the wrong length for the expected fixed layout.
    #[error("malformed {header} header: expected {expected} bytes, got {actual}")]
    HeaderLength {
        /// Which header was being decoded.
        header: &'static str,
        /// The layout's fixed size.
        expected: usize,
        /// Declared length of input parameter 0.
        actual: usize,
    },

    /// A parameter's declared length disagrees with the header's section
    /// lengths, or a fixed-size parameter has the wrong size.
    #[error("malformed {what} parameter: header declares {declared} bytes, parameter carries {actual}")]
    ParameterLength {
        /// Which parameter was being consumed.
        what: &'static str,
        /// Total the header declares.
        declared: usize,
        /// Declared length of the parameter.
        actual: usize,
    },
}

macro_rules! check_len {
    ($src:expr, $size:expr, $name:literal) => {
        if $src.len() != $size {
            return Err(ProtocolError::HeaderLength {
                header: $name,
                expected: $size,
                actual: $src.len(),
            });
        }
    };
}

/// Request header for hash, MAC, and symmetric cipher calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoRequest {
    /// Operation code (kind-specific).
    pub op: u16,
    /// Algorithm identifier, interpreted by the engine.
    pub alg: u32,
    /// Key handle, where the operation takes one.
    pub handle: u32,
}

impl CryptoRequest {
    /// Encoded size in bytes.
    pub const SIZE: usize = 10;

    /// Encode into a buffer.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u16_le(self.op);
        dst.put_u32_le(self.alg);
        dst.put_u32_le(self.handle);
    }

    /// Decode from exactly [`Self::SIZE`] bytes.
    pub fn decode(mut src: &[u8]) -> Result<Self, ProtocolError> {
        check_len!(src, Self::SIZE, "crypto");
        Ok(Self { op: src.get_u16_le(), alg: src.get_u32_le(), handle: src.get_u32_le() })
    }
}

/// Request header for one-shot asymmetric calls.
///
/// For encrypt/decrypt, input parameter 1 packs `input || salt`;
/// `input_len` and `salt_len` say where the split is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsymRequest {
    /// Operation code.
    pub op: u16,
    /// Algorithm identifier.
    pub alg: u32,
    /// Key handle.
    pub handle: u32,
    /// Length of the input section of the packed payload.
    pub input_len: u32,
    /// Length of the salt section of the packed payload.
    pub salt_len: u32,
}

impl AsymRequest {
    /// Encoded size in bytes.
    pub const SIZE: usize = 18;

    /// Encode into a buffer.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u16_le(self.op);
        dst.put_u32_le(self.alg);
        dst.put_u32_le(self.handle);
        dst.put_u32_le(self.input_len);
        dst.put_u32_le(self.salt_len);
    }

    /// Decode from exactly [`Self::SIZE`] bytes.
    pub fn decode(mut src: &[u8]) -> Result<Self, ProtocolError> {
        check_len!(src, Self::SIZE, "asymmetric");
        Ok(Self {
            op: src.get_u16_le(),
            alg: src.get_u32_le(),
            handle: src.get_u32_le(),
            input_len: src.get_u32_le(),
            salt_len: src.get_u32_le(),
        })
    }
}

/// Request header for one-shot AEAD calls.
///
/// Input parameter 1 packs `additional_data || input`; the nonce rides in the
/// header itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AeadRequest {
    /// Operation code.
    pub op: u16,
    /// Algorithm identifier.
    pub alg: u32,
    /// Key handle.
    pub handle: u32,
    /// Number of valid bytes in `nonce`.
    pub nonce_len: u8,
    /// Nonce bytes (first `nonce_len` are valid).
    pub nonce: [u8; Self::NONCE_CAPACITY],
    /// Length of the additional-data section of the packed payload.
    pub additional_len: u32,
    /// Length of the input section of the packed payload.
    pub input_len: u32,
}

impl AeadRequest {
    /// Maximum nonce bytes the header can carry.
    pub const NONCE_CAPACITY: usize = 16;

    /// Encoded size in bytes.
    pub const SIZE: usize = 35;

    /// Encode into a buffer.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u16_le(self.op);
        dst.put_u32_le(self.alg);
        dst.put_u32_le(self.handle);
        dst.put_u8(self.nonce_len);
        dst.put_slice(&self.nonce);
        dst.put_u32_le(self.additional_len);
        dst.put_u32_le(self.input_len);
    }

    /// Decode from exactly [`Self::SIZE`] bytes.
    pub fn decode(mut src: &[u8]) -> Result<Self, ProtocolError> {
        check_len!(src, Self::SIZE, "aead");
        let op = src.get_u16_le();
        let alg = src.get_u32_le();
        let handle = src.get_u32_le();
        let nonce_len = src.get_u8();
        let mut nonce = [0u8; Self::NONCE_CAPACITY];
        src.copy_to_slice(&mut nonce);
        Ok(Self {
            op,
            alg,
            handle,
            nonce_len,
            nonce,
            additional_len: src.get_u32_le(),
            input_len: src.get_u32_le(),
        })
    }
}

/// Request header for key lifecycle calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRequest {
    /// Operation code.
    pub op: u16,
    /// Key handle, where the operation takes one.
    pub handle: u32,
    /// Key lifetime, for create/open.
    pub lifetime: u32,
    /// Key type, for import/generate.
    pub key_type: u32,
    /// Key size in bits, for generate.
    pub bits: u32,
}

impl KeyRequest {
    /// Encoded size in bytes.
    pub const SIZE: usize = 18;

    /// Encode into a buffer.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u16_le(self.op);
        dst.put_u32_le(self.handle);
        dst.put_u32_le(self.lifetime);
        dst.put_u32_le(self.key_type);
        dst.put_u32_le(self.bits);
    }

    /// Decode from exactly [`Self::SIZE`] bytes.
    pub fn decode(mut src: &[u8]) -> Result<Self, ProtocolError> {
        check_len!(src, Self::SIZE, "key");
        Ok(Self {
            op: src.get_u16_le(),
            handle: src.get_u32_le(),
            lifetime: src.get_u32_le(),
            key_type: src.get_u32_le(),
            bits: src.get_u32_le(),
        })
    }
}

/// Request header for key derivation and agreement calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationRequest {
    /// Operation code.
    pub op: u16,
    /// Algorithm identifier.
    pub alg: u32,
    /// Key handle, where the operation takes one.
    pub handle: u32,
    /// Requested derivation capacity in bytes.
    pub capacity: u64,
}

impl DerivationRequest {
    /// Encoded size in bytes.
    pub const SIZE: usize = 18;

    /// Encode into a buffer.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u16_le(self.op);
        dst.put_u32_le(self.alg);
        dst.put_u32_le(self.handle);
        dst.put_u64_le(self.capacity);
    }

    /// Decode from exactly [`Self::SIZE`] bytes.
    pub fn decode(mut src: &[u8]) -> Result<Self, ProtocolError> {
        check_len!(src, Self::SIZE, "derivation");
        Ok(Self {
            op: src.get_u16_le(),
            alg: src.get_u32_le(),
            handle: src.get_u32_le(),
            capacity: src.get_u64_le(),
        })
    }
}
