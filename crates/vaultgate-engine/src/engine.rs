//! The [`CryptoEngine`] trait and the types that cross it.

use crate::error::EngineError;

/// Engine result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Opaque reference to key material held by the engine.
///
/// A handle carries no ownership information; which caller may use it is the
/// broker's access-control registry's business, not the engine's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHandle(pub u32);

/// Usage policy attached to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyPolicy {
    /// Permitted usage flags.
    pub usage: u32,
    /// Algorithm the key is restricted to.
    pub alg: u32,
}

impl KeyPolicy {
    /// Encoded size in bytes.
    pub const SIZE: usize = 8;

    /// Little-endian fixed encoding, as written to output parameters.
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..4].copy_from_slice(&self.usage.to_le_bytes());
        out[4..].copy_from_slice(&self.alg.to_le_bytes());
        out
    }

    /// Decode from exactly [`Self::SIZE`] bytes.
    pub fn from_bytes(src: &[u8]) -> Result<Self> {
        let (usage, alg) = match (src.get(..4), src.get(4..8)) {
            (Some(usage), Some(alg)) if src.len() == Self::SIZE => (usage, alg),
            _ => return Err(EngineError::InvalidArgument("key policy must be 8 bytes")),
        };
        Ok(Self {
            usage: u32::from_le_bytes([usage[0], usage[1], usage[2], usage[3]]),
            alg: u32::from_le_bytes([alg[0], alg[1], alg[2], alg[3]]),
        })
    }
}

/// A key's type and size, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyInfo {
    /// Key type identifier.
    pub key_type: u32,
    /// Key size in bits.
    pub bits: usize,
}

/// The crypto collaborator the broker dispatches into.
///
/// All methods are fallible except [`free`](Self::free); failures surface as
/// [`EngineError`] and the broker converts them to wire statuses. Multi-part
/// state lives in the associated `*Op` types: the broker creates one per
/// connection via the `new_*` constructors, passes it to every call on that
/// connection, and drops it on disconnect after the kind's abort.
pub trait CryptoEngine {
    /// Multi-part hash state.
    type HashOp;
    /// Multi-part MAC state.
    type MacOp;
    /// Multi-part cipher state.
    type CipherOp;
    /// Key derivation state.
    type DerivationOp;

    /// Initialize the engine. Idempotent; the broker reference-counts callers.
    fn init(&mut self) -> Result<()>;
    /// Tear the engine down, releasing volatile state.
    fn free(&mut self);

    /// Allocate a zeroed hash context.
    fn new_hash(&mut self) -> Result<Self::HashOp>;
    /// Allocate a zeroed MAC context.
    fn new_mac(&mut self) -> Result<Self::MacOp>;
    /// Allocate a zeroed cipher context.
    fn new_cipher(&mut self) -> Result<Self::CipherOp>;
    /// Allocate a zeroed derivation context.
    fn new_derivation(&mut self) -> Result<Self::DerivationOp>;

    /// Bind a hash context to an algorithm.
    fn hash_setup(&mut self, op: &mut Self::HashOp, alg: u32) -> Result<()>;
    /// Feed input into a hash context.
    fn hash_update(&mut self, op: &mut Self::HashOp, input: &[u8]) -> Result<()>;
    /// Finalize a hash; returns the digest length written.
    fn hash_finish(&mut self, op: &mut Self::HashOp, digest: &mut [u8]) -> Result<usize>;
    /// Finalize a hash and compare against an expected digest.
    fn hash_verify(&mut self, op: &mut Self::HashOp, expected: &[u8]) -> Result<()>;
    /// Reset a hash context. Idempotent.
    fn hash_abort(&mut self, op: &mut Self::HashOp) -> Result<()>;
    /// Copy a live hash state into a fresh context.
    fn hash_clone(&mut self, source: &Self::HashOp, target: &mut Self::HashOp) -> Result<()>;

    /// Bind a MAC context to a key and algorithm for signing.
    fn mac_sign_setup(&mut self, op: &mut Self::MacOp, key: KeyHandle, alg: u32) -> Result<()>;
    /// Bind a MAC context to a key and algorithm for verification.
    fn mac_verify_setup(&mut self, op: &mut Self::MacOp, key: KeyHandle, alg: u32) -> Result<()>;
    /// Feed input into a MAC context.
    fn mac_update(&mut self, op: &mut Self::MacOp, input: &[u8]) -> Result<()>;
    /// Finalize a MAC; returns the MAC length written.
    fn mac_sign_finish(&mut self, op: &mut Self::MacOp, mac: &mut [u8]) -> Result<usize>;
    /// Finalize a MAC and compare against an expected value.
    fn mac_verify_finish(&mut self, op: &mut Self::MacOp, expected: &[u8]) -> Result<()>;
    /// Reset a MAC context. Idempotent.
    fn mac_abort(&mut self, op: &mut Self::MacOp) -> Result<()>;

    /// Bind a cipher context to a key and algorithm for encryption.
    fn cipher_encrypt_setup(
        &mut self,
        op: &mut Self::CipherOp,
        key: KeyHandle,
        alg: u32,
    ) -> Result<()>;
    /// Bind a cipher context to a key and algorithm for decryption.
    fn cipher_decrypt_setup(
        &mut self,
        op: &mut Self::CipherOp,
        key: KeyHandle,
        alg: u32,
    ) -> Result<()>;
    /// Generate a fresh IV; returns the IV length written.
    fn cipher_generate_iv(&mut self, op: &mut Self::CipherOp, iv: &mut [u8]) -> Result<usize>;
    /// Set the IV explicitly.
    fn cipher_set_iv(&mut self, op: &mut Self::CipherOp, iv: &[u8]) -> Result<()>;
    /// Transform one buffer; returns the output length written.
    fn cipher_update(
        &mut self,
        op: &mut Self::CipherOp,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize>;
    /// Finalize; returns the output length written.
    fn cipher_finish(&mut self, op: &mut Self::CipherOp, output: &mut [u8]) -> Result<usize>;
    /// Reset a cipher context. Idempotent.
    fn cipher_abort(&mut self, op: &mut Self::CipherOp) -> Result<()>;

    /// Sign a precomputed hash; returns the signature length written.
    fn asymmetric_sign(
        &mut self,
        key: KeyHandle,
        alg: u32,
        hash: &[u8],
        signature: &mut [u8],
    ) -> Result<usize>;
    /// Verify a signature over a precomputed hash.
    fn asymmetric_verify(
        &mut self,
        key: KeyHandle,
        alg: u32,
        hash: &[u8],
        signature: &[u8],
    ) -> Result<()>;
    /// Asymmetric encryption; returns the output length written.
    fn asymmetric_encrypt(
        &mut self,
        key: KeyHandle,
        alg: u32,
        input: &[u8],
        salt: &[u8],
        output: &mut [u8],
    ) -> Result<usize>;
    /// Asymmetric decryption; returns the output length written.
    fn asymmetric_decrypt(
        &mut self,
        key: KeyHandle,
        alg: u32,
        input: &[u8],
        salt: &[u8],
        output: &mut [u8],
    ) -> Result<usize>;

    /// One-shot AEAD encryption; returns the output length written.
    fn aead_encrypt(
        &mut self,
        key: KeyHandle,
        alg: u32,
        nonce: &[u8],
        additional: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize>;
    /// One-shot AEAD decryption; returns the output length written.
    fn aead_decrypt(
        &mut self,
        key: KeyHandle,
        alg: u32,
        nonce: &[u8],
        additional: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize>;

    /// Allocate a fresh volatile key handle with no material.
    fn allocate_key(&mut self) -> Result<KeyHandle>;
    /// Create a named persistent key; `id` is the engine-namespace key id.
    fn create_key(&mut self, lifetime: u32, id: u64) -> Result<KeyHandle>;
    /// Open an existing named persistent key.
    fn open_key(&mut self, lifetime: u32, id: u64) -> Result<KeyHandle>;
    /// Close a handle without destroying the key.
    fn close_key(&mut self, key: KeyHandle) -> Result<()>;
    /// Destroy a key and its material.
    fn destroy_key(&mut self, key: KeyHandle) -> Result<()>;
    /// Import key material into an allocated handle.
    fn import_key(&mut self, key: KeyHandle, key_type: u32, data: &[u8]) -> Result<()>;
    /// Export key material; returns the length written.
    fn export_key(&mut self, key: KeyHandle, output: &mut [u8]) -> Result<usize>;
    /// Export the public half of a key pair; returns the length written.
    fn export_public_key(&mut self, key: KeyHandle, output: &mut [u8]) -> Result<usize>;
    /// Generate key material into an allocated handle.
    fn generate_key(
        &mut self,
        key: KeyHandle,
        key_type: u32,
        bits: usize,
        params: &[u8],
    ) -> Result<()>;
    /// Set a key's usage policy.
    fn set_key_policy(&mut self, key: KeyHandle, policy: KeyPolicy) -> Result<()>;
    /// Read a key's usage policy.
    fn get_key_policy(&mut self, key: KeyHandle) -> Result<KeyPolicy>;
    /// Read a key's lifetime.
    fn get_key_lifetime(&mut self, key: KeyHandle) -> Result<u32>;
    /// Read a key's type and size.
    fn get_key_info(&mut self, key: KeyHandle) -> Result<KeyInfo>;

    /// Remaining derivation capacity in bytes.
    fn derivation_capacity(&mut self, op: &Self::DerivationOp) -> Result<u64>;
    /// Read derived bytes, consuming capacity.
    fn derivation_read(&mut self, op: &mut Self::DerivationOp, output: &mut [u8]) -> Result<()>;
    /// Import derived material into a key handle.
    fn derivation_import_key(
        &mut self,
        op: &mut Self::DerivationOp,
        key: KeyHandle,
        key_type: u32,
        bits: usize,
    ) -> Result<()>;
    /// Reset a derivation context. Idempotent.
    fn derivation_abort(&mut self, op: &mut Self::DerivationOp) -> Result<()>;
    /// Start a key derivation from a base key.
    fn derive(
        &mut self,
        op: &mut Self::DerivationOp,
        key: KeyHandle,
        alg: u32,
        salt: &[u8],
        label: &[u8],
        capacity: u64,
    ) -> Result<()>;
    /// Start a key agreement with a peer public key.
    fn key_agreement(
        &mut self,
        op: &mut Self::DerivationOp,
        key: KeyHandle,
        peer_key: &[u8],
        alg: u32,
    ) -> Result<()>;

    /// Fill the output with random bytes.
    fn generate_random(&mut self, output: &mut [u8]) -> Result<()>;
    /// One-time entropy seed injection, before init.
    fn inject_entropy(&mut self, seed: &[u8]) -> Result<()>;
    /// Largest entropy seed the engine accepts.
    fn entropy_seed_limit(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_policy_roundtrip() {
        let policy = KeyPolicy { usage: 0x0000_0300, alg: 0x0101 };
        let bytes = policy.to_bytes();
        assert_eq!(KeyPolicy::from_bytes(&bytes).unwrap(), policy);
    }

    #[test]
    fn key_policy_rejects_wrong_length() {
        assert!(KeyPolicy::from_bytes(&[0u8; 7]).is_err());
        assert!(KeyPolicy::from_bytes(&[0u8; 9]).is_err());
        assert!(KeyPolicy::from_bytes(&[]).is_err());
    }
}
