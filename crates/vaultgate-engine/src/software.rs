//! Software reference engine.
//!
//! A volatile [`CryptoEngine`] backed by RustCrypto primitives, good enough
//! to run the broker end to end in tests and the demo binary. It is not a
//! hardened engine: key material lives in process memory (zeroized on drop)
//! and "persistent" keys survive only as long as the process.
//!
//! Supported: SHA-256/384/512 hashing with clone, HMAC-SHA-256 MAC,
//! ChaCha20-Poly1305 AEAD, Ed25519 sign/verify, HKDF-SHA-256 derivation.
//! Multi-part symmetric ciphers and asymmetric encrypt/decrypt are reported
//! as not supported and the broker forwards that status faithfully.

use std::collections::HashMap;

use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::{
    engine::{CryptoEngine, KeyHandle, KeyInfo, KeyPolicy, Result},
    error::EngineError,
};

type HmacSha256 = Hmac<Sha256>;

/// Algorithm identifiers understood by the software engine.
pub mod alg {
    /// SHA-256.
    pub const SHA_256: u32 = 0x0001;
    /// SHA-384.
    pub const SHA_384: u32 = 0x0002;
    /// SHA-512.
    pub const SHA_512: u32 = 0x0003;
    /// HMAC with SHA-256.
    pub const HMAC_SHA_256: u32 = 0x0101;
    /// ChaCha20-Poly1305 AEAD (96-bit nonce).
    pub const CHACHA20_POLY1305: u32 = 0x0201;
    /// Ed25519 signatures.
    pub const ED25519: u32 = 0x0301;
    /// HKDF with SHA-256.
    pub const HKDF_SHA_256: u32 = 0x0401;
}

/// Key type identifiers understood by the software engine.
pub mod key_type {
    /// Unstructured secret bytes.
    pub const RAW: u32 = 1;
    /// HMAC key.
    pub const HMAC: u32 = 2;
    /// ChaCha20-Poly1305 key (32 bytes).
    pub const CHACHA20: u32 = 3;
    /// Ed25519 key pair (32-byte seed).
    pub const ED25519_KEYPAIR: u32 = 4;
}

/// Nonce length ChaCha20-Poly1305 requires.
const CHACHA_NONCE_LEN: usize = 12;

/// Largest entropy seed accepted by [`SoftwareEngine::inject_entropy`].
const ENTROPY_SEED_LIMIT: usize = 1024;

/// HKDF-SHA-256 can expand at most 255 blocks.
const HKDF_MAX_EXPAND: usize = 255 * 32;

/// Multi-part hash state.
#[derive(Clone, Default)]
pub enum SoftwareHashOp {
    /// No algorithm bound.
    #[default]
    Idle,
    /// SHA-256 in progress.
    Sha256(Sha256),
    /// SHA-384 in progress.
    Sha384(Sha384),
    /// SHA-512 in progress.
    Sha512(Sha512),
}

impl SoftwareHashOp {
    fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    fn finalize(self) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Self::Idle => Err(EngineError::BadState),
            Self::Sha256(hasher) => Ok(Zeroizing::new(hasher.finalize().to_vec())),
            Self::Sha384(hasher) => Ok(Zeroizing::new(hasher.finalize().to_vec())),
            Self::Sha512(hasher) => Ok(Zeroizing::new(hasher.finalize().to_vec())),
        }
    }
}

/// Multi-part MAC state.
#[derive(Clone, Default)]
pub enum SoftwareMacOp {
    /// No key bound.
    #[default]
    Idle,
    /// HMAC-SHA-256 in progress.
    Active(HmacSha256),
}

/// Multi-part cipher state.
///
/// The software engine implements no multi-part cipher; the context exists so
/// connection lifecycle works, and every operation on it reports
/// not-supported. Abort stays idempotent.
#[derive(Clone, Copy, Default)]
pub struct SoftwareCipherOp;

struct DerivationStream {
    hkdf: Hkdf<Sha256>,
    label: Vec<u8>,
    offset: usize,
    capacity: u64,
}

/// Key derivation state (HKDF-SHA-256).
#[derive(Default)]
pub struct SoftwareDerivationOp {
    stream: Option<DerivationStream>,
}

#[derive(Clone)]
struct KeyEntry {
    key_type: u32,
    bits: usize,
    lifetime: u32,
    policy: KeyPolicy,
    material: Zeroizing<Vec<u8>>,
    persistent_id: Option<u64>,
}

impl KeyEntry {
    fn empty(lifetime: u32, persistent_id: Option<u64>) -> Self {
        Self {
            key_type: 0,
            bits: 0,
            lifetime,
            policy: KeyPolicy::default(),
            material: Zeroizing::new(Vec::new()),
            persistent_id,
        }
    }

    fn occupied(&self) -> bool {
        !self.material.is_empty()
    }
}

/// Volatile software engine.
pub struct SoftwareEngine {
    initialized: bool,
    entropy_seeded: bool,
    next_handle: u32,
    handles: HashMap<u32, KeyEntry>,
    // Named key store; handle mutations write back on close.
    persistent: HashMap<u64, KeyEntry>,
}

impl SoftwareEngine {
    /// Create an uninitialized engine.
    pub fn new() -> Self {
        Self {
            initialized: false,
            entropy_seeded: false,
            next_handle: 1,
            handles: HashMap::new(),
            persistent: HashMap::new(),
        }
    }

    /// Whether the engine has been initialized and not yet freed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn require_init(&self) -> Result<()> {
        if self.initialized { Ok(()) } else { Err(EngineError::BadState) }
    }

    fn entry(&self, key: KeyHandle) -> Result<&KeyEntry> {
        self.handles.get(&key.0).ok_or(EngineError::InvalidHandle)
    }

    fn entry_mut(&mut self, key: KeyHandle) -> Result<&mut KeyEntry> {
        self.handles.get_mut(&key.0).ok_or(EngineError::InvalidHandle)
    }

    fn fresh_handle(&mut self, entry: KeyEntry) -> KeyHandle {
        let handle = self.next_handle;
        self.next_handle = self.next_handle.wrapping_add(1).max(1);
        self.handles.insert(handle, entry);
        KeyHandle(handle)
    }

    fn hmac_for_key(&self, key: KeyHandle) -> Result<HmacSha256> {
        let entry = self.entry(key)?;
        if !entry.occupied() {
            return Err(EngineError::BadState);
        }
        // `aead::KeyInit` also provides `new_from_slice` for this wrapper
        // type, so the call must name the `Mac` impl.
        <HmacSha256 as Mac>::new_from_slice(&entry.material)
            .map_err(|_| EngineError::InvalidArgument("unusable MAC key length"))
    }

    fn signing_key(&self, key: KeyHandle) -> Result<ed25519_dalek::SigningKey> {
        let entry = self.entry(key)?;
        if entry.key_type != key_type::ED25519_KEYPAIR {
            return Err(EngineError::InvalidArgument("key is not an Ed25519 key pair"));
        }
        let seed: [u8; 32] =
            entry.material.as_slice().try_into().map_err(|_| EngineError::BadState)?;
        Ok(ed25519_dalek::SigningKey::from_bytes(&seed))
    }

    fn write_result(output: &mut [u8], data: &[u8]) -> Result<usize> {
        if output.len() < data.len() {
            return Err(EngineError::BufferTooSmall { needed: data.len() });
        }
        output[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }
}

impl Default for SoftwareEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoEngine for SoftwareEngine {
    type HashOp = SoftwareHashOp;
    type MacOp = SoftwareMacOp;
    type CipherOp = SoftwareCipherOp;
    type DerivationOp = SoftwareDerivationOp;

    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn free(&mut self) {
        self.handles.clear();
        self.initialized = false;
    }

    fn new_hash(&mut self) -> Result<Self::HashOp> {
        Ok(SoftwareHashOp::Idle)
    }

    fn new_mac(&mut self) -> Result<Self::MacOp> {
        Ok(SoftwareMacOp::Idle)
    }

    fn new_cipher(&mut self) -> Result<Self::CipherOp> {
        Ok(SoftwareCipherOp)
    }

    fn new_derivation(&mut self) -> Result<Self::DerivationOp> {
        Ok(SoftwareDerivationOp::default())
    }

    fn hash_setup(&mut self, op: &mut Self::HashOp, alg: u32) -> Result<()> {
        if !op.is_idle() {
            return Err(EngineError::BadState);
        }
        *op = match alg {
            alg::SHA_256 => SoftwareHashOp::Sha256(Sha256::new()),
            alg::SHA_384 => SoftwareHashOp::Sha384(Sha384::new()),
            alg::SHA_512 => SoftwareHashOp::Sha512(Sha512::new()),
            _ => return Err(EngineError::NotSupported),
        };
        Ok(())
    }

    fn hash_update(&mut self, op: &mut Self::HashOp, input: &[u8]) -> Result<()> {
        match op {
            SoftwareHashOp::Idle => Err(EngineError::BadState),
            SoftwareHashOp::Sha256(hasher) => {
                hasher.update(input);
                Ok(())
            },
            SoftwareHashOp::Sha384(hasher) => {
                hasher.update(input);
                Ok(())
            },
            SoftwareHashOp::Sha512(hasher) => {
                hasher.update(input);
                Ok(())
            },
        }
    }

    fn hash_finish(&mut self, op: &mut Self::HashOp, digest: &mut [u8]) -> Result<usize> {
        let digest_bytes = std::mem::take(op).finalize()?;
        Self::write_result(digest, &digest_bytes)
    }

    fn hash_verify(&mut self, op: &mut Self::HashOp, expected: &[u8]) -> Result<()> {
        let digest_bytes = std::mem::take(op).finalize()?;
        if digest_bytes.as_slice() == expected {
            Ok(())
        } else {
            Err(EngineError::VerificationFailed)
        }
    }

    fn hash_abort(&mut self, op: &mut Self::HashOp) -> Result<()> {
        *op = SoftwareHashOp::Idle;
        Ok(())
    }

    fn hash_clone(&mut self, source: &Self::HashOp, target: &mut Self::HashOp) -> Result<()> {
        if source.is_idle() || !target.is_idle() {
            return Err(EngineError::BadState);
        }
        *target = source.clone();
        Ok(())
    }

    fn mac_sign_setup(&mut self, op: &mut Self::MacOp, key: KeyHandle, alg: u32) -> Result<()> {
        if !matches!(op, SoftwareMacOp::Idle) {
            return Err(EngineError::BadState);
        }
        if alg != alg::HMAC_SHA_256 {
            return Err(EngineError::NotSupported);
        }
        *op = SoftwareMacOp::Active(self.hmac_for_key(key)?);
        Ok(())
    }

    fn mac_verify_setup(&mut self, op: &mut Self::MacOp, key: KeyHandle, alg: u32) -> Result<()> {
        self.mac_sign_setup(op, key, alg)
    }

    fn mac_update(&mut self, op: &mut Self::MacOp, input: &[u8]) -> Result<()> {
        match op {
            SoftwareMacOp::Idle => Err(EngineError::BadState),
            SoftwareMacOp::Active(mac) => {
                mac.update(input);
                Ok(())
            },
        }
    }

    fn mac_sign_finish(&mut self, op: &mut Self::MacOp, mac_out: &mut [u8]) -> Result<usize> {
        match std::mem::take(op) {
            SoftwareMacOp::Idle => Err(EngineError::BadState),
            SoftwareMacOp::Active(mac) => {
                let tag = mac.finalize().into_bytes();
                Self::write_result(mac_out, &tag)
            },
        }
    }

    fn mac_verify_finish(&mut self, op: &mut Self::MacOp, expected: &[u8]) -> Result<()> {
        match std::mem::take(op) {
            SoftwareMacOp::Idle => Err(EngineError::BadState),
            SoftwareMacOp::Active(mac) => {
                mac.verify_slice(expected).map_err(|_| EngineError::VerificationFailed)
            },
        }
    }

    fn mac_abort(&mut self, op: &mut Self::MacOp) -> Result<()> {
        *op = SoftwareMacOp::Idle;
        Ok(())
    }

    fn cipher_encrypt_setup(
        &mut self,
        _op: &mut Self::CipherOp,
        _key: KeyHandle,
        _alg: u32,
    ) -> Result<()> {
        Err(EngineError::NotSupported)
    }

    fn cipher_decrypt_setup(
        &mut self,
        _op: &mut Self::CipherOp,
        _key: KeyHandle,
        _alg: u32,
    ) -> Result<()> {
        Err(EngineError::NotSupported)
    }

    fn cipher_generate_iv(&mut self, _op: &mut Self::CipherOp, _iv: &mut [u8]) -> Result<usize> {
        Err(EngineError::NotSupported)
    }

    fn cipher_set_iv(&mut self, _op: &mut Self::CipherOp, _iv: &[u8]) -> Result<()> {
        Err(EngineError::NotSupported)
    }

    fn cipher_update(
        &mut self,
        _op: &mut Self::CipherOp,
        _input: &[u8],
        _output: &mut [u8],
    ) -> Result<usize> {
        Err(EngineError::NotSupported)
    }

    fn cipher_finish(&mut self, _op: &mut Self::CipherOp, _output: &mut [u8]) -> Result<usize> {
        Err(EngineError::NotSupported)
    }

    fn cipher_abort(&mut self, _op: &mut Self::CipherOp) -> Result<()> {
        Ok(())
    }

    fn asymmetric_sign(
        &mut self,
        key: KeyHandle,
        alg: u32,
        hash: &[u8],
        signature: &mut [u8],
    ) -> Result<usize> {
        if alg != alg::ED25519 {
            return Err(EngineError::NotSupported);
        }
        use ed25519_dalek::Signer;
        let signing = self.signing_key(key)?;
        let sig = signing.sign(hash);
        Self::write_result(signature, &sig.to_bytes())
    }

    fn asymmetric_verify(
        &mut self,
        key: KeyHandle,
        alg: u32,
        hash: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        if alg != alg::ED25519 {
            return Err(EngineError::NotSupported);
        }
        use ed25519_dalek::Verifier;
        let signing = self.signing_key(key)?;
        let sig = ed25519_dalek::Signature::from_slice(signature)
            .map_err(|_| EngineError::InvalidArgument("malformed signature"))?;
        signing
            .verifying_key()
            .verify(hash, &sig)
            .map_err(|_| EngineError::VerificationFailed)
    }

    fn asymmetric_encrypt(
        &mut self,
        _key: KeyHandle,
        _alg: u32,
        _input: &[u8],
        _salt: &[u8],
        _output: &mut [u8],
    ) -> Result<usize> {
        Err(EngineError::NotSupported)
    }

    fn asymmetric_decrypt(
        &mut self,
        _key: KeyHandle,
        _alg: u32,
        _input: &[u8],
        _salt: &[u8],
        _output: &mut [u8],
    ) -> Result<usize> {
        Err(EngineError::NotSupported)
    }

    fn aead_encrypt(
        &mut self,
        key: KeyHandle,
        alg: u32,
        nonce: &[u8],
        additional: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize> {
        if alg != alg::CHACHA20_POLY1305 {
            return Err(EngineError::NotSupported);
        }
        if nonce.len() != CHACHA_NONCE_LEN {
            return Err(EngineError::InvalidArgument("nonce must be 12 bytes"));
        }
        let entry = self.entry(key)?;
        let cipher = ChaCha20Poly1305::new_from_slice(&entry.material)
            .map_err(|_| EngineError::InvalidArgument("unusable AEAD key length"))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(nonce), Payload { msg: input, aad: additional })
            .map_err(|_| EngineError::InvalidArgument("AEAD encryption failed"))?;
        Self::write_result(output, &ciphertext)
    }

    fn aead_decrypt(
        &mut self,
        key: KeyHandle,
        alg: u32,
        nonce: &[u8],
        additional: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize> {
        if alg != alg::CHACHA20_POLY1305 {
            return Err(EngineError::NotSupported);
        }
        if nonce.len() != CHACHA_NONCE_LEN {
            return Err(EngineError::InvalidArgument("nonce must be 12 bytes"));
        }
        let entry = self.entry(key)?;
        let cipher = ChaCha20Poly1305::new_from_slice(&entry.material)
            .map_err(|_| EngineError::InvalidArgument("unusable AEAD key length"))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: input, aad: additional })
            .map_err(|_| EngineError::VerificationFailed)?;
        Self::write_result(output, &plaintext)
    }

    fn allocate_key(&mut self) -> Result<KeyHandle> {
        self.require_init()?;
        Ok(self.fresh_handle(KeyEntry::empty(0, None)))
    }

    fn create_key(&mut self, lifetime: u32, id: u64) -> Result<KeyHandle> {
        self.require_init()?;
        if self.persistent.contains_key(&id) {
            return Err(EngineError::InvalidArgument("key id already exists"));
        }
        let entry = KeyEntry::empty(lifetime, Some(id));
        self.persistent.insert(id, entry.clone());
        Ok(self.fresh_handle(entry))
    }

    fn open_key(&mut self, _lifetime: u32, id: u64) -> Result<KeyHandle> {
        self.require_init()?;
        let entry = self.persistent.get(&id).cloned().ok_or(EngineError::InvalidHandle)?;
        Ok(self.fresh_handle(entry))
    }

    fn close_key(&mut self, key: KeyHandle) -> Result<()> {
        let entry = self.handles.remove(&key.0).ok_or(EngineError::InvalidHandle)?;
        if let Some(id) = entry.persistent_id {
            self.persistent.insert(id, entry);
        }
        Ok(())
    }

    fn destroy_key(&mut self, key: KeyHandle) -> Result<()> {
        let entry = self.handles.remove(&key.0).ok_or(EngineError::InvalidHandle)?;
        if let Some(id) = entry.persistent_id {
            self.persistent.remove(&id);
        }
        Ok(())
    }

    fn import_key(&mut self, key: KeyHandle, kind: u32, data: &[u8]) -> Result<()> {
        if kind == key_type::ED25519_KEYPAIR && data.len() != 32 {
            return Err(EngineError::InvalidArgument("Ed25519 seed must be 32 bytes"));
        }
        if data.is_empty() {
            return Err(EngineError::InvalidArgument("empty key material"));
        }
        let entry = self.entry_mut(key)?;
        if entry.occupied() {
            return Err(EngineError::BadState);
        }
        entry.key_type = kind;
        entry.bits = data.len() * 8;
        entry.material = Zeroizing::new(data.to_vec());
        Ok(())
    }

    fn export_key(&mut self, key: KeyHandle, output: &mut [u8]) -> Result<usize> {
        let entry = self.entry(key)?;
        if !entry.occupied() {
            return Err(EngineError::BadState);
        }
        let material = entry.material.clone();
        Self::write_result(output, &material)
    }

    fn export_public_key(&mut self, key: KeyHandle, output: &mut [u8]) -> Result<usize> {
        let signing = self.signing_key(key)?;
        Self::write_result(output, signing.verifying_key().as_bytes())
    }

    fn generate_key(
        &mut self,
        key: KeyHandle,
        kind: u32,
        bits: usize,
        params: &[u8],
    ) -> Result<()> {
        if !params.is_empty() {
            return Err(EngineError::InvalidArgument("generation parameters not supported"));
        }
        let byte_len = match kind {
            key_type::ED25519_KEYPAIR => 32,
            key_type::RAW | key_type::HMAC | key_type::CHACHA20 => {
                if bits == 0 || bits % 8 != 0 {
                    return Err(EngineError::InvalidArgument("key size must be a multiple of 8"));
                }
                bits / 8
            },
            _ => return Err(EngineError::NotSupported),
        };
        let mut material = Zeroizing::new(vec![0u8; byte_len]);
        OsRng.fill_bytes(&mut material);
        let entry = self.entry_mut(key)?;
        if entry.occupied() {
            return Err(EngineError::BadState);
        }
        entry.key_type = kind;
        entry.bits = byte_len * 8;
        entry.material = material;
        Ok(())
    }

    fn set_key_policy(&mut self, key: KeyHandle, policy: KeyPolicy) -> Result<()> {
        self.entry_mut(key)?.policy = policy;
        Ok(())
    }

    fn get_key_policy(&mut self, key: KeyHandle) -> Result<KeyPolicy> {
        Ok(self.entry(key)?.policy)
    }

    fn get_key_lifetime(&mut self, key: KeyHandle) -> Result<u32> {
        Ok(self.entry(key)?.lifetime)
    }

    fn get_key_info(&mut self, key: KeyHandle) -> Result<KeyInfo> {
        let entry = self.entry(key)?;
        Ok(KeyInfo { key_type: entry.key_type, bits: entry.bits })
    }

    fn derivation_capacity(&mut self, op: &Self::DerivationOp) -> Result<u64> {
        let stream = op.stream.as_ref().ok_or(EngineError::BadState)?;
        Ok(stream.capacity - stream.offset as u64)
    }

    fn derivation_read(&mut self, op: &mut Self::DerivationOp, output: &mut [u8]) -> Result<()> {
        let stream = op.stream.as_mut().ok_or(EngineError::BadState)?;
        let end = stream
            .offset
            .checked_add(output.len())
            .ok_or(EngineError::InvalidArgument("derivation length overflow"))?;
        if end as u64 > stream.capacity {
            return Err(EngineError::InvalidArgument("derivation capacity exceeded"));
        }
        if end > HKDF_MAX_EXPAND {
            return Err(EngineError::InvalidArgument("derivation stream limit exceeded"));
        }
        // HKDF-Expand output is prefix-stable, so re-expanding to the new
        // offset yields the same earlier bytes.
        let mut expanded = Zeroizing::new(vec![0u8; end]);
        stream
            .hkdf
            .expand(&stream.label, &mut expanded)
            .map_err(|_| EngineError::InvalidArgument("derivation expand failed"))?;
        output.copy_from_slice(&expanded[stream.offset..]);
        stream.offset = end;
        Ok(())
    }

    fn derivation_import_key(
        &mut self,
        op: &mut Self::DerivationOp,
        key: KeyHandle,
        kind: u32,
        bits: usize,
    ) -> Result<()> {
        if bits == 0 || bits % 8 != 0 {
            return Err(EngineError::InvalidArgument("key size must be a multiple of 8"));
        }
        let mut material = Zeroizing::new(vec![0u8; bits / 8]);
        self.derivation_read(op, &mut material)?;
        let entry = self.entry_mut(key)?;
        if entry.occupied() {
            return Err(EngineError::BadState);
        }
        entry.key_type = kind;
        entry.bits = bits;
        entry.material = material;
        Ok(())
    }

    fn derivation_abort(&mut self, op: &mut Self::DerivationOp) -> Result<()> {
        op.stream = None;
        Ok(())
    }

    fn derive(
        &mut self,
        op: &mut Self::DerivationOp,
        key: KeyHandle,
        alg_id: u32,
        salt: &[u8],
        label: &[u8],
        capacity: u64,
    ) -> Result<()> {
        if alg_id != alg::HKDF_SHA_256 {
            return Err(EngineError::NotSupported);
        }
        if op.stream.is_some() {
            return Err(EngineError::BadState);
        }
        let entry = self.entry(key)?;
        if !entry.occupied() {
            return Err(EngineError::BadState);
        }
        let salt = if salt.is_empty() { None } else { Some(salt) };
        op.stream = Some(DerivationStream {
            hkdf: Hkdf::<Sha256>::new(salt, &entry.material),
            label: label.to_vec(),
            offset: 0,
            capacity,
        });
        Ok(())
    }

    fn key_agreement(
        &mut self,
        _op: &mut Self::DerivationOp,
        _key: KeyHandle,
        _peer_key: &[u8],
        _alg: u32,
    ) -> Result<()> {
        Err(EngineError::NotSupported)
    }

    fn generate_random(&mut self, output: &mut [u8]) -> Result<()> {
        self.require_init()?;
        OsRng.fill_bytes(output);
        Ok(())
    }

    fn inject_entropy(&mut self, seed: &[u8]) -> Result<()> {
        if self.initialized || self.entropy_seeded {
            return Err(EngineError::BadState);
        }
        if seed.len() > ENTROPY_SEED_LIMIT {
            return Err(EngineError::InvalidArgument("entropy seed too large"));
        }
        self.entropy_seeded = true;
        Ok(())
    }

    fn entropy_seed_limit(&self) -> usize {
        ENTROPY_SEED_LIMIT
    }
}
