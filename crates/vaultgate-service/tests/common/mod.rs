//! Shared fixtures: a counting engine wrapper and request builders.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use vaultgate_engine::software::{
    SoftwareCipherOp, SoftwareDerivationOp, SoftwareHashOp, SoftwareMacOp,
};
use vaultgate_engine::{
    CryptoEngine, EngineError, KeyHandle, KeyInfo, KeyPolicy, SoftwareEngine,
};
use vaultgate_proto::{CryptoRequest, HashOp, KeyOp, KeyRequest, MacOp, PARAM_COUNT};

type Result<T> = std::result::Result<T, EngineError>;

/// Counters the test body can inspect while the dispatcher owns the engine.
#[derive(Clone, Default)]
pub struct EngineProbe {
    key_ops: Rc<Cell<usize>>,
    hash_updates: Rc<RefCell<Vec<usize>>>,
}

impl EngineProbe {
    /// Engine calls that took a caller-supplied key handle.
    pub fn key_ops(&self) -> usize {
        self.key_ops.get()
    }

    /// Sizes of the chunks fed to `hash_update`, in order.
    pub fn hash_update_sizes(&self) -> Vec<usize> {
        self.hash_updates.borrow().clone()
    }

    fn count_key_op(&self) {
        self.key_ops.set(self.key_ops.get() + 1);
    }
}

/// Software engine instrumented with an [`EngineProbe`].
pub struct CountingEngine {
    inner: SoftwareEngine,
    probe: EngineProbe,
}

impl CountingEngine {
    pub fn new() -> (Self, EngineProbe) {
        let probe = EngineProbe::default();
        (Self { inner: SoftwareEngine::new(), probe: probe.clone() }, probe)
    }
}

impl CryptoEngine for CountingEngine {
    type HashOp = SoftwareHashOp;
    type MacOp = SoftwareMacOp;
    type CipherOp = SoftwareCipherOp;
    type DerivationOp = SoftwareDerivationOp;

    fn init(&mut self) -> Result<()> {
        self.inner.init()
    }

    fn free(&mut self) {
        self.inner.free();
    }

    fn new_hash(&mut self) -> Result<Self::HashOp> {
        self.inner.new_hash()
    }

    fn new_mac(&mut self) -> Result<Self::MacOp> {
        self.inner.new_mac()
    }

    fn new_cipher(&mut self) -> Result<Self::CipherOp> {
        self.inner.new_cipher()
    }

    fn new_derivation(&mut self) -> Result<Self::DerivationOp> {
        self.inner.new_derivation()
    }

    fn hash_setup(&mut self, op: &mut Self::HashOp, alg: u32) -> Result<()> {
        self.inner.hash_setup(op, alg)
    }

    fn hash_update(&mut self, op: &mut Self::HashOp, input: &[u8]) -> Result<()> {
        self.probe.hash_updates.borrow_mut().push(input.len());
        self.inner.hash_update(op, input)
    }

    fn hash_finish(&mut self, op: &mut Self::HashOp, digest: &mut [u8]) -> Result<usize> {
        self.inner.hash_finish(op, digest)
    }

    fn hash_verify(&mut self, op: &mut Self::HashOp, expected: &[u8]) -> Result<()> {
        self.inner.hash_verify(op, expected)
    }

    fn hash_abort(&mut self, op: &mut Self::HashOp) -> Result<()> {
        self.inner.hash_abort(op)
    }

    fn hash_clone(&mut self, source: &Self::HashOp, target: &mut Self::HashOp) -> Result<()> {
        self.inner.hash_clone(source, target)
    }

    fn mac_sign_setup(&mut self, op: &mut Self::MacOp, key: KeyHandle, alg: u32) -> Result<()> {
        self.probe.count_key_op();
        self.inner.mac_sign_setup(op, key, alg)
    }

    fn mac_verify_setup(&mut self, op: &mut Self::MacOp, key: KeyHandle, alg: u32) -> Result<()> {
        self.probe.count_key_op();
        self.inner.mac_verify_setup(op, key, alg)
    }

    fn mac_update(&mut self, op: &mut Self::MacOp, input: &[u8]) -> Result<()> {
        self.inner.mac_update(op, input)
    }

    fn mac_sign_finish(&mut self, op: &mut Self::MacOp, mac: &mut [u8]) -> Result<usize> {
        self.inner.mac_sign_finish(op, mac)
    }

    fn mac_verify_finish(&mut self, op: &mut Self::MacOp, expected: &[u8]) -> Result<()> {
        self.inner.mac_verify_finish(op, expected)
    }

    fn mac_abort(&mut self, op: &mut Self::MacOp) -> Result<()> {
        self.inner.mac_abort(op)
    }

    fn cipher_encrypt_setup(
        &mut self,
        op: &mut Self::CipherOp,
        key: KeyHandle,
        alg: u32,
    ) -> Result<()> {
        self.probe.count_key_op();
        self.inner.cipher_encrypt_setup(op, key, alg)
    }

    fn cipher_decrypt_setup(
        &mut self,
        op: &mut Self::CipherOp,
        key: KeyHandle,
        alg: u32,
    ) -> Result<()> {
        self.probe.count_key_op();
        self.inner.cipher_decrypt_setup(op, key, alg)
    }

    fn cipher_generate_iv(&mut self, op: &mut Self::CipherOp, iv: &mut [u8]) -> Result<usize> {
        self.inner.cipher_generate_iv(op, iv)
    }

    fn cipher_set_iv(&mut self, op: &mut Self::CipherOp, iv: &[u8]) -> Result<()> {
        self.inner.cipher_set_iv(op, iv)
    }

    fn cipher_update(
        &mut self,
        op: &mut Self::CipherOp,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize> {
        self.inner.cipher_update(op, input, output)
    }

    fn cipher_finish(&mut self, op: &mut Self::CipherOp, output: &mut [u8]) -> Result<usize> {
        self.inner.cipher_finish(op, output)
    }

    fn cipher_abort(&mut self, op: &mut Self::CipherOp) -> Result<()> {
        self.inner.cipher_abort(op)
    }

    fn asymmetric_sign(
        &mut self,
        key: KeyHandle,
        alg: u32,
        hash: &[u8],
        signature: &mut [u8],
    ) -> Result<usize> {
        self.probe.count_key_op();
        self.inner.asymmetric_sign(key, alg, hash, signature)
    }

    fn asymmetric_verify(
        &mut self,
        key: KeyHandle,
        alg: u32,
        hash: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        self.probe.count_key_op();
        self.inner.asymmetric_verify(key, alg, hash, signature)
    }

    fn asymmetric_encrypt(
        &mut self,
        key: KeyHandle,
        alg: u32,
        input: &[u8],
        salt: &[u8],
        output: &mut [u8],
    ) -> Result<usize> {
        self.probe.count_key_op();
        self.inner.asymmetric_encrypt(key, alg, input, salt, output)
    }

    fn asymmetric_decrypt(
        &mut self,
        key: KeyHandle,
        alg: u32,
        input: &[u8],
        salt: &[u8],
        output: &mut [u8],
    ) -> Result<usize> {
        self.probe.count_key_op();
        self.inner.asymmetric_decrypt(key, alg, input, salt, output)
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
        self.probe.count_key_op();
        self.inner.aead_encrypt(key, alg, nonce, additional, input, output)
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
        self.probe.count_key_op();
        self.inner.aead_decrypt(key, alg, nonce, additional, input, output)
    }

    fn allocate_key(&mut self) -> Result<KeyHandle> {
        self.inner.allocate_key()
    }

    fn create_key(&mut self, lifetime: u32, id: u64) -> Result<KeyHandle> {
        self.inner.create_key(lifetime, id)
    }

    fn open_key(&mut self, lifetime: u32, id: u64) -> Result<KeyHandle> {
        self.inner.open_key(lifetime, id)
    }

    fn close_key(&mut self, key: KeyHandle) -> Result<()> {
        self.probe.count_key_op();
        self.inner.close_key(key)
    }

    fn destroy_key(&mut self, key: KeyHandle) -> Result<()> {
        self.probe.count_key_op();
        self.inner.destroy_key(key)
    }

    fn import_key(&mut self, key: KeyHandle, key_type: u32, data: &[u8]) -> Result<()> {
        self.probe.count_key_op();
        self.inner.import_key(key, key_type, data)
    }

    fn export_key(&mut self, key: KeyHandle, output: &mut [u8]) -> Result<usize> {
        self.probe.count_key_op();
        self.inner.export_key(key, output)
    }

    fn export_public_key(&mut self, key: KeyHandle, output: &mut [u8]) -> Result<usize> {
        self.probe.count_key_op();
        self.inner.export_public_key(key, output)
    }

    fn generate_key(
        &mut self,
        key: KeyHandle,
        key_type: u32,
        bits: usize,
        params: &[u8],
    ) -> Result<()> {
        self.probe.count_key_op();
        self.inner.generate_key(key, key_type, bits, params)
    }

    fn set_key_policy(&mut self, key: KeyHandle, policy: KeyPolicy) -> Result<()> {
        self.probe.count_key_op();
        self.inner.set_key_policy(key, policy)
    }

    fn get_key_policy(&mut self, key: KeyHandle) -> Result<KeyPolicy> {
        self.probe.count_key_op();
        self.inner.get_key_policy(key)
    }

    fn get_key_lifetime(&mut self, key: KeyHandle) -> Result<u32> {
        self.probe.count_key_op();
        self.inner.get_key_lifetime(key)
    }

    fn get_key_info(&mut self, key: KeyHandle) -> Result<KeyInfo> {
        self.probe.count_key_op();
        self.inner.get_key_info(key)
    }

    fn derivation_capacity(&mut self, op: &Self::DerivationOp) -> Result<u64> {
        self.inner.derivation_capacity(op)
    }

    fn derivation_read(&mut self, op: &mut Self::DerivationOp, output: &mut [u8]) -> Result<()> {
        self.inner.derivation_read(op, output)
    }

    fn derivation_import_key(
        &mut self,
        op: &mut Self::DerivationOp,
        key: KeyHandle,
        key_type: u32,
        bits: usize,
    ) -> Result<()> {
        self.probe.count_key_op();
        self.inner.derivation_import_key(op, key, key_type, bits)
    }

    fn derivation_abort(&mut self, op: &mut Self::DerivationOp) -> Result<()> {
        self.inner.derivation_abort(op)
    }

    fn derive(
        &mut self,
        op: &mut Self::DerivationOp,
        key: KeyHandle,
        alg: u32,
        salt: &[u8],
        label: &[u8],
        capacity: u64,
    ) -> Result<()> {
        self.probe.count_key_op();
        self.inner.derive(op, key, alg, salt, label, capacity)
    }

    fn key_agreement(
        &mut self,
        op: &mut Self::DerivationOp,
        key: KeyHandle,
        peer_key: &[u8],
        alg: u32,
    ) -> Result<()> {
        self.probe.count_key_op();
        self.inner.key_agreement(op, key, peer_key, alg)
    }

    fn generate_random(&mut self, output: &mut [u8]) -> Result<()> {
        self.inner.generate_random(output)
    }

    fn inject_entropy(&mut self, seed: &[u8]) -> Result<()> {
        self.inner.inject_entropy(seed)
    }

    fn entropy_seed_limit(&self) -> usize {
        self.inner.entropy_seed_limit()
    }
}

/// Encode a hash/MAC/cipher request header.
pub fn crypto_header(op: u16, alg: u32, handle: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    CryptoRequest { op, alg, handle }.encode(&mut buf);
    buf
}

pub fn hash_header(op: HashOp, alg: u32) -> Vec<u8> {
    crypto_header(op.as_u16(), alg, 0)
}

pub fn mac_header(op: MacOp, alg: u32, handle: u32) -> Vec<u8> {
    crypto_header(op.as_u16(), alg, handle)
}

/// Encode a key lifecycle request header.
pub fn key_header(op: KeyOp, handle: u32, lifetime: u32, key_type: u32, bits: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    KeyRequest { op: op.as_u16(), handle, lifetime, key_type, bits }.encode(&mut buf);
    buf
}

pub fn no_params() -> [Vec<u8>; PARAM_COUNT] {
    std::array::from_fn(|_| Vec::new())
}

pub fn params(p0: Vec<u8>, p1: Vec<u8>) -> [Vec<u8>; PARAM_COUNT] {
    [p0, p1, Vec::new(), Vec::new()]
}
