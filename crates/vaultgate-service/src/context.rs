//! Per-connection operation contexts.
//!
//! Multi-part operations carry engine state between calls. That state never
//! crosses the boundary: the broker keys it by connection in this table,
//! creates it on connect, hands it to the engine on every call, and destroys
//! it on disconnect. No context is ever shared across connections; the one
//! sanctioned interaction between two contexts is the hash clone, mediated by
//! the clone slot pool.

use std::collections::HashMap;

use vaultgate_engine::CryptoEngine;
use vaultgate_proto::ChannelId;

/// Engine state owned by one connection.
pub enum OpContext<E: CryptoEngine> {
    /// Multi-part hash state.
    Hash(E::HashOp),
    /// Multi-part MAC state.
    Mac(E::MacOp),
    /// Multi-part cipher state.
    Cipher(E::CipherOp),
    /// Key derivation state.
    Derivation(E::DerivationOp),
}

/// Contexts of all live connections, keyed by connection.
pub struct ContextTable<E: CryptoEngine> {
    entries: HashMap<ChannelId, OpContext<E>>,
}

impl<E: CryptoEngine> ContextTable<E> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Attach a context to a connection.
    pub fn insert(&mut self, channel: ChannelId, context: OpContext<E>) {
        self.entries.insert(channel, context);
    }

    /// Detach and return a connection's context.
    pub fn remove(&mut self, channel: ChannelId) -> Option<OpContext<E>> {
        self.entries.remove(&channel)
    }

    /// Borrow a connection's context.
    pub fn get_mut(&mut self, channel: ChannelId) -> Option<&mut OpContext<E>> {
        self.entries.get_mut(&channel)
    }

    /// Borrow two distinct connections' contexts at once.
    ///
    /// Callers must ensure `a != b`.
    pub fn pair_mut(
        &mut self,
        a: ChannelId,
        b: ChannelId,
    ) -> (Option<&mut OpContext<E>>, Option<&mut OpContext<E>>) {
        let [first, second] = self.entries.get_disjoint_mut([&a, &b]);
        (first, second)
    }

    /// Number of live contexts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no contexts are live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: CryptoEngine> Default for ContextTable<E> {
    fn default() -> Self {
        Self::new()
    }
}
