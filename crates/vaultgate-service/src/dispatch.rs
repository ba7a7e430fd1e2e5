//! The dispatch loop.
//!
//! One cooperative loop owns everything: the channel, the engine, the access
//! registry, the clone pool, the context table, and the subsystem reference
//! count. Handlers run to completion; the only blocking point is the wait for
//! the next signal. Exactly one reply is sent for every message obtained.

use vaultgate_engine::{CryptoEngine, EngineError};
use vaultgate_proto::{Message, MessageKind, ServiceKind, SignalSet, Status};

use crate::channel::SecureChannel;
use crate::clone_pool::HashClonePool;
use crate::context::{ContextTable, OpContext};
use crate::fatal;
use crate::registry::AccessRegistry;

/// Tunables for one dispatcher instance.
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    /// Upper bound on bytes buffered per chunked-transfer iteration.
    pub chunk_size: usize,
    /// Capacity of the hash clone slot pool.
    pub max_hash_clones: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { chunk_size: 400, max_hash_clones: 2 }
    }
}

/// The crypto service broker.
///
/// Generic over the transport and the engine; all shared state lives here
/// and is only touched from the dispatch thread.
pub struct Dispatcher<C: SecureChannel, E: CryptoEngine> {
    pub(crate) channel: C,
    pub(crate) engine: E,
    pub(crate) config: ServiceConfig,
    pub(crate) registry: AccessRegistry,
    pub(crate) clone_pool: HashClonePool,
    pub(crate) contexts: ContextTable<E>,
    pub(crate) init_count: u32,
}

impl<C: SecureChannel, E: CryptoEngine> Dispatcher<C, E> {
    /// Create a dispatcher over `channel` and `engine`.
    pub fn new(channel: C, engine: E, config: ServiceConfig) -> Self {
        Self {
            channel,
            engine,
            config,
            registry: AccessRegistry::new(),
            clone_pool: HashClonePool::new(config.max_hash_clones),
            contexts: ContextTable::new(),
            init_count: 0,
        }
    }

    /// Run until the channel shuts down (`wait` returns the empty set).
    pub fn run(&mut self) {
        tracing::info!(
            chunk_size = self.config.chunk_size,
            max_hash_clones = self.config.max_hash_clones,
            "dispatch loop started"
        );
        while self.poll_once() {}
        tracing::info!("dispatch loop stopped");
    }

    /// Wait for one round of signals and dispatch every asserted kind.
    ///
    /// Returns `false` when the channel reports shutdown.
    pub fn poll_once(&mut self) -> bool {
        let signals = self.channel.wait(SignalSet::all());
        if signals.is_empty() {
            return false;
        }
        for kind in ServiceKind::ALL {
            if !signals.contains(kind) {
                continue;
            }
            match self.channel.receive(kind) {
                Ok(message) => self.dispatch_message(kind, &message),
                // No message was obtained, so no reply is owed.
                Err(err) => tracing::warn!(?kind, %err, "receive failed, skipping kind"),
            }
        }
        true
    }

    /// Route one message to its handlers and send the single reply.
    pub fn dispatch_message(&mut self, kind: ServiceKind, msg: &Message) {
        let status = match msg.kind {
            MessageKind::Connect => {
                let status = self.on_connect(kind, msg);
                tracing::debug!(?kind, channel = msg.channel.0, ?status, "connect");
                status
            },
            MessageKind::Call => self.on_call(kind, msg),
            MessageKind::Disconnect => {
                self.on_disconnect(kind, msg);
                tracing::debug!(?kind, channel = msg.channel.0, "disconnect");
                Status::Success
            },
        };
        self.channel.reply(msg.channel, status);
    }

    fn on_connect(&mut self, kind: ServiceKind, msg: &Message) -> Status {
        match kind {
            ServiceKind::Hash => self.connect_with(msg, |e| e.new_hash().map(OpContext::Hash)),
            ServiceKind::Mac => self.connect_with(msg, |e| e.new_mac().map(OpContext::Mac)),
            ServiceKind::Symmetric => {
                self.connect_with(msg, |e| e.new_cipher().map(OpContext::Cipher))
            },
            ServiceKind::Derivation => {
                self.connect_with(msg, |e| e.new_derivation().map(OpContext::Derivation))
            },
            _ => Status::Success,
        }
    }

    fn connect_with(
        &mut self,
        msg: &Message,
        make: impl FnOnce(&mut E) -> Result<OpContext<E>, EngineError>,
    ) -> Status {
        match make(&mut self.engine) {
            Ok(context) => {
                self.contexts.insert(msg.channel, context);
                Status::Success
            },
            // Context allocation failed; refuse the connection.
            Err(_) => Status::InsufficientMemory,
        }
    }

    fn on_call(&mut self, kind: ServiceKind, msg: &Message) -> Status {
        let result = match kind {
            ServiceKind::CryptoInit => self.call_init(),
            ServiceKind::CryptoFree => self.call_free(),
            ServiceKind::Hash => self.call_hash(msg),
            ServiceKind::Mac => self.call_mac(msg),
            ServiceKind::Symmetric => self.call_cipher(msg),
            ServiceKind::Asymmetric => self.call_asymmetric(msg),
            ServiceKind::Aead => self.call_aead(msg),
            ServiceKind::KeyManagement => self.call_key_mng(msg),
            ServiceKind::Derivation => self.call_derivation(msg),
            ServiceKind::Rng => self.call_rng(msg),
            ServiceKind::EntropyInject => self.call_entropy(msg),
        };
        match result {
            Ok(()) => Status::Success,
            Err(err) => {
                let status = err.status();
                tracing::debug!(?kind, channel = msg.channel.0, %err, ?status, "call failed");
                status
            },
        }
    }

    fn on_disconnect(&mut self, kind: ServiceKind, msg: &Message) {
        match kind {
            ServiceKind::Hash => {
                // Pending clones of this source must not resolve afterwards.
                self.clone_pool.release_all_for(msg.channel);
                self.teardown_context(msg);
            },
            ServiceKind::Mac | ServiceKind::Symmetric | ServiceKind::Derivation => {
                self.teardown_context(msg);
            },
            _ => {},
        }
    }

    fn teardown_context(&mut self, msg: &Message) {
        let Some(mut context) = self.contexts.remove(msg.channel) else {
            fatal::protocol_violation("disconnect for a connection with no context");
        };
        let result = match &mut context {
            OpContext::Hash(op) => self.engine.hash_abort(op),
            OpContext::Mac(op) => self.engine.mac_abort(op),
            OpContext::Cipher(op) => self.engine.cipher_abort(op),
            OpContext::Derivation(op) => self.engine.derivation_abort(op),
        };
        if let Err(err) = result {
            tracing::warn!(channel = msg.channel.0, %err, "abort on disconnect failed");
        }
    }

    /// The underlying channel, for queueing and inspecting loopback traffic.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// The underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Number of live operation contexts.
    pub fn active_contexts(&self) -> usize {
        self.contexts.len()
    }

    /// Number of live hash clone slots.
    pub fn live_clone_slots(&self) -> usize {
        self.clone_pool.live()
    }

    /// Number of registered key handles.
    pub fn registered_handles(&self) -> usize {
        self.registry.len()
    }
}
