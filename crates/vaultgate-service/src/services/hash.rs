//! Multi-part hash service, including the two-connection clone handshake.

use vaultgate_engine::CryptoEngine;
use vaultgate_proto::{ChannelId, CryptoRequest, HashOp, Message, ProtocolError, Status};

use crate::channel::SecureChannel;
use crate::context::{ContextTable, OpContext};
use crate::dispatch::Dispatcher;
use crate::error::{CallResult, ServiceError};
use crate::{fatal, transfer};

/// Borrow the hash state of one connection. Hash calls only arrive on
/// connections that received a hash context on connect.
fn hash_state<E: CryptoEngine>(
    contexts: &mut ContextTable<E>,
    channel: ChannelId,
) -> &mut E::HashOp {
    match contexts.get_mut(channel) {
        Some(OpContext::Hash(context)) => context,
        _ => fatal::protocol_violation("hash call without a hash context"),
    }
}

impl<C: SecureChannel, E: CryptoEngine> Dispatcher<C, E> {
    pub(crate) fn call_hash(&mut self, msg: &Message) -> CallResult {
        let Self { channel, engine, contexts, clone_pool, config, .. } = self;
        let header = transfer::read_param(channel, msg, 0)?;
        let req = CryptoRequest::decode(&header)?;
        let op = HashOp::from_u16(req.op)
            .ok_or_else(|| ServiceError::refused(Status::NotSupported))?;

        match op {
            HashOp::Setup => {
                engine.hash_setup(hash_state(contexts, msg.channel), req.alg)?;
            },
            HashOp::Update => {
                let context = hash_state(contexts, msg.channel);
                transfer::read_chunked(channel, msg, 1, config.chunk_size, |chunk| {
                    engine.hash_update(context, chunk)
                })?;
            },
            HashOp::Finish => {
                // The state is finalized either way; pending clones of it die.
                clone_pool.release_all_for(msg.channel);
                let context = hash_state(contexts, msg.channel);
                let mut scratch = transfer::alloc_scratch(msg.out_sizes[0])?;
                let len = engine.hash_finish(context, &mut scratch)?;
                channel.write(msg.channel, 0, &scratch[..len]);
                transfer::write_len(channel, msg, 1, len);
            },
            HashOp::Verify => {
                clone_pool.release_all_for(msg.channel);
                let expected = transfer::read_param(channel, msg, 1)?;
                engine.hash_verify(hash_state(contexts, msg.channel), &expected)?;
            },
            HashOp::Abort => {
                clone_pool.release_all_for(msg.channel);
                engine.hash_abort(hash_state(contexts, msg.channel))?;
            },
            HashOp::CloneBegin => {
                if msg.out_sizes[0] < size_of::<u64>() {
                    return Err(ServiceError::refused(Status::InvalidArgument));
                }
                let index =
                    clone_pool.reserve(msg.caller, msg.channel).map_err(ServiceError::refused)?;
                channel.write(msg.channel, 0, &(index as u64).to_le_bytes());
            },
            HashOp::CloneEnd => {
                let raw = transfer::read_param(channel, msg, 1)?;
                let bytes: [u8; 8] = raw.as_slice().try_into().map_err(|_| {
                    ProtocolError::ParameterLength {
                        what: "clone slot index",
                        declared: 8,
                        actual: raw.len(),
                    }
                })?;
                let index = usize::try_from(u64::from_le_bytes(bytes))
                    .map_err(|_| ServiceError::refused(Status::InvalidArgument))?;
                let source =
                    clone_pool.resolve(index, msg.caller).map_err(ServiceError::refused)?;
                if source == msg.channel {
                    return Err(ServiceError::refused(Status::BadState));
                }
                let (Some(OpContext::Hash(src)), Some(OpContext::Hash(dst))) =
                    contexts.pair_mut(source, msg.channel)
                else {
                    fatal::protocol_violation("clone resolved to a missing hash context");
                };
                engine.hash_clone(src, dst)?;
            },
        }
        Ok(())
    }
}
