//! Key derivation and agreement service.

use vaultgate_engine::{CryptoEngine, KeyHandle};
use vaultgate_proto::{DerivationOp, DerivationRequest, Message, ProtocolError, Status};

use crate::channel::SecureChannel;
use crate::context::OpContext;
use crate::dispatch::Dispatcher;
use crate::error::{CallResult, ServiceError};
use crate::services::check_permitted;
use crate::{fatal, transfer};

impl<C: SecureChannel, E: CryptoEngine> Dispatcher<C, E> {
    pub(crate) fn call_derivation(&mut self, msg: &Message) -> CallResult {
        let Self { channel, engine, contexts, registry, .. } = self;
        let header = transfer::read_param(channel, msg, 0)?;
        let req = DerivationRequest::decode(&header)?;
        let op = DerivationOp::from_u16(req.op)
            .ok_or_else(|| ServiceError::refused(Status::NotSupported))?;

        let Some(OpContext::Derivation(context)) = contexts.get_mut(msg.channel) else {
            fatal::protocol_violation("derivation call without a derivation context");
        };

        match op {
            DerivationOp::GetCapacity => {
                if msg.out_sizes[0] < size_of::<u64>() {
                    return Err(ServiceError::refused(Status::InvalidArgument));
                }
                let capacity = engine.derivation_capacity(context)?;
                channel.write(msg.channel, 0, &capacity.to_le_bytes());
            },
            DerivationOp::Read => {
                let mut scratch = transfer::alloc_scratch(msg.out_sizes[0])?;
                engine.derivation_read(context, &mut scratch)?;
                channel.write(msg.channel, 0, &scratch);
            },
            DerivationOp::ImportKey => {
                let handle = KeyHandle(req.handle);
                check_permitted(registry, handle, msg.caller)?;
                // Parameter 1 carries the target key type and size.
                let raw = transfer::read_param(channel, msg, 1)?;
                let bytes: [u8; 12] = raw.as_slice().try_into().map_err(|_| {
                    ProtocolError::ParameterLength {
                        what: "derivation key shape",
                        declared: 12,
                        actual: raw.len(),
                    }
                })?;
                let key_type = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                let bits = u64::from_le_bytes([
                    bytes[4], bytes[5], bytes[6], bytes[7], bytes[8], bytes[9], bytes[10],
                    bytes[11],
                ]);
                let bits = usize::try_from(bits)
                    .map_err(|_| ServiceError::refused(Status::InvalidArgument))?;
                engine.derivation_import_key(context, handle, key_type, bits)?;
            },
            DerivationOp::Abort => engine.derivation_abort(context)?,
            DerivationOp::Derive => {
                let handle = KeyHandle(req.handle);
                check_permitted(registry, handle, msg.caller)?;
                let salt = transfer::read_param(channel, msg, 1)?;
                let label = transfer::read_param(channel, msg, 2)?;
                engine.derive(context, handle, req.alg, &salt, &label, req.capacity)?;
            },
            DerivationOp::Agree => {
                let handle = KeyHandle(req.handle);
                check_permitted(registry, handle, msg.caller)?;
                let peer_key = transfer::read_param(channel, msg, 1)?;
                engine.key_agreement(context, handle, &peer_key, req.alg)?;
            },
        }
        Ok(())
    }
}
