//! Key lifecycle service.
//!
//! The custody rules live here: a handle is registered to its caller before
//! the reply that carries it, and unregistered only after the engine has
//! confirmed close or destroy. Any failure on the way leaves the registry
//! untouched, so a failed call can never orphan or leak a registration.

use vaultgate_engine::{CryptoEngine, KeyHandle, KeyPolicy};
use vaultgate_proto::{KeyOp, KeyRequest, Message, ProtocolError, Status};

use crate::channel::SecureChannel;
use crate::dispatch::Dispatcher;
use crate::error::{CallResult, ServiceError};
use crate::registry::assemble_key_id;
use crate::services::check_permitted;
use crate::transfer;

impl<C: SecureChannel, E: CryptoEngine> Dispatcher<C, E> {
    pub(crate) fn call_key_mng(&mut self, msg: &Message) -> CallResult {
        let Self { channel, engine, registry, .. } = self;
        let header = transfer::read_param(channel, msg, 0)?;
        let req = KeyRequest::decode(&header)?;
        let op =
            KeyOp::from_u16(req.op).ok_or_else(|| ServiceError::refused(Status::NotSupported))?;
        let handle = KeyHandle(req.handle);

        match op {
            KeyOp::Allocate => {
                if msg.out_sizes[0] < size_of::<u32>() {
                    return Err(ServiceError::refused(Status::InvalidArgument));
                }
                let new = engine.allocate_key()?;
                registry.register(new, msg.caller);
                channel.write(msg.channel, 0, &new.0.to_le_bytes());
            },
            KeyOp::Create | KeyOp::Open => {
                if msg.out_sizes[0] < size_of::<u32>() {
                    return Err(ServiceError::refused(Status::InvalidArgument));
                }
                let raw = transfer::read_param(channel, msg, 1)?;
                let bytes: [u8; 4] = raw.as_slice().try_into().map_err(|_| {
                    ProtocolError::ParameterLength {
                        what: "client key id",
                        declared: 4,
                        actual: raw.len(),
                    }
                })?;
                // The caller names keys in its own 32-bit namespace; the
                // engine sees the caller-qualified 64-bit id.
                let id = assemble_key_id(u32::from_le_bytes(bytes), msg.caller);
                let new = if op == KeyOp::Create {
                    engine.create_key(req.lifetime, id)?
                } else {
                    engine.open_key(req.lifetime, id)?
                };
                registry.register(new, msg.caller);
                channel.write(msg.channel, 0, &new.0.to_le_bytes());
            },
            KeyOp::Close => {
                check_permitted(registry, handle, msg.caller)?;
                engine.close_key(handle)?;
                registry.unregister(handle);
            },
            KeyOp::Destroy => {
                check_permitted(registry, handle, msg.caller)?;
                engine.destroy_key(handle)?;
                registry.unregister(handle);
            },
            KeyOp::GetLifetime => {
                check_permitted(registry, handle, msg.caller)?;
                if msg.out_sizes[0] < size_of::<u32>() {
                    return Err(ServiceError::refused(Status::InvalidArgument));
                }
                let lifetime = engine.get_key_lifetime(handle)?;
                channel.write(msg.channel, 0, &lifetime.to_le_bytes());
            },
            KeyOp::SetPolicy => {
                check_permitted(registry, handle, msg.caller)?;
                let raw = transfer::read_param(channel, msg, 1)?;
                let policy = KeyPolicy::from_bytes(&raw)?;
                engine.set_key_policy(handle, policy)?;
            },
            KeyOp::GetPolicy => {
                check_permitted(registry, handle, msg.caller)?;
                if msg.out_sizes[0] < KeyPolicy::SIZE {
                    return Err(ServiceError::refused(Status::InvalidArgument));
                }
                let policy = engine.get_key_policy(handle)?;
                channel.write(msg.channel, 0, &policy.to_bytes());
            },
            KeyOp::Import => {
                check_permitted(registry, handle, msg.caller)?;
                let data = transfer::read_param(channel, msg, 1)?;
                engine.import_key(handle, req.key_type, &data)?;
            },
            KeyOp::Generate => {
                check_permitted(registry, handle, msg.caller)?;
                let params = transfer::read_param(channel, msg, 1)?;
                engine.generate_key(handle, req.key_type, req.bits as usize, &params)?;
            },
            KeyOp::GetInfo => {
                // Type and bits outputs are written whenever their declared
                // capacities allow, including on a failure status.
                let result = if registry.is_permitted(handle, msg.caller) {
                    engine.get_key_info(handle).map_err(ServiceError::from)
                } else {
                    Err(ServiceError::refused(Status::InvalidHandle))
                };
                let info = result.clone().unwrap_or_default();
                if msg.out_sizes[0] >= size_of::<u32>() {
                    channel.write(msg.channel, 0, &info.key_type.to_le_bytes());
                }
                if msg.out_sizes[1] >= size_of::<u64>() {
                    channel.write(msg.channel, 1, &(info.bits as u64).to_le_bytes());
                }
                result?;
            },
            KeyOp::Export | KeyOp::ExportPublic => {
                check_permitted(registry, handle, msg.caller)?;
                let mut scratch = transfer::alloc_scratch(msg.out_sizes[0])?;
                let result = if op == KeyOp::Export {
                    engine.export_key(handle, &mut scratch)
                } else {
                    engine.export_public_key(handle, &mut scratch)
                };
                // Length is written even on failure, as zero.
                let len = *result.as_ref().unwrap_or(&0);
                channel.write(msg.channel, 0, &scratch[..len]);
                transfer::write_len(channel, msg, 1, len);
                result?;
            },
        }
        Ok(())
    }
}
