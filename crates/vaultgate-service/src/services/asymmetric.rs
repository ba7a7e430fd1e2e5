//! One-shot asymmetric service.
//!
//! Sign, verify, encrypt, and decrypt carry no per-connection state. Encrypt
//! and decrypt always write the length output, zero on failure, so callers
//! with a stale status still see a coherent length.

use vaultgate_engine::{CryptoEngine, KeyHandle};
use vaultgate_proto::{AsymOp, AsymRequest, Message, ProtocolError, Status};

use crate::channel::SecureChannel;
use crate::dispatch::Dispatcher;
use crate::error::{CallResult, ServiceError};
use crate::services::check_permitted;
use crate::transfer;

impl<C: SecureChannel, E: CryptoEngine> Dispatcher<C, E> {
    pub(crate) fn call_asymmetric(&mut self, msg: &Message) -> CallResult {
        let Self { channel, engine, registry, .. } = self;
        let header = transfer::read_param(channel, msg, 0)?;
        let req = AsymRequest::decode(&header)?;
        let op =
            AsymOp::from_u16(req.op).ok_or_else(|| ServiceError::refused(Status::NotSupported))?;

        let handle = KeyHandle(req.handle);
        check_permitted(registry, handle, msg.caller)?;

        match op {
            AsymOp::Sign => {
                let hash = transfer::read_param(channel, msg, 1)?;
                let mut scratch = transfer::alloc_scratch(msg.out_sizes[0])?;
                let result = engine.asymmetric_sign(handle, req.alg, &hash, &mut scratch);
                let len = *result.as_ref().unwrap_or(&0);
                channel.write(msg.channel, 0, &scratch[..len]);
                transfer::write_len(channel, msg, 1, len);
                result?;
            },
            AsymOp::Verify => {
                let hash = transfer::read_param(channel, msg, 1)?;
                let signature = transfer::read_param(channel, msg, 2)?;
                engine.asymmetric_verify(handle, req.alg, &hash, &signature)?;
            },
            AsymOp::Encrypt | AsymOp::Decrypt => {
                let packed = transfer::read_param(channel, msg, 1)?;
                let input_len = req.input_len as usize;
                let salt_len = req.salt_len as usize;
                if input_len.checked_add(salt_len) != Some(packed.len()) {
                    return Err(ServiceError::Protocol(ProtocolError::ParameterLength {
                        what: "asymmetric payload",
                        declared: input_len.saturating_add(salt_len),
                        actual: packed.len(),
                    }));
                }
                let (input, salt) = packed.split_at(input_len);
                let mut scratch = transfer::alloc_scratch(msg.out_sizes[0])?;
                let result = if op == AsymOp::Encrypt {
                    engine.asymmetric_encrypt(handle, req.alg, input, salt, &mut scratch)
                } else {
                    engine.asymmetric_decrypt(handle, req.alg, input, salt, &mut scratch)
                };
                let len = *result.as_ref().unwrap_or(&0);
                channel.write(msg.channel, 0, &scratch[..len]);
                transfer::write_len(channel, msg, 1, len);
                result?;
            },
        }
        Ok(())
    }
}
