//! One-shot AEAD service.

use vaultgate_engine::{CryptoEngine, KeyHandle};
use vaultgate_proto::{AeadOp, AeadRequest, Message, ProtocolError, Status};

use crate::channel::SecureChannel;
use crate::dispatch::Dispatcher;
use crate::error::{CallResult, ServiceError};
use crate::services::check_permitted;
use crate::transfer;

impl<C: SecureChannel, E: CryptoEngine> Dispatcher<C, E> {
    pub(crate) fn call_aead(&mut self, msg: &Message) -> CallResult {
        let Self { channel, engine, registry, .. } = self;
        let header = transfer::read_param(channel, msg, 0)?;
        let req = AeadRequest::decode(&header)?;
        let op =
            AeadOp::from_u16(req.op).ok_or_else(|| ServiceError::refused(Status::NotSupported))?;

        let handle = KeyHandle(req.handle);
        check_permitted(registry, handle, msg.caller)?;

        let nonce_len = usize::from(req.nonce_len);
        if nonce_len > AeadRequest::NONCE_CAPACITY {
            return Err(ServiceError::refused(Status::InvalidArgument));
        }
        let nonce = &req.nonce[..nonce_len];

        // Parameter 1 packs additional data then input, per the header.
        let packed = transfer::read_param(channel, msg, 1)?;
        let additional_len = req.additional_len as usize;
        let input_len = req.input_len as usize;
        if additional_len.checked_add(input_len) != Some(packed.len()) {
            return Err(ServiceError::Protocol(ProtocolError::ParameterLength {
                what: "aead payload",
                declared: additional_len.saturating_add(input_len),
                actual: packed.len(),
            }));
        }
        let (additional, input) = packed.split_at(additional_len);

        let mut scratch = transfer::alloc_scratch(msg.out_sizes[0])?;
        let len = match op {
            AeadOp::Encrypt => {
                engine.aead_encrypt(handle, req.alg, nonce, additional, input, &mut scratch)?
            },
            AeadOp::Decrypt => {
                engine.aead_decrypt(handle, req.alg, nonce, additional, input, &mut scratch)?
            },
        };
        channel.write(msg.channel, 0, &scratch[..len]);
        transfer::write_len(channel, msg, 1, len);
        Ok(())
    }
}
