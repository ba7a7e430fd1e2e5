//! Multi-part symmetric cipher service.

use vaultgate_engine::{CryptoEngine, KeyHandle};
use vaultgate_proto::{CipherOp, CryptoRequest, Message, Status};

use crate::channel::SecureChannel;
use crate::context::OpContext;
use crate::dispatch::Dispatcher;
use crate::error::{CallResult, ServiceError};
use crate::services::check_permitted;
use crate::{fatal, transfer};

impl<C: SecureChannel, E: CryptoEngine> Dispatcher<C, E> {
    pub(crate) fn call_cipher(&mut self, msg: &Message) -> CallResult {
        let Self { channel, engine, contexts, registry, .. } = self;
        let header = transfer::read_param(channel, msg, 0)?;
        let req = CryptoRequest::decode(&header)?;
        let op = CipherOp::from_u16(req.op)
            .ok_or_else(|| ServiceError::refused(Status::NotSupported))?;

        let Some(OpContext::Cipher(context)) = contexts.get_mut(msg.channel) else {
            fatal::protocol_violation("cipher call without a cipher context");
        };

        match op {
            CipherOp::EncryptSetup | CipherOp::DecryptSetup => {
                let handle = KeyHandle(req.handle);
                check_permitted(registry, handle, msg.caller)?;
                if op == CipherOp::EncryptSetup {
                    engine.cipher_encrypt_setup(context, handle, req.alg)?;
                } else {
                    engine.cipher_decrypt_setup(context, handle, req.alg)?;
                }
            },
            CipherOp::GenerateIv => {
                let mut scratch = transfer::alloc_scratch(msg.out_sizes[0])?;
                let len = engine.cipher_generate_iv(context, &mut scratch)?;
                channel.write(msg.channel, 0, &scratch[..len]);
                transfer::write_len(channel, msg, 1, len);
            },
            CipherOp::SetIv => {
                let iv = transfer::read_param(channel, msg, 1)?;
                engine.cipher_set_iv(context, &iv)?;
            },
            CipherOp::Update => {
                let input = transfer::read_param(channel, msg, 1)?;
                let mut scratch = transfer::alloc_scratch(msg.out_sizes[0])?;
                let len = engine.cipher_update(context, &input, &mut scratch)?;
                channel.write(msg.channel, 0, &scratch[..len]);
                transfer::write_len(channel, msg, 1, len);
            },
            CipherOp::Finish => {
                let mut scratch = transfer::alloc_scratch(msg.out_sizes[0])?;
                let len = engine.cipher_finish(context, &mut scratch)?;
                channel.write(msg.channel, 0, &scratch[..len]);
                transfer::write_len(channel, msg, 1, len);
            },
            CipherOp::Abort => engine.cipher_abort(context)?,
        }
        Ok(())
    }
}
