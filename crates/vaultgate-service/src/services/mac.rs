//! Multi-part MAC service.

use vaultgate_engine::{CryptoEngine, KeyHandle};
use vaultgate_proto::{CryptoRequest, MacOp, Message, Status};

use crate::channel::SecureChannel;
use crate::context::OpContext;
use crate::dispatch::Dispatcher;
use crate::error::{CallResult, ServiceError};
use crate::services::check_permitted;
use crate::{fatal, transfer};

impl<C: SecureChannel, E: CryptoEngine> Dispatcher<C, E> {
    pub(crate) fn call_mac(&mut self, msg: &Message) -> CallResult {
        let Self { channel, engine, contexts, registry, config, .. } = self;
        let header = transfer::read_param(channel, msg, 0)?;
        let req = CryptoRequest::decode(&header)?;
        let op =
            MacOp::from_u16(req.op).ok_or_else(|| ServiceError::refused(Status::NotSupported))?;

        let Some(OpContext::Mac(context)) = contexts.get_mut(msg.channel) else {
            fatal::protocol_violation("mac call without a mac context");
        };

        match op {
            MacOp::SignSetup | MacOp::VerifySetup => {
                let handle = KeyHandle(req.handle);
                check_permitted(registry, handle, msg.caller)?;
                if op == MacOp::SignSetup {
                    engine.mac_sign_setup(context, handle, req.alg)?;
                } else {
                    engine.mac_verify_setup(context, handle, req.alg)?;
                }
            },
            MacOp::Update => {
                transfer::read_chunked(channel, msg, 1, config.chunk_size, |chunk| {
                    engine.mac_update(context, chunk)
                })?;
            },
            MacOp::SignFinish => {
                let mut scratch = transfer::alloc_scratch(msg.out_sizes[0])?;
                let len = engine.mac_sign_finish(context, &mut scratch)?;
                channel.write(msg.channel, 0, &scratch[..len]);
                transfer::write_len(channel, msg, 1, len);
            },
            MacOp::VerifyFinish => {
                let expected = transfer::read_param(channel, msg, 1)?;
                engine.mac_verify_finish(context, &expected)?;
            },
            MacOp::Abort => engine.mac_abort(context)?,
        }
        Ok(())
    }
}
