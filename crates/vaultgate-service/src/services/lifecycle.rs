//! Crypto subsystem init and free.
//!
//! Multiple callers may depend on the subsystem at once; the dispatcher
//! reference-counts them. The engine is initialized on the 0 to 1 transition
//! and torn down, together with the clone pool and the registry, on 1 to 0.

use vaultgate_engine::CryptoEngine;
use vaultgate_proto::Status;

use crate::channel::SecureChannel;
use crate::dispatch::Dispatcher;
use crate::error::{CallResult, ServiceError};

impl<C: SecureChannel, E: CryptoEngine> Dispatcher<C, E> {
    pub(crate) fn call_init(&mut self) -> CallResult {
        if self.init_count == 0 {
            self.engine.init()?;
            self.clone_pool.clear();
            self.registry.clear();
            tracing::debug!("crypto subsystem initialized");
        }
        self.init_count += 1;
        Ok(())
    }

    pub(crate) fn call_free(&mut self) -> CallResult {
        if self.init_count == 0 {
            return Err(ServiceError::refused(Status::BadState));
        }
        self.init_count -= 1;
        if self.init_count == 0 {
            self.engine.free();
            self.clone_pool.clear();
            self.registry.clear();
            tracing::debug!("crypto subsystem freed");
        }
        Ok(())
    }
}
