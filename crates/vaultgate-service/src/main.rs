//! Vaultgate service binary.
//!
//! Runs the dispatcher over the in-process loopback channel with the
//! software engine and walks one caller through the subsystem lifecycle and
//! a chunked hash, logging the replies. A real deployment supplies its own
//! [`SecureChannel`](vaultgate_service::SecureChannel) implementation for the
//! platform's isolation boundary.
//!
//! # Usage
//!
//! ```bash
//! vaultgate-service --chunk-size 400 --max-hash-clones 2 --log-level debug
//! ```

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vaultgate_engine::{SoftwareEngine, alg};
use vaultgate_proto::{CallerId, ChannelId, CryptoRequest, HashOp, PARAM_COUNT, ServiceKind};
use vaultgate_service::{Dispatcher, MemoryChannel, ServiceConfig};

/// Vaultgate crypto service broker
#[derive(Parser, Debug)]
#[command(name = "vaultgate-service")]
#[command(about = "Trusted-side crypto service broker (loopback demo)")]
#[command(version)]
struct Args {
    /// Upper bound on bytes buffered per chunked-transfer iteration
    #[arg(long, default_value = "400")]
    chunk_size: usize,

    /// Capacity of the hash clone slot pool
    #[arg(long, default_value = "2")]
    max_hash_clones: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn hash_header(op: HashOp, alg: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    CryptoRequest { op: op.as_u16(), alg, handle: 0 }.encode(&mut buf);
    buf
}

fn no_params() -> [Vec<u8>; PARAM_COUNT] {
    std::array::from_fn(|_| Vec::new())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("vaultgate service starting");

    let config =
        ServiceConfig { chunk_size: args.chunk_size, max_hash_clones: args.max_hash_clones };
    let mut dispatcher = Dispatcher::new(MemoryChannel::new(), SoftwareEngine::new(), config);

    let caller = CallerId(1);
    let init_conn = ChannelId(1);
    let hash_conn = ChannelId(2);
    let free_conn = ChannelId(3);

    // Bring the subsystem up.
    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::CryptoInit, init_conn, caller);
    channel.push_call(ServiceKind::CryptoInit, init_conn, caller, no_params(), [0; PARAM_COUNT]);
    channel.push_disconnect(ServiceKind::CryptoInit, init_conn, caller);
    dispatcher.run();

    // Hash a payload larger than one chunk.
    let payload: Vec<u8> = (0..1000u32).map(|i| i as u8).collect();
    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::Hash, hash_conn, caller);
    channel.push_call(
        ServiceKind::Hash,
        hash_conn,
        caller,
        [hash_header(HashOp::Setup, alg::SHA_256), Vec::new(), Vec::new(), Vec::new()],
        [0; PARAM_COUNT],
    );
    channel.push_call(
        ServiceKind::Hash,
        hash_conn,
        caller,
        [hash_header(HashOp::Update, 0), payload, Vec::new(), Vec::new()],
        [0; PARAM_COUNT],
    );
    channel.push_call(
        ServiceKind::Hash,
        hash_conn,
        caller,
        [hash_header(HashOp::Finish, 0), Vec::new(), Vec::new(), Vec::new()],
        [64, 8, 0, 0],
    );
    channel.push_disconnect(ServiceKind::Hash, hash_conn, caller);
    dispatcher.run();

    for completed in dispatcher.channel_mut().drain_completed() {
        if completed.channel == hash_conn && !completed.outputs[0].is_empty() {
            let digest: String =
                completed.outputs[0].iter().map(|byte| format!("{byte:02x}")).collect();
            tracing::info!(digest, "demo payload hashed");
        } else {
            tracing::debug!(channel = completed.channel.0, status = ?completed.status, "reply");
        }
    }

    // Release the subsystem.
    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::CryptoFree, free_conn, caller);
    channel.push_call(ServiceKind::CryptoFree, free_conn, caller, no_params(), [0; PARAM_COUNT]);
    channel.push_disconnect(ServiceKind::CryptoFree, free_conn, caller);
    dispatcher.run();

    tracing::info!("vaultgate service stopped");
    Ok(())
}
