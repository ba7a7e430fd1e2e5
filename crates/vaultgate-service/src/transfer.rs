//! Bounded-memory parameter transfer.
//!
//! Callers may hand the service arbitrarily large inputs; the service never
//! buffers more than one chunk of them at a time. A short read relative to
//! the declared length means the caller or transport lied about the transfer
//! and is a fatal protocol violation, not an error status.

use vaultgate_engine::EngineError;
use vaultgate_proto::{Message, Status};

use crate::channel::SecureChannel;
use crate::error::{CallResult, ServiceError};
use crate::fatal;

/// Allocate a zeroed scratch buffer, refusing on allocation failure.
pub(crate) fn alloc_scratch(len: usize) -> Result<Vec<u8>, ServiceError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| ServiceError::refused(Status::InsufficientMemory))?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Stream input parameter `param` through `sink` in bounded chunks.
///
/// Reads `min(remaining, chunk_size)` bytes per iteration into a single
/// scratch buffer and feeds each chunk to the sink in order. A sink failure
/// stops the transfer immediately; chunks already consumed are not undone.
/// A declared length of zero invokes the sink zero times and succeeds.
pub(crate) fn read_chunked<C: SecureChannel>(
    channel: &mut C,
    msg: &Message,
    param: usize,
    chunk_size: usize,
    mut sink: impl FnMut(&[u8]) -> Result<(), EngineError>,
) -> CallResult {
    let mut remaining = msg.in_sizes[param];
    if remaining == 0 {
        return Ok(());
    }

    let mut scratch = alloc_scratch(remaining.min(chunk_size))?;
    while remaining > 0 {
        let want = remaining.min(chunk_size);
        let got = channel.read(msg.channel, param, &mut scratch[..want]);
        if got != want {
            fatal::protocol_violation("input shorter than its declared length");
        }
        sink(&scratch[..got])?;
        remaining -= got;
    }
    Ok(())
}

/// Read input parameter `param` in full, returning its bytes.
///
/// For fixed-size and header parameters that are consumed whole. The same
/// short-read rule as [`read_chunked`] applies.
pub(crate) fn read_param<C: SecureChannel>(
    channel: &mut C,
    msg: &Message,
    param: usize,
) -> Result<Vec<u8>, ServiceError> {
    let declared = msg.in_sizes[param];
    let mut buf = alloc_scratch(declared)?;
    let got = channel.read(msg.channel, param, &mut buf);
    if got != declared {
        fatal::protocol_violation("input shorter than its declared length");
    }
    Ok(buf)
}

/// Write a length result to output parameter `param` if its capacity allows.
///
/// Lengths travel as little-endian `u64`. Callers that declared no capacity
/// for the length simply do not receive it.
pub(crate) fn write_len<C: SecureChannel>(channel: &mut C, msg: &Message, param: usize, len: usize) {
    if msg.out_sizes[param] >= size_of::<u64>() {
        channel.write(msg.channel, param, &(len as u64).to_le_bytes());
    }
}
