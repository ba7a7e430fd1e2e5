//! The inter-partition transport seam.
//!
//! [`SecureChannel`] is the broker's view of the isolation boundary: signal
//! wait, message receive, bounded parameter reads and writes, and a single
//! reply per message. The trait says nothing about the wire encoding of the
//! transport itself; that belongs to the platform underneath.
//!
//! [`MemoryChannel`] is an in-process loopback used by the demo binary and
//! the integration tests. Callers queue messages with their input parameters
//! up front and collect replies and written outputs afterwards.

use std::collections::VecDeque;

use thiserror::Error;
use vaultgate_proto::{
    CallerId, ChannelId, Message, MessageKind, PARAM_COUNT, ServiceKind, SignalSet, Status,
};

/// A message was signalled but could not be obtained.
///
/// The dispatcher skips the kind for this iteration; no reply is owed for a
/// message that was never obtained.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiveError {
    /// No message is pending for the signalled kind.
    #[error("no pending message for {0:?}")]
    Empty(ServiceKind),
}

/// Inter-partition transport the dispatcher runs over.
///
/// Contract: `wait` blocks until at least one signal in the mask is asserted
/// and returns the asserted subset, or returns the empty set if the channel
/// has shut down. After a successful `receive`, the broker may `read` at most
/// the declared input length and `write` at most the declared output capacity
/// per parameter slot, and must `reply` exactly once.
pub trait SecureChannel {
    /// Block until a signal in `mask` is asserted; empty set means shutdown.
    fn wait(&mut self, mask: SignalSet) -> SignalSet;

    /// Obtain the pending message for a signalled service kind.
    fn receive(&mut self, kind: ServiceKind) -> Result<Message, ReceiveError>;

    /// Copy input parameter bytes into `buf`, returning the count copied.
    ///
    /// Successive reads of the same parameter continue where the previous
    /// read stopped.
    fn read(&mut self, channel: ChannelId, param: usize, buf: &mut [u8]) -> usize;

    /// Append bytes to an output parameter.
    fn write(&mut self, channel: ChannelId, param: usize, data: &[u8]);

    /// Complete the in-flight message with a status.
    fn reply(&mut self, channel: ChannelId, status: Status);
}

struct QueuedMessage {
    kind: ServiceKind,
    message: Message,
    inputs: [Vec<u8>; PARAM_COUNT],
}

struct InFlight {
    channel: ChannelId,
    inputs: [Vec<u8>; PARAM_COUNT],
    read_offsets: [usize; PARAM_COUNT],
    out_capacities: [usize; PARAM_COUNT],
    outputs: [Vec<u8>; PARAM_COUNT],
}

/// One fully processed message: its reply status and written outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedMessage {
    /// Connection the message belonged to.
    pub channel: ChannelId,
    /// Status the service replied with.
    pub status: Status,
    /// Bytes written to each output parameter.
    pub outputs: [Vec<u8>; PARAM_COUNT],
}

/// In-process loopback channel.
#[derive(Default)]
pub struct MemoryChannel {
    queue: VecDeque<QueuedMessage>,
    current: Option<InFlight>,
    completed: Vec<CompletedMessage>,
}

impl MemoryChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a connection request for a service kind.
    pub fn push_connect(&mut self, kind: ServiceKind, channel: ChannelId, caller: CallerId) {
        self.queue.push_back(QueuedMessage {
            kind,
            message: Message::new(MessageKind::Connect, channel, caller),
            inputs: std::array::from_fn(|_| Vec::new()),
        });
    }

    /// Queue a call carrying input parameters and declared output capacities.
    pub fn push_call(
        &mut self,
        kind: ServiceKind,
        channel: ChannelId,
        caller: CallerId,
        inputs: [Vec<u8>; PARAM_COUNT],
        out_capacities: [usize; PARAM_COUNT],
    ) {
        let mut in_sizes = [0usize; PARAM_COUNT];
        for (size, input) in in_sizes.iter_mut().zip(&inputs) {
            *size = input.len();
        }
        self.queue.push_back(QueuedMessage {
            kind,
            message: Message::new(MessageKind::Call, channel, caller)
                .with_in_sizes(in_sizes)
                .with_out_sizes(out_capacities),
            inputs,
        });
    }

    /// Queue a disconnection for a service kind.
    pub fn push_disconnect(&mut self, kind: ServiceKind, channel: ChannelId, caller: CallerId) {
        self.queue.push_back(QueuedMessage {
            kind,
            message: Message::new(MessageKind::Disconnect, channel, caller),
            inputs: std::array::from_fn(|_| Vec::new()),
        });
    }

    /// Take all processed messages, oldest first.
    pub fn drain_completed(&mut self) -> Vec<CompletedMessage> {
        std::mem::take(&mut self.completed)
    }

    /// Messages still waiting to be dispatched.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl SecureChannel for MemoryChannel {
    fn wait(&mut self, mask: SignalSet) -> SignalSet {
        let mut pending = SignalSet::EMPTY;
        for queued in &self.queue {
            pending = pending.with(queued.kind);
        }
        SignalSet::from_bits(mask.bits() & pending.bits())
    }

    fn receive(&mut self, kind: ServiceKind) -> Result<Message, ReceiveError> {
        let position = self
            .queue
            .iter()
            .position(|queued| queued.kind == kind)
            .ok_or(ReceiveError::Empty(kind))?;
        let queued = match self.queue.remove(position) {
            Some(queued) => queued,
            None => return Err(ReceiveError::Empty(kind)),
        };
        self.current = Some(InFlight {
            channel: queued.message.channel,
            inputs: queued.inputs,
            read_offsets: [0; PARAM_COUNT],
            out_capacities: queued.message.out_sizes,
            outputs: std::array::from_fn(|_| Vec::new()),
        });
        Ok(queued.message)
    }

    fn read(&mut self, channel: ChannelId, param: usize, buf: &mut [u8]) -> usize {
        let Some(current) = self.current.as_mut().filter(|c| c.channel == channel) else {
            return 0;
        };
        let Some(input) = current.inputs.get(param) else {
            return 0;
        };
        let offset = current.read_offsets[param];
        let available = input.len().saturating_sub(offset);
        let count = buf.len().min(available);
        buf[..count].copy_from_slice(&input[offset..offset + count]);
        current.read_offsets[param] = offset + count;
        count
    }

    fn write(&mut self, channel: ChannelId, param: usize, data: &[u8]) {
        let Some(current) = self.current.as_mut().filter(|c| c.channel == channel) else {
            return;
        };
        if param >= PARAM_COUNT {
            return;
        }
        let room = current.out_capacities[param].saturating_sub(current.outputs[param].len());
        current.outputs[param].extend_from_slice(&data[..data.len().min(room)]);
    }

    fn reply(&mut self, channel: ChannelId, status: Status) {
        if let Some(current) = self.current.take_if(|c| c.channel == channel) {
            self.completed.push(CompletedMessage {
                channel: current.channel,
                status,
                outputs: current.outputs,
            });
        }
    }
}
