//! Inbound message model and the per-service signal space.
//!
//! A [`Message`] is one event retrieved from the secure channel: a partition
//! opened a connection, made a call, or closed a connection. The declared
//! parameter sizes are the caller's contract with the service - a handler may
//! read at most `in_sizes[i]` bytes and write at most `out_sizes[i]` bytes
//! for each parameter slot.

/// Number of input/output parameter slots per message.
pub const PARAM_COUNT: usize = 4;

/// Opaque identifier of one connection on the secure channel.
///
/// Stable for the lifetime of the connection (Connect through Disconnect).
/// Also serves as the by-value identity of the connection's operation
/// context, replacing raw context pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u64);

/// Identity of the calling partition, unique across the trust boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallerId(pub i32);

/// What the caller did: opened, called, or closed a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A partition opened a new connection to a service kind.
    Connect,
    /// A call on an open connection.
    Call,
    /// A partition closed a connection.
    Disconnect,
}

/// One inbound event from a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Event kind.
    pub kind: MessageKind,
    /// Connection the event arrived on.
    pub channel: ChannelId,
    /// Identity of the calling partition.
    pub caller: CallerId,
    /// Declared byte length of each input parameter.
    pub in_sizes: [usize; PARAM_COUNT],
    /// Declared byte capacity of each output parameter.
    pub out_sizes: [usize; PARAM_COUNT],
}

impl Message {
    /// Create a message with no declared parameters.
    pub fn new(kind: MessageKind, channel: ChannelId, caller: CallerId) -> Self {
        Self { kind, channel, caller, in_sizes: [0; PARAM_COUNT], out_sizes: [0; PARAM_COUNT] }
    }

    /// Set the declared input sizes.
    #[must_use]
    pub fn with_in_sizes(mut self, in_sizes: [usize; PARAM_COUNT]) -> Self {
        self.in_sizes = in_sizes;
        self
    }

    /// Set the declared output capacities.
    #[must_use]
    pub fn with_out_sizes(mut self, out_sizes: [usize; PARAM_COUNT]) -> Self {
        self.out_sizes = out_sizes;
        self
    }
}

/// The service kinds multiplexed over one dispatch loop.
///
/// Each kind has its own signal bit and its own message queue on the secure
/// channel. Crypto lifecycle init and free are distinct kinds so callers can
/// reference-count the subsystem independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Crypto subsystem init (reference-counted).
    CryptoInit,
    /// Crypto subsystem free (reference-counted).
    CryptoFree,
    /// Multi-part hash operations.
    Hash,
    /// Multi-part MAC operations.
    Mac,
    /// Multi-part symmetric cipher operations.
    Symmetric,
    /// One-shot asymmetric operations.
    Asymmetric,
    /// One-shot AEAD operations.
    Aead,
    /// Key lifecycle management.
    KeyManagement,
    /// Key derivation and agreement.
    Derivation,
    /// Random number generation.
    Rng,
    /// One-time entropy injection.
    EntropyInject,
}

impl ServiceKind {
    /// All service kinds, in dispatch order.
    pub const ALL: [Self; 11] = [
        Self::CryptoInit,
        Self::Mac,
        Self::Hash,
        Self::Symmetric,
        Self::Asymmetric,
        Self::Aead,
        Self::KeyManagement,
        Self::Rng,
        Self::CryptoFree,
        Self::Derivation,
        Self::EntropyInject,
    ];

    /// The signal bit for this kind.
    pub fn signal(self) -> u32 {
        match self {
            Self::CryptoInit => 1 << 0,
            Self::Mac => 1 << 1,
            Self::Hash => 1 << 2,
            Self::Symmetric => 1 << 3,
            Self::Asymmetric => 1 << 4,
            Self::Aead => 1 << 5,
            Self::KeyManagement => 1 << 6,
            Self::Rng => 1 << 7,
            Self::CryptoFree => 1 << 8,
            Self::Derivation => 1 << 9,
            Self::EntropyInject => 1 << 10,
        }
    }
}

/// A set of asserted service signals, as returned by the channel's `wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalSet(u32);

impl SignalSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// The set containing every service kind's signal.
    pub fn all() -> Self {
        ServiceKind::ALL.iter().fold(Self::EMPTY, |set, kind| set.with(*kind))
    }

    /// Raw bitmask.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Set from a raw bitmask.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The set plus one kind's signal.
    #[must_use]
    pub fn with(self, kind: ServiceKind) -> Self {
        Self(self.0 | kind.signal())
    }

    /// Whether the set contains the kind's signal.
    pub fn contains(self, kind: ServiceKind) -> bool {
        self.0 & kind.signal() != 0
    }

    /// Whether no signal is asserted.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Asserted kinds, in dispatch order.
    pub fn iter(self) -> impl Iterator<Item = ServiceKind> {
        ServiceKind::ALL.into_iter().filter(move |kind| self.contains(*kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_bits_are_distinct() {
        let mut seen = 0u32;
        for kind in ServiceKind::ALL {
            assert_eq!(seen & kind.signal(), 0, "duplicate signal bit for {kind:?}");
            seen |= kind.signal();
        }
    }

    #[test]
    fn signal_set_roundtrip() {
        let set = SignalSet::EMPTY.with(ServiceKind::Hash).with(ServiceKind::Rng);
        assert!(set.contains(ServiceKind::Hash));
        assert!(set.contains(ServiceKind::Rng));
        assert!(!set.contains(ServiceKind::Mac));

        let kinds: Vec<_> = set.iter().collect();
        assert_eq!(kinds, vec![ServiceKind::Hash, ServiceKind::Rng]);
    }

    #[test]
    fn all_covers_every_kind() {
        let set = SignalSet::all();
        for kind in ServiceKind::ALL {
            assert!(set.contains(kind));
        }
        assert!(!set.is_empty());
        assert!(SignalSet::EMPTY.is_empty());
    }

    #[test]
    fn message_builders_set_sizes() {
        let msg = Message::new(MessageKind::Call, ChannelId(7), CallerId(-3))
            .with_in_sizes([10, 20, 0, 0])
            .with_out_sizes([32, 8, 0, 0]);
        assert_eq!(msg.in_sizes[1], 20);
        assert_eq!(msg.out_sizes[0], 32);
        assert_eq!(msg.caller, CallerId(-3));
    }
}
