//! The closed set of status codes returned to callers.

/// Status code carried in every reply.
///
/// This set is closed: every operational outcome of the service maps onto one
/// of these values. Protocol violations never produce a status - they abort
/// the process instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Operation completed.
    Success,
    /// Handle is unknown, or not owned by the calling partition.
    InvalidHandle,
    /// Operation code or algorithm is not supported.
    NotSupported,
    /// A scratch or output allocation failed.
    InsufficientMemory,
    /// An argument was malformed or out of range.
    InvalidArgument,
    /// The fixed-size request header had the wrong length.
    CommunicationFailure,
    /// Resource exhaustion in the clone pool, or a clone resolution against a
    /// dead or foreign slot.
    BadState,
}

impl Status {
    /// Wire encoding of the status.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::NotSupported => -134,
            Self::InvalidArgument => -135,
            Self::InvalidHandle => -136,
            Self::BadState => -137,
            Self::InsufficientMemory => -141,
            Self::CommunicationFailure => -145,
        }
    }

    /// Decode a wire status. Unknown codes are `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            -134 => Some(Self::NotSupported),
            -135 => Some(Self::InvalidArgument),
            -136 => Some(Self::InvalidHandle),
            -137 => Some(Self::BadState),
            -141 => Some(Self::InsufficientMemory),
            -145 => Some(Self::CommunicationFailure),
            _ => None,
        }
    }

    /// Whether this is the success status.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Status; 7] = [
        Status::Success,
        Status::InvalidHandle,
        Status::NotSupported,
        Status::InsufficientMemory,
        Status::InvalidArgument,
        Status::CommunicationFailure,
        Status::BadState,
    ];

    #[test]
    fn codes_roundtrip() {
        for status in ALL {
            assert_eq!(Status::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn unknown_code_rejected() {
        assert_eq!(Status::from_code(-999), None);
        assert_eq!(Status::from_code(1), None);
    }

    #[test]
    fn only_success_is_success() {
        for status in ALL {
            assert_eq!(status.is_success(), status == Status::Success);
        }
    }
}
