//! Protocol-violation termination.
//!
//! A client that lies about its declared transfer sizes, or a channel that
//! delivers a message kind the service cannot have been sent, indicates a
//! compromised or broken isolation boundary. There is no caller to reply to
//! in that situation; the service logs the violation and terminates.

/// Log a protocol violation at error level and abort the process.
pub(crate) fn protocol_violation(reason: &str) -> ! {
    tracing::error!(reason, "protocol violation, terminating service");
    std::process::abort()
}
