//! Construction-time configuration errors.
//!
//! Channel faults and protocol exhaustion are *not* errors: they are part of
//! normal operation and surface through [`crate::stats`].  Only settings that
//! would invalidate the protocol's correctness guarantees are rejected here.

use thiserror::Error;

use crate::engine::Protocol;

/// A configuration value that cannot drive a correct simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("window size must be at least 1")]
    ZeroWindow,

    #[error("sequence space of {0} is too small (need at least 2)")]
    SequenceSpaceTooSmall(u32),

    #[error("{protocol} window of {window} exceeds {limit} for a sequence space of {max_seq}")]
    WindowTooLarge {
        protocol: Protocol,
        window: usize,
        max_seq: u32,
        limit: usize,
    },

    #[error("retransmission timeout must be at least one tick")]
    ZeroTimeout,

    #[error("{0} must be at least 1")]
    ZeroLimit(&'static str),

    #[error("{name} probability {value} is outside [0, 1]")]
    InvalidProbability { name: &'static str, value: f64 },
}
