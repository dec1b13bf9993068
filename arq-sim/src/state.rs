//! Per-frame state machine.
//!
//! Every data frame a sender handles moves through these states:
//!
//! ```text
//!            ACK
//!   SENT ──────────▶ ACKED
//!    │  ▲
//!    │  │ retransmit
//!    ▼  │
//!  TIMED_OUT ──attempts exhausted──▶ FAILED
//! ```
//!
//! Only Stop-and-Wait can reach `Failed`; the windowed engines keep retrying
//! until their run-wide budget or iteration cap ends the run.

/// Lifecycle of one data frame at the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    /// Transmitted; waiting for an acknowledgement.
    #[default]
    Sent,
    /// Acknowledged by the receiver.
    Acked,
    /// Timer expired; a retransmission is due.
    TimedOut,
    /// Abandoned after the per-frame attempt limit.
    Failed,
}

impl std::fmt::Display for FrameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FrameState::Sent => "SENT",
            FrameState::Acked => "ACKED",
            FrameState::TimedOut => "TIMED_OUT",
            FrameState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}
