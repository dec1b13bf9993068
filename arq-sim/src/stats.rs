//! Run statistics and outcomes reported by every engine.
//!
//! A run never fails with an error because of the channel.  How it ended is
//! described by [`Outcome`]; how much work it took is in [`SenderStats`] and
//! [`ReceiverStats`].

use std::fmt;

use crate::frame::SeqNum;

/// Sender-side counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderStats {
    /// Every data-frame transmission, first sends included.
    pub total_transmissions: u64,
    /// Transmissions of a frame that had already been sent.
    pub retransmissions: u64,
    /// Frames abandoned after the per-frame attempt limit (Stop-and-Wait).
    pub failed_frames: u64,
}

impl SenderStats {
    /// Share of transmissions that were first sends, as a percentage.
    ///
    /// `0.0` when nothing has been transmitted.
    pub fn efficiency(&self) -> f64 {
        if self.total_transmissions == 0 {
            return 0.0;
        }
        let useful = self.total_transmissions - self.retransmissions;
        useful as f64 / self.total_transmissions as f64 * 100.0
    }
}

impl fmt::Display for SenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transmissions={} retransmissions={} failed={} efficiency={:.1}%",
            self.total_transmissions,
            self.retransmissions,
            self.failed_frames,
            self.efficiency()
        )
    }
}

/// Receiver-side counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Data frames that arrived at the receiver end of the channel, lost
    /// ones included.
    pub frames_received: u64,
    /// Frames rejected as corrupted, out of order or outside the window.
    pub frames_discarded: u64,
    /// Frames recognised as copies of one already held or delivered.
    pub duplicates: u64,
    /// Payloads handed to the application.
    pub frames_delivered: u64,
    /// Payloads waiting in the reorder buffer.
    pub frames_buffered: u64,
}

impl fmt::Display for ReceiverStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={} discarded={} duplicates={} delivered={} buffered={}",
            self.frames_received,
            self.frames_discarded,
            self.duplicates,
            self.frames_delivered,
            self.frames_buffered
        )
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every payload was acknowledged.
    Completed,
    /// Stop-and-Wait abandoned this many frames after exhausting attempts.
    FramesFailed(u64),
    /// Go-Back-N spent its retransmission budget with frames outstanding.
    RetransmissionBudgetExhausted,
    /// A windowed sender hit its defensive loop bound.
    IterationCapReached,
}

impl Outcome {
    pub fn is_complete(self) -> bool {
        self == Outcome::Completed
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => write!(f, "completed"),
            Outcome::FramesFailed(n) => write!(f, "{n} frame(s) failed"),
            Outcome::RetransmissionBudgetExhausted => write!(f, "retransmission budget exhausted"),
            Outcome::IterationCapReached => write!(f, "iteration cap reached"),
        }
    }
}

/// What one run delivered and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    /// Payloads delivered to the application, in order.
    pub delivered: Vec<String>,
    pub outcome: Outcome,
}

impl DeliveryResult {
    pub fn is_complete(&self) -> bool {
        self.outcome.is_complete()
    }
}

/// One entry in a sender's transmission log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxRecord {
    /// Unbounded instance number of the frame.
    pub instance: u64,
    /// Wire sequence number.
    pub seq: SeqNum,
    /// `false` for the first transmission of `instance`.
    pub retransmission: bool,
    /// Logical tick of the transmission.
    pub tick: u64,
}
