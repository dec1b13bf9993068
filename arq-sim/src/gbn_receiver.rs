//! Go-Back-N receive-side state machine.
//!
//! [`GbnReceiver`] implements the receiver side of Go-Back-N:
//!
//! - Only the **next expected** sequence number is accepted.
//! - Anything else (a gap, or a copy of something already delivered) is
//!   discarded without buffering.
//! - Every intact frame is answered with a **cumulative ACK**: the number of
//!   the frame just accepted, or of the last frame accepted before it.  The
//!   repeated ACK is what eventually makes the sender go back.

use crate::channel::FaultModel;
use crate::config::ArqConfig;
use crate::engine::Protocol;
use crate::error::ConfigError;
use crate::frame::{Frame, SeqNum};
use crate::stats::ReceiverStats;
use crate::window::{seq_distance, to_seq};

/// Go-Back-N receive-side state.
#[derive(Debug)]
pub struct GbnReceiver<F> {
    /// Count of frames accepted so far; `expected % max_seq` is the next
    /// sequence number that will be accepted.
    expected: u64,
    max_seq: u32,
    /// Sender window, used only to recognise copies of delivered frames.
    window_size: usize,
    delivered: Vec<String>,
    stats: ReceiverStats,
    channel: F,
}

impl<F: FaultModel> GbnReceiver<F> {
    pub fn new(config: &ArqConfig, channel: F) -> Result<Self, ConfigError> {
        config.validate(Protocol::GoBackN)?;
        Ok(Self {
            expected: 0,
            max_seq: config.max_seq,
            window_size: config.window_size,
            delivered: Vec::new(),
            stats: ReceiverStats::default(),
            channel,
        })
    }

    /// Process one transmission of `frame`.
    ///
    /// Returns the cumulative ACK that reaches the sender, or `None` when the
    /// frame was lost or corrupted, the ACK was lost, or nothing has been
    /// accepted yet to acknowledge.
    pub fn receive_frame(&mut self, frame: &Frame) -> Option<Frame> {
        self.stats.frames_received += 1;

        let Some(seen) = self.channel.carry(frame) else {
            log::debug!("[gbn] ✗ {frame} lost in transit");
            return None;
        };
        if !seen.is_intact() {
            self.stats.frames_discarded += 1;
            log::debug!("[gbn] ✗ {frame} corrupted");
            return None;
        }

        let ack_seq = if seen.seq == self.expected_seq() {
            log::debug!("[gbn] ← {seen} accepted");
            self.delivered.push(seen.payload);
            self.stats.frames_delivered += 1;
            self.expected += 1;
            seen.seq
        } else {
            if self.is_duplicate(seen.seq) {
                self.stats.duplicates += 1;
            } else {
                self.stats.frames_discarded += 1;
            }
            log::debug!(
                "[gbn] ← {seen} out of order (expected {}); discarded",
                self.expected_seq()
            );
            if self.expected == 0 {
                return None;
            }
            to_seq(self.expected - 1, self.max_seq)
        };

        let reply = self.channel.carry_ack(Frame::ack(ack_seq));
        if reply.is_none() {
            log::debug!("[gbn] ✗ ACK seq={ack_seq} lost");
        }
        reply
    }

    /// `true` when `seq` names one of the last `window_size` delivered frames.
    fn is_duplicate(&self, seq: SeqNum) -> bool {
        let back = u64::from(seq_distance(seq, self.expected_seq(), self.max_seq));
        back >= 1 && back <= self.window_size as u64 && back <= self.expected
    }

    /// Sequence number the receiver will accept next.
    pub fn expected_seq(&self) -> SeqNum {
        to_seq(self.expected, self.max_seq)
    }

    /// Payloads delivered so far, in order.
    pub fn delivered(&self) -> &[String] {
        &self.delivered
    }

    pub fn stats(&self) -> ReceiverStats {
        self.stats.clone()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
