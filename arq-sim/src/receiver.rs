//! Stop-and-Wait receive side.
//!
//! [`SwReceiver`] accepts exactly one sequence number at a time from a 1-bit
//! space:
//! - A frame carrying `expected` is delivered, acknowledged, and `expected`
//!   toggles.
//! - A frame carrying the *other* bit is a retransmission of something
//!   already delivered (its ACK was lost).  It is re-acknowledged, never
//!   re-delivered, so the sender can move on.
//! - A frame that arrives damaged is answered with a NAK.
//!
//! The channel's faults are applied here, on the way in (loss, corruption)
//! and on the way back (ACK loss).

use crate::channel::FaultModel;
use crate::frame::{Frame, SeqNum};
use crate::stats::ReceiverStats;

/// Stop-and-Wait receive-side state.
#[derive(Debug)]
pub struct SwReceiver<F> {
    /// Sequence bit of the next new frame.
    expected: SeqNum,
    delivered: Vec<String>,
    stats: ReceiverStats,
    channel: F,
}

impl<F: FaultModel> SwReceiver<F> {
    pub fn new(channel: F) -> Self {
        Self {
            expected: 0,
            delivered: Vec::new(),
            stats: ReceiverStats::default(),
            channel,
        }
    }

    /// Process one transmission of `frame`.
    ///
    /// Returns the control frame that makes it back to the sender: an `Ack`,
    /// a `Nak` for a damaged frame, or `None` when the frame or the reply was
    /// lost.
    pub fn receive_frame(&mut self, frame: &Frame) -> Option<Frame> {
        self.stats.frames_received += 1;

        let Some(seen) = self.channel.carry(frame) else {
            log::debug!("[sw] ✗ {frame} lost in transit");
            return None;
        };

        if !seen.is_intact() {
            self.stats.frames_discarded += 1;
            log::debug!("[sw] ✗ {frame} corrupted; → NAK");
            return self.channel.carry_ack(Frame::nak(seen.seq));
        }

        if seen.seq == self.expected {
            log::debug!("[sw] ← {seen} accepted");
            self.delivered.push(seen.payload);
            self.stats.frames_delivered += 1;
            self.expected ^= 1;
        } else {
            // Our earlier ACK for this frame went missing.
            self.stats.duplicates += 1;
            log::debug!("[sw] ← {seen} duplicate; re-ACK");
        }

        let reply = self.channel.carry_ack(Frame::ack(seen.seq));
        if reply.is_none() {
            log::debug!("[sw] ✗ ACK seq={} lost", seen.seq);
        }
        reply
    }

    /// Sequence bit the receiver is waiting for.
    pub fn expected(&self) -> SeqNum {
        self.expected
    }

    /// Payloads delivered so far, in order.
    pub fn delivered(&self) -> &[String] {
        &self.delivered
    }

    pub fn stats(&self) -> ReceiverStats {
        self.stats.clone()
    }
}
