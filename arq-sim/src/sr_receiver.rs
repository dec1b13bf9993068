//! Selective Repeat receive side.
//!
//! The receiver keeps a window of `window_size` sequence numbers starting at
//! `base` and a reorder buffer with one slot per sequence number.
//!
//! ```text
//!   already delivered     receive window (buffered / empty)     not yet valid
//!  ◀───────────────────┤ base ─────────── base + W - 1 ├──────────────────▶
//!     re-ACK, drop          buffer + ACK                    drop silently
//! ```
//!
//! - An intact frame inside the window is buffered (once) and acknowledged
//!   individually.  Buffered frames are then delivered in order starting at
//!   `base`, sliding the window.
//! - A frame up to `W` numbers *below* the window is a copy of something
//!   already delivered whose ACK went missing: it is re-acknowledged so the
//!   sender can retire it.
//! - Anything else, and every corrupted frame, is discarded without a reply.

use crate::channel::FaultModel;
use crate::config::ArqConfig;
use crate::engine::Protocol;
use crate::error::ConfigError;
use crate::frame::{Frame, SeqNum};
use crate::stats::ReceiverStats;
use crate::window::{in_window, seq_distance, to_seq};

/// Selective Repeat receive-side state.
#[derive(Debug)]
pub struct SrReceiver<F> {
    /// Count of payloads delivered; `base % max_seq` is the window start.
    base: u64,
    window_size: usize,
    max_seq: u32,
    /// Reorder buffer indexed by sequence number.
    buffer: Vec<Option<String>>,
    delivered: Vec<String>,
    stats: ReceiverStats,
    channel: F,
}

impl<F: FaultModel> SrReceiver<F> {
    pub fn new(config: &ArqConfig, channel: F) -> Result<Self, ConfigError> {
        config.validate(Protocol::SelectiveRepeat)?;
        Ok(Self {
            base: 0,
            window_size: config.window_size,
            max_seq: config.max_seq,
            buffer: vec![None; config.max_seq as usize],
            delivered: Vec::new(),
            stats: ReceiverStats::default(),
            channel,
        })
    }

    /// Process one transmission of `frame`.
    ///
    /// Returns the ACKs that make it back to the sender (at most one per
    /// call).  Delivery out of the buffer never produces additional ACKs.
    pub fn receive_frame(&mut self, frame: &Frame) -> Vec<Frame> {
        self.stats.frames_received += 1;

        let Some(seen) = self.channel.carry(frame) else {
            log::debug!("[sr] ✗ {frame} lost in transit");
            return Vec::new();
        };
        if !seen.is_intact() || seen.seq >= self.max_seq {
            self.stats.frames_discarded += 1;
            log::debug!("[sr] ✗ {frame} corrupted");
            return Vec::new();
        }

        let seq = seen.seq;
        if self.is_in_window(seq) {
            let slot = &mut self.buffer[seq as usize];
            if slot.is_some() {
                self.stats.duplicates += 1;
                log::debug!("[sr] ← {seen} already buffered");
            } else {
                log::debug!("[sr] ← {seen} buffered");
                *slot = Some(seen.payload);
            }
            let replies = self.ack(seq);
            self.deliver_ready();
            debug_assert!(self.window_invariant_holds());
            replies
        } else if self.is_already_delivered(seq) {
            self.stats.duplicates += 1;
            log::debug!("[sr] ← {seen} already delivered; re-ACK");
            self.ack(seq)
        } else {
            self.stats.frames_discarded += 1;
            log::debug!("[sr] ← {seen} outside window; discarded");
            Vec::new()
        }
    }

    fn ack(&mut self, seq: SeqNum) -> Vec<Frame> {
        match self.channel.carry_ack(Frame::ack(seq)) {
            Some(ack) => vec![ack],
            None => {
                log::debug!("[sr] ✗ ACK seq={seq} lost");
                Vec::new()
            }
        }
    }

    /// Deliver buffered payloads in order from `base`, sliding the window.
    ///
    /// Returns the number of payloads delivered.
    pub fn deliver_ready(&mut self) -> usize {
        let mut count = 0;
        loop {
            let slot = self.base_seq() as usize;
            let Some(payload) = self.buffer[slot].take() else {
                break;
            };
            self.delivered.push(payload);
            self.base += 1;
            count += 1;
        }
        if count > 0 {
            self.stats.frames_delivered += count as u64;
            log::debug!("[sr] delivered {count}; window base → {}", self.base_seq());
        }
        count
    }

    /// `true` when `seq` lies in `[base, base + W)` modulo the sequence space.
    pub fn is_in_window(&self, seq: SeqNum) -> bool {
        in_window(seq, self.base_seq(), self.window_size, self.max_seq)
    }

    /// `true` when `seq` is one of the `W` numbers just below the window.
    pub fn is_already_delivered(&self, seq: SeqNum) -> bool {
        let back = u64::from(seq_distance(seq, self.base_seq(), self.max_seq));
        back >= 1 && back <= self.window_size as u64 && back <= self.base
    }

    /// Every buffered payload sits inside the receive window, and the slot
    /// at `base` is empty once [`deliver_ready`](Self::deliver_ready) ran.
    pub fn window_invariant_holds(&self) -> bool {
        let base = self.base_seq();
        self.buffered() <= self.window_size
            && self.buffer[base as usize].is_none()
            && self
                .buffer
                .iter()
                .enumerate()
                .filter(|(_, p)| p.is_some())
                .all(|(seq, _)| in_window(seq as SeqNum, base, self.window_size, self.max_seq))
    }

    /// Sequence number at the start of the receive window.
    pub fn base_seq(&self) -> SeqNum {
        to_seq(self.base, self.max_seq)
    }

    /// Payloads held out of order.
    pub fn buffered(&self) -> usize {
        self.buffer.iter().filter(|p| p.is_some()).count()
    }

    /// Payloads delivered so far, in order.
    pub fn delivered(&self) -> &[String] {
        &self.delivered
    }

    pub fn stats(&self) -> ReceiverStats {
        ReceiverStats {
            frames_buffered: self.buffered() as u64,
            ..self.stats.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChannelConfig, RandomChannel};

    fn receiver() -> SrReceiver<RandomChannel> {
        let ch = RandomChannel::seeded(ChannelConfig::ideal(), 0).unwrap();
        SrReceiver::new(&ArqConfig::default(), ch).unwrap()
    }

    fn acked(replies: &[Frame]) -> Vec<SeqNum> {
        replies.iter().map(|f| f.seq).collect()
    }

    #[test]
    fn in_order_frame_delivered_immediately() {
        let mut r = receiver();
        let replies = r.receive_frame(&Frame::data(0, "Data1"));
        assert_eq!(acked(&replies), vec![0]);
        assert_eq!(r.delivered(), ["Data1"]);
        assert_eq!(r.base_seq(), 1);
    }

    #[test]
    fn out_of_order_frame_is_buffered_and_acked() {
        let mut r = receiver();
        let replies = r.receive_frame(&Frame::data(2, "Data3"));
        assert_eq!(acked(&replies), vec![2]);
        assert!(r.delivered().is_empty());
        assert_eq!(r.buffered(), 1);
        assert_eq!(r.stats().frames_buffered, 1);
    }

    #[test]
    fn gap_fill_flushes_buffer_in_order() {
        let mut r = receiver();
        r.receive_frame(&Frame::data(1, "Data2"));
        r.receive_frame(&Frame::data(2, "Data3"));
        let replies = r.receive_frame(&Frame::data(0, "Data1"));
        // One ACK per call, even though three payloads were delivered.
        assert_eq!(acked(&replies), vec![0]);
        assert_eq!(r.delivered(), ["Data1", "Data2", "Data3"]);
        assert_eq!(r.buffered(), 0);
        assert_eq!(r.base_seq(), 3);
    }

    #[test]
    fn deliver_ready_stops_at_first_gap() {
        let mut r = receiver();
        r.receive_frame(&Frame::data(1, "Data2"));
        r.receive_frame(&Frame::data(3, "Data4"));
        assert_eq!(r.deliver_ready(), 0);

        r.receive_frame(&Frame::data(0, "Data1"));
        assert_eq!(r.delivered(), ["Data1", "Data2"]);
        assert_eq!(r.base_seq(), 2);
        // Data4 waits behind the hole at seq 2.
        assert_eq!(r.buffered(), 1);
        assert_eq!(r.deliver_ready(), 0);
        assert!(r.window_invariant_holds());

        r.receive_frame(&Frame::data(2, "Data3"));
        assert_eq!(r.delivered(), ["Data1", "Data2", "Data3", "Data4"]);
        assert_eq!(r.stats().frames_delivered, 4);
        assert_eq!(r.buffered(), 0);
    }

    #[test]
    fn buffered_duplicate_counted_once() {
        let mut r = receiver();
        r.receive_frame(&Frame::data(2, "Data3"));
        let replies = r.receive_frame(&Frame::data(2, "Data3"));
        assert_eq!(acked(&replies), vec![2]);
        assert_eq!(r.stats().duplicates, 1);
        assert_eq!(r.buffered(), 1);
    }

    #[test]
    fn below_window_frame_is_reacked_not_redelivered() {
        let mut r = receiver();
        r.receive_frame(&Frame::data(0, "Data1"));
        let replies = r.receive_frame(&Frame::data(0, "Data1"));
        assert_eq!(acked(&replies), vec![0]);
        assert_eq!(r.delivered(), ["Data1"]);
        assert_eq!(r.stats().duplicates, 1);
    }

    #[test]
    fn frame_beyond_window_is_dropped_silently() {
        let mut r = receiver();
        // Window is [0, 4); 5 is ahead of it.
        assert!(r.receive_frame(&Frame::data(5, "early")).is_empty());
        assert_eq!(r.stats().frames_discarded, 1);
        assert_eq!(r.buffered(), 0);
    }

    #[test]
    fn nothing_is_below_the_window_before_first_delivery() {
        let r = receiver();
        assert!(!r.is_already_delivered(7));
        assert!(!r.is_already_delivered(4));
    }

    #[test]
    fn window_wraps_around_sequence_space() {
        let mut r = receiver();
        for i in 0..6u32 {
            r.receive_frame(&Frame::data(i, format!("p{i}")));
        }
        assert_eq!(r.base_seq(), 6);
        // Window is now [6, 7, 0, 1].
        assert!(r.is_in_window(0));
        assert!(r.is_in_window(1));
        assert!(!r.is_in_window(2));
        assert!(r.is_already_delivered(2));
        r.receive_frame(&Frame::data(0, "p8"));
        r.receive_frame(&Frame::data(7, "p7"));
        r.receive_frame(&Frame::data(6, "p6"));
        assert_eq!(r.delivered().len(), 9);
        assert_eq!(r.delivered()[8], "p8");
    }

    #[test]
    fn corrupted_frame_discarded_without_reply() {
        let ch = RandomChannel::seeded(
            ChannelConfig {
                corruption_rate: 1.0,
                ..ChannelConfig::ideal()
            },
            0,
        )
        .unwrap();
        let mut r = SrReceiver::new(&ArqConfig::default(), ch).unwrap();
        assert!(r.receive_frame(&Frame::data(0, "x")).is_empty());
        assert_eq!(r.stats().frames_discarded, 1);
        assert!(r.delivered().is_empty());
    }

    #[test]
    fn rejects_window_over_half_sequence_space() {
        let cfg = ArqConfig {
            window_size: 5,
            ..ArqConfig::default()
        };
        let ch = RandomChannel::seeded(ChannelConfig::ideal(), 0).unwrap();
        assert!(SrReceiver::new(&cfg, ch).is_err());
    }
}
