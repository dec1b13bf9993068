//! Frame definitions shared by every ARQ engine.
//!
//! A [`Frame`] is the unit that crosses the simulated channel.  Data frames
//! carry an application payload; control frames (`Ack` / `Nak`) carry only a
//! sequence number.  This module is pure data: no channel or timing logic.
//!
//! # Layout
//!
//! ```text
//! +-----------+--------+---------------------+-------------+
//! | seq (mod) |  kind  |  payload (UTF-8)    |  checksum   |
//! +-----------+--------+---------------------+-------------+
//! ```
//!
//! `checksum` is the additive sum of the payload bytes modulo 256.  It is
//! computed once at construction and never changed on the sender's copy; a
//! corrupted copy produced by the channel carries a damaged checksum instead.

use std::fmt;

/// Sequence number as carried on the wire (always reduced modulo `max_seq`).
pub type SeqNum = u32;

/// What a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Application payload.
    Data,
    /// Positive acknowledgement for `seq`.
    Ack,
    /// Negative acknowledgement for `seq` (frame arrived damaged).
    Nak,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Data => write!(f, "DATA"),
            FrameKind::Ack => write!(f, "ACK"),
            FrameKind::Nak => write!(f, "NAK"),
        }
    }
}

/// A single transmissible unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Modular sequence number.
    pub seq: SeqNum,
    pub kind: FrameKind,
    /// Payload; empty for control frames.
    pub payload: String,
    /// Additive checksum recorded when the frame was built.
    pub checksum: u32,
}

impl Frame {
    /// Build a data frame, computing its checksum from `payload`.
    pub fn data(seq: SeqNum, payload: impl Into<String>) -> Self {
        let payload = payload.into();
        let checksum = checksum(payload.as_bytes());
        Self {
            seq,
            kind: FrameKind::Data,
            payload,
            checksum,
        }
    }

    /// Build a positive acknowledgement for `seq`.
    pub fn ack(seq: SeqNum) -> Self {
        Self::control(seq, FrameKind::Ack)
    }

    /// Build a negative acknowledgement for `seq`.
    pub fn nak(seq: SeqNum) -> Self {
        Self::control(seq, FrameKind::Nak)
    }

    fn control(seq: SeqNum, kind: FrameKind) -> Self {
        Self {
            seq,
            kind,
            payload: String::new(),
            checksum: 0,
        }
    }

    /// `true` when the stored checksum matches the payload.
    pub fn is_intact(&self) -> bool {
        self.checksum == checksum(self.payload.as_bytes())
    }

    /// `true` for an `Ack` frame acknowledging `seq`.
    pub fn acks(&self, seq: SeqNum) -> bool {
        self.kind == FrameKind::Ack && self.seq == seq
    }

    /// Copy of this frame with a single-bit error in its integrity code.
    ///
    /// Used by the channel to model corruption in transit; the original is
    /// left untouched so the sender can retransmit it verbatim.
    pub fn with_bit_error(&self) -> Self {
        Self {
            checksum: self.checksum ^ 1,
            ..self.clone()
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FrameKind::Data => write!(f, "DATA seq={} '{}'", self.seq, self.payload),
            kind => write!(f, "{kind} seq={}", self.seq),
        }
    }
}

/// Sum of `data` bytes modulo 256.
pub fn checksum(data: &[u8]) -> u32 {
    data.iter().fold(0u32, |acc, &b| (acc + u32::from(b)) % 256)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_frame_carries_checksum() {
        let f = Frame::data(3, "AB"); // 65 + 66
        assert_eq!(f.seq, 3);
        assert_eq!(f.kind, FrameKind::Data);
        assert_eq!(f.checksum, 131);
        assert!(f.is_intact());
    }

    #[test]
    fn checksum_wraps_at_256() {
        // 'z' = 122; 3 × 122 = 366 → 110
        assert_eq!(checksum(b"zzz"), 110);
        assert_eq!(checksum(b""), 0);
    }

    #[test]
    fn bit_error_is_detected() {
        let f = Frame::data(0, "Alpha");
        let damaged = f.with_bit_error();
        assert!(!damaged.is_intact());
        assert_eq!(damaged.payload, f.payload);
        // The original is unchanged.
        assert!(f.is_intact());
    }

    #[test]
    fn bit_error_on_empty_payload_is_detected() {
        let f = Frame::data(1, "");
        assert!(!f.with_bit_error().is_intact());
    }

    #[test]
    fn control_frames_have_no_payload() {
        let a = Frame::ack(5);
        let n = Frame::nak(5);
        assert!(a.payload.is_empty());
        assert!(a.acks(5));
        assert!(!a.acks(4));
        assert!(!n.acks(5));
        assert_eq!(n.kind, FrameKind::Nak);
    }

    #[test]
    fn display_names_kind_and_seq() {
        assert_eq!(Frame::data(2, "Beta").to_string(), "DATA seq=2 'Beta'");
        assert_eq!(Frame::ack(7).to_string(), "ACK seq=7");
        assert_eq!(Frame::nak(0).to_string(), "NAK seq=0");
    }
}
