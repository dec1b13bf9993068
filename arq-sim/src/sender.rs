//! Stop-and-Wait send side.
//!
//! [`SwSender`] keeps exactly one frame outstanding.
//!
//! # Stop-and-Wait contract
//! - A frame carries the current sequence bit; the bit toggles only after
//!   that frame is acknowledged.
//! - With no ACK (lost frame, corrupted frame answered by a NAK, or lost
//!   ACK) the sender waits out the timeout and transmits the same frame
//!   again, up to `max_attempts` transmissions.
//! - A frame that exhausts its attempts is marked failed and the sender
//!   moves on to the next payload.  This is reported, never raised.

use std::collections::VecDeque;

use crate::channel::FaultModel;
use crate::config::ArqConfig;
use crate::engine::Protocol;
use crate::error::ConfigError;
use crate::frame::{Frame, SeqNum};
use crate::receiver::SwReceiver;
use crate::state::FrameState;
use crate::stats::{SenderStats, TxRecord};
use crate::timer::LogicalClock;

/// Stop-and-Wait send-side state.
#[derive(Debug)]
pub struct SwSender {
    /// Sequence bit for the next (or current) frame.
    seq: SeqNum,
    /// Instance number of the next new frame.
    next_instance: u64,
    /// State of the most recent frame.
    state: FrameState,
    max_attempts: u32,
    timeout_ticks: u64,
    clock: LogicalClock,
    backlog: VecDeque<String>,
    stats: SenderStats,
    log: Vec<TxRecord>,
}

impl SwSender {
    pub fn new(config: &ArqConfig) -> Result<Self, ConfigError> {
        config.validate(Protocol::StopAndWait)?;
        Ok(Self {
            seq: 0,
            next_instance: 0,
            state: FrameState::default(),
            max_attempts: config.max_attempts,
            timeout_ticks: config.timer.timeout_ticks,
            clock: LogicalClock::new(&config.timer),
            backlog: VecDeque::new(),
            stats: SenderStats::default(),
            log: Vec::new(),
        })
    }

    /// Queue payloads for [`run`](Self::run).
    pub fn add_data<I, S>(&mut self, payloads: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.backlog.len();
        self.backlog.extend(payloads.into_iter().map(Into::into));
        log::debug!("[sw] queued {} payload(s)", self.backlog.len() - before);
    }

    /// Send every queued payload, one [`send`](Self::send) each.
    ///
    /// Returns `true` when every payload was acknowledged.  A failed frame
    /// is one that was never *acknowledged*, not one that was never
    /// delivered: if only its ACKs were lost the receiver already holds it,
    /// and because the bit does not toggle on failure the next payload is
    /// taken for a duplicate and dropped.
    pub fn run<F: FaultModel>(&mut self, receiver: &mut SwReceiver<F>) -> bool {
        let mut all_acked = true;
        while let Some(payload) = self.backlog.pop_front() {
            all_acked &= self.send(payload, receiver);
        }
        all_acked
    }

    /// Deliver one payload, retrying until it is acknowledged or the attempt
    /// limit is reached.  Returns `true` on acknowledgement.
    pub fn send<F: FaultModel>(
        &mut self,
        payload: impl Into<String>,
        receiver: &mut SwReceiver<F>,
    ) -> bool {
        let frame = Frame::data(self.seq, payload);
        let instance = self.next_instance;
        self.next_instance += 1;
        self.state = FrameState::Sent;

        for attempt in 1..=self.max_attempts {
            let tick = self.clock.on_transmit();
            let retransmission = attempt > 1;
            self.stats.total_transmissions += 1;
            if retransmission {
                self.stats.retransmissions += 1;
            }
            self.log.push(TxRecord {
                instance,
                seq: frame.seq,
                retransmission,
                tick,
            });
            log::debug!("[sw] → {frame} (attempt {attempt})");

            match receiver.receive_frame(&frame) {
                Some(reply) if reply.acks(self.seq) => {
                    log::debug!("[sw] ← {reply}");
                    self.state = FrameState::Acked;
                    self.seq ^= 1;
                    return true;
                }
                Some(reply) => log::debug!("[sw] ← {reply}; will retransmit"),
                None => log::debug!("[sw] timeout waiting for ACK seq={}", frame.seq),
            }

            self.state = FrameState::TimedOut;
            self.clock.advance(self.timeout_ticks);
        }

        self.state = FrameState::Failed;
        self.stats.failed_frames += 1;
        log::warn!(
            "[sw] giving up on seq={} after {} attempt(s)",
            frame.seq,
            self.max_attempts
        );
        false
    }

    /// Sequence bit the next new frame will carry.
    pub fn seq(&self) -> SeqNum {
        self.seq
    }

    /// State of the most recently handled frame.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Payloads not yet sent.
    pub fn pending(&self) -> usize {
        self.backlog.len()
    }

    pub fn stats(&self) -> SenderStats {
        self.stats.clone()
    }

    /// Every transmission so far, in order.
    pub fn transmissions(&self) -> &[TxRecord] {
        &self.log
    }

    /// Current logical time.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }
}
