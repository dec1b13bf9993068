//! Selective Repeat send side.
//!
//! [`SrSender`] keeps up to `window_size` frames outstanding, each with its
//! own timer, and retransmits **only** the frames whose timer expires.
//!
//! ```text
//!  instance:  base                                  next
//!               │  acked  │ in flight │  acked  │     │
//!               ▼─────────┴───────────┴─────────┴─────▼
//!  acked set:   {seq(base+1), seq(base+3)}  … slides once seq(base) is acked
//! ```
//!
//! Each pass of [`send_all`](SrSender::send_all):
//! 1. admits new frames while the window has room and transmits them;
//! 2. retransmits every frame whose own timer has expired;
//! 3. slides `base` past the contiguous run of acknowledged frames;
//! 4. advances the logical clock by one idle tick.
//!
//! ACKs returned by the receiver are processed as soon as they arrive.  An
//! ACK is recorded only when it names a frame that is actually outstanding,
//! so a late ACK for an older use of the same sequence number cannot retire
//! a newer frame.

use std::collections::VecDeque;

use crate::channel::FaultModel;
use crate::config::ArqConfig;
use crate::engine::Protocol;
use crate::error::ConfigError;
use crate::frame::{Frame, FrameKind, SeqNum};
use crate::sr_receiver::SrReceiver;
use crate::stats::{Outcome, SenderStats, TxRecord};
use crate::timer::LogicalClock;
use crate::window::{to_seq, InFlight, SendWindow};

/// Selective Repeat send-side state.
#[derive(Debug)]
pub struct SrSender {
    window: SendWindow,
    /// Acknowledged sequence numbers not yet passed by `base`.
    acked: Vec<bool>,
    max_seq: u32,
    timeout_ticks: u64,
    max_iterations: u32,
    clock: LogicalClock,
    backlog: VecDeque<String>,
    stats: SenderStats,
    log: Vec<TxRecord>,
}

impl SrSender {
    pub fn new(config: &ArqConfig) -> Result<Self, ConfigError> {
        config.validate(Protocol::SelectiveRepeat)?;
        Ok(Self {
            window: SendWindow::new(config.window_size),
            acked: vec![false; config.max_seq as usize],
            max_seq: config.max_seq,
            timeout_ticks: config.timer.timeout_ticks,
            max_iterations: config.max_iterations,
            clock: LogicalClock::new(&config.timer),
            backlog: VecDeque::new(),
            stats: SenderStats::default(),
            log: Vec::new(),
        })
    }

    /// Queue payloads for the next [`send_all`](Self::send_all).
    pub fn add_data<I, S>(&mut self, payloads: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.backlog.len();
        self.backlog.extend(payloads.into_iter().map(Into::into));
        log::debug!("[sr] queued {} payload(s)", self.backlog.len() - before);
    }

    /// `true` when a new frame may be admitted right now.
    pub fn can_send(&self) -> bool {
        self.window.has_room() && !self.backlog.is_empty()
    }

    /// Send the whole backlog through `receiver`.
    ///
    /// Returns [`Outcome::Completed`] once every frame is acknowledged, or
    /// [`Outcome::IterationCapReached`] if the loop bound is hit first.
    pub fn send_all<F: FaultModel>(&mut self, receiver: &mut SrReceiver<F>) -> Outcome {
        log::info!(
            "[sr] sending {} payload(s), window {}",
            self.backlog.len(),
            self.window.capacity()
        );
        let mut iterations = 0u32;

        let outcome = loop {
            if self.is_done() {
                break Outcome::Completed;
            }
            if iterations >= self.max_iterations {
                log::warn!(
                    "[sr] iteration cap ({}) reached with {} frame(s) outstanding",
                    self.max_iterations,
                    self.window.outstanding()
                );
                break Outcome::IterationCapReached;
            }
            iterations += 1;
            self.step(receiver);
        };

        log::info!("[sr] run finished: {outcome} ({})", self.stats);
        outcome
    }

    /// One pass of the send loop: admit, retransmit expired frames, slide,
    /// then one idle tick.
    pub fn step<F: FaultModel>(&mut self, receiver: &mut SrReceiver<F>) {
        while self.can_send() {
            self.admit(receiver);
        }
        self.check_timeouts(receiver);
        self.slide_window();
        debug_assert!(self.window_invariant_holds());
        self.clock.advance(1);
    }

    /// `true` once the backlog is empty and every frame is acknowledged.
    pub fn is_done(&self) -> bool {
        self.backlog.is_empty() && self.window.is_empty()
    }

    /// `base <= next <= base + W`, and no more than `W` frames outstanding.
    pub fn window_invariant_holds(&self) -> bool {
        let (base, next) = (self.window.base(), self.window.next());
        let w = self.window.capacity();
        base <= next && next - base <= w as u64 && self.window.outstanding() <= w
    }

    /// Record an ACK for `seq`.
    ///
    /// Returns `false` (and records nothing) when no outstanding instance
    /// carries that sequence number.
    pub fn process_ack(&mut self, seq: SeqNum) -> bool {
        let Some(instance) = self.window.instance_for(seq, self.max_seq) else {
            log::debug!("[sr] ← ACK seq={seq} matches nothing outstanding; ignored");
            return false;
        };
        if self.acked[seq as usize] {
            log::debug!("[sr] ← ACK seq={seq} (duplicate)");
        } else {
            log::debug!("[sr] ← ACK seq={seq}");
        }
        self.acked[seq as usize] = true;
        self.window.remove(instance);
        true
    }

    /// Move `base` past every acknowledged frame at the left window edge.
    ///
    /// Returns how far the window slid.
    pub fn slide_window(&mut self) -> usize {
        let mut slid = 0;
        while self.window.base() < self.window.next() {
            let seq = to_seq(self.window.base(), self.max_seq);
            if !self.acked[seq as usize] {
                break;
            }
            self.acked[seq as usize] = false;
            self.window.advance_base(self.window.base() + 1);
            slid += 1;
        }
        if slid > 0 {
            log::debug!(
                "[sr] window slid by {slid}; base → {}",
                to_seq(self.window.base(), self.max_seq)
            );
        }
        slid
    }

    fn admit<F: FaultModel>(&mut self, receiver: &mut SrReceiver<F>) {
        let Some(payload) = self.backlog.pop_front() else {
            return;
        };
        let frame = Frame::data(to_seq(self.window.next(), self.max_seq), payload);
        let instance = self.window.push(InFlight {
            frame,
            sent_at: self.clock.now(),
            tx_count: 0,
        });
        self.transmit(instance, receiver);
    }

    /// Retransmit every outstanding frame whose own timer has expired.
    fn check_timeouts<F: FaultModel>(&mut self, receiver: &mut SrReceiver<F>) {
        let expired: Vec<u64> = self
            .window
            .instances()
            .into_iter()
            .filter(|&i| {
                self.window
                    .get(i)
                    .is_some_and(|e| self.clock.expired(e.sent_at, self.timeout_ticks))
            })
            .collect();
        for instance in expired {
            // An ACK for an earlier retransmission may have retired it.
            if self.window.get(instance).is_some() {
                log::debug!(
                    "[sr] timeout on seq={}",
                    to_seq(instance, self.max_seq)
                );
                self.transmit(instance, receiver);
            }
        }
    }

    /// Put one transmission of `instance` on the channel and handle replies.
    ///
    /// Only this instance's timer is restarted.
    fn transmit<F: FaultModel>(&mut self, instance: u64, receiver: &mut SrReceiver<F>) {
        let tick = self.clock.on_transmit();
        let Some(entry) = self.window.get_mut(instance) else {
            return;
        };
        entry.sent_at = tick;
        entry.tx_count += 1;
        let retransmission = entry.tx_count > 1;
        let frame = entry.frame.clone();

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
        log::debug!(
            "[sr] → {frame}{}",
            if retransmission { " (retransmission)" } else { "" }
        );

        for reply in receiver.receive_frame(&frame) {
            if reply.kind == FrameKind::Ack {
                self.process_ack(reply.seq);
            }
        }
        debug_assert!(self.window_invariant_holds());
    }

    /// Oldest unacknowledged instance (left window edge).
    pub fn base(&self) -> u64 {
        self.window.base()
    }

    /// Instance number of the next new frame.
    pub fn next_instance(&self) -> u64 {
        self.window.next()
    }

    /// Number of frames awaiting acknowledgement.
    pub fn in_flight(&self) -> usize {
        self.window.outstanding()
    }

    /// Payloads not yet admitted to the window.
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
}
