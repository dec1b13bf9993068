//! Go-Back-N send-side state machine.
//!
//! [`GbnSender`] keeps up to `window_size` frames outstanding at once.
//!
//! # Protocol contract
//!
//! - New frames are admitted greedily while the backlog is non-empty and the
//!   window has room.
//! - ACKs are **cumulative**: an ACK for sequence number `a` retires every
//!   outstanding instance from `base` through the first one numbered `a`.
//! - When the oldest outstanding frame times out, it and **every frame after
//!   it** in the window are retransmitted, oldest first (go back N).
//! - Retransmissions draw from a run-wide budget.  Once it is spent with
//!   frames still outstanding the run ends; nothing else could elicit an ACK.

use std::collections::VecDeque;

use crate::channel::FaultModel;
use crate::config::ArqConfig;
use crate::engine::Protocol;
use crate::error::ConfigError;
use crate::frame::{Frame, FrameKind, SeqNum};
use crate::gbn_receiver::GbnReceiver;
use crate::stats::{Outcome, SenderStats, TxRecord};
use crate::timer::LogicalClock;
use crate::window::{to_seq, InFlight, SendWindow};

// ---------------------------------------------------------------------------
// GbnSender
// ---------------------------------------------------------------------------

/// Go-Back-N send-side state.
#[derive(Debug)]
pub struct GbnSender {
    window: SendWindow,
    max_seq: u32,
    timeout_ticks: u64,
    retransmission_budget: u32,
    /// Retransmissions spent over the sender's lifetime.
    budget_used: u32,
    max_iterations: u32,
    clock: LogicalClock,
    backlog: VecDeque<String>,
    stats: SenderStats,
    log: Vec<TxRecord>,
}

impl GbnSender {
    pub fn new(config: &ArqConfig) -> Result<Self, ConfigError> {
        config.validate(Protocol::GoBackN)?;
        Ok(Self {
            window: SendWindow::new(config.window_size),
            max_seq: config.max_seq,
            timeout_ticks: config.timer.timeout_ticks,
            retransmission_budget: config.retransmission_budget,
            budget_used: 0,
            max_iterations: config.max_iterations,
            clock: LogicalClock::new(&config.timer),
            backlog: VecDeque::new(),
            stats: SenderStats::default(),
            log: Vec::new(),
        })
    }

    /// Queue payloads for the next [`run`](Self::run).
    pub fn add_data<I, S>(&mut self, payloads: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.backlog.len();
        self.backlog.extend(payloads.into_iter().map(Into::into));
        log::debug!("[gbn] queued {} payload(s)", self.backlog.len() - before);
    }

    /// `true` when a new frame may be admitted right now.
    pub fn can_send(&self) -> bool {
        self.window.has_room() && !self.backlog.is_empty()
    }

    /// Send the whole backlog through `receiver`.
    ///
    /// Returns when every frame is acknowledged, the retransmission budget is
    /// spent, or the iteration cap is hit.
    pub fn run<F: FaultModel>(&mut self, receiver: &mut GbnReceiver<F>) -> Outcome {
        log::info!(
            "[gbn] sending {} payload(s), window {}",
            self.backlog.len(),
            self.window.capacity()
        );
        let mut iterations = 0u32;

        let outcome = loop {
            if self.backlog.is_empty() && self.window.is_empty() {
                break Outcome::Completed;
            }
            if iterations >= self.max_iterations {
                log::warn!("[gbn] iteration cap ({}) reached", self.max_iterations);
                break Outcome::IterationCapReached;
            }
            iterations += 1;

            while self.can_send() {
                self.admit(receiver);
            }

            if self.oldest_timed_out() {
                if self.budget_used >= self.retransmission_budget {
                    log::warn!(
                        "[gbn] retransmission budget ({}) exhausted with {} frame(s) outstanding",
                        self.retransmission_budget,
                        self.window.outstanding()
                    );
                    break Outcome::RetransmissionBudgetExhausted;
                }
                self.go_back_n(receiver);
            }

            debug_assert!(self.window.next() - self.window.base() <= self.window.capacity() as u64);
            self.clock.advance(1);
        };

        log::info!("[gbn] run finished: {outcome} ({})", self.stats);
        outcome
    }

    /// Process a cumulative ACK for `seq`.
    ///
    /// Retires every outstanding instance up to and including the first one
    /// numbered `seq` and returns how many were retired.  Returns `0` for an
    /// ACK that matches nothing outstanding (a repeated cumulative ACK).
    pub fn process_ack(&mut self, seq: SeqNum) -> usize {
        let Some(upto) = self.window.instance_for(seq, self.max_seq) else {
            log::debug!("[gbn] ← ACK seq={seq} (nothing new)");
            return 0;
        };
        let retired = self.window.advance_base(upto + 1);
        log::debug!(
            "[gbn] ← ACK seq={seq}; retired {retired}, base → {}",
            to_seq(self.window.base(), self.max_seq)
        );
        retired
    }

    fn admit<F: FaultModel>(&mut self, receiver: &mut GbnReceiver<F>) {
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

    fn oldest_timed_out(&self) -> bool {
        self.window
            .get(self.window.base())
            .is_some_and(|e| self.clock.expired(e.sent_at, self.timeout_ticks))
    }

    /// Retransmit the oldest outstanding frame and everything after it.
    fn go_back_n<F: FaultModel>(&mut self, receiver: &mut GbnReceiver<F>) {
        let batch = self.window.instances();
        log::debug!(
            "[gbn] timeout on seq={}; going back {} frame(s)",
            to_seq(self.window.base(), self.max_seq),
            batch.len()
        );
        for instance in batch {
            // An ACK earlier in this batch may already have retired it.
            if instance < self.window.base() {
                continue;
            }
            if self.budget_used >= self.retransmission_budget {
                log::warn!("[gbn] retransmission budget exhausted mid-batch");
                return;
            }
            self.budget_used += 1;
            self.transmit(instance, receiver);
        }
    }

    /// Put one transmission of `instance` on the channel and handle the reply.
    fn transmit<F: FaultModel>(&mut self, instance: u64, receiver: &mut GbnReceiver<F>) {
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
            "[gbn] → {frame}{}",
            if retransmission { " (retransmission)" } else { "" }
        );

        if let Some(reply) = receiver.receive_frame(&frame) {
            if reply.kind == FrameKind::Ack {
                self.process_ack(reply.seq);
            }
        }
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

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
