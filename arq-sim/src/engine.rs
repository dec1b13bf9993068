//! Protocol selection and the common run contract.
//!
//! Each protocol pairs a sender with its receiver; the receiver owns the
//! fault model, so one transmission is one call into the receiver and the
//! reply (if any) comes straight back.
//!
//! ```text
//!  ┌────────┐  frame   ┌───────────┐  carry()   ┌──────────┐
//!  │ sender │ ───────▶ │ receiver  │ ◀────────▶ │  faults  │
//!  │        │ ◀─────── │           │ carry_ack()│          │
//!  └────────┘  ACK     └───────────┘            └──────────┘
//! ```
//!
//! [`ReliabilityEngine`] is the closed set of protocol pairs; every pair
//! implements [`ArqSession`].

use std::fmt;

use clap::ValueEnum;

use crate::channel::FaultModel;
use crate::config::ArqConfig;
use crate::error::ConfigError;
use crate::gbn_receiver::GbnReceiver;
use crate::gbn_sender::GbnSender;
use crate::receiver::SwReceiver;
use crate::sender::SwSender;
use crate::sr_receiver::SrReceiver;
use crate::sr_sender::SrSender;
use crate::stats::{DeliveryResult, Outcome, ReceiverStats, SenderStats, TxRecord};

/// The ARQ protocols this crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Protocol {
    #[value(alias = "sw")]
    StopAndWait,
    #[value(alias = "gbn")]
    GoBackN,
    #[value(alias = "sr")]
    SelectiveRepeat,
}

impl Protocol {
    pub const ALL: [Protocol; 3] = [
        Protocol::StopAndWait,
        Protocol::GoBackN,
        Protocol::SelectiveRepeat,
    ];
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Protocol::StopAndWait => "Stop-and-Wait",
            Protocol::GoBackN => "Go-Back-N",
            Protocol::SelectiveRepeat => "Selective Repeat",
        })
    }
}

/// What every protocol pair offers a caller.
pub trait ArqSession {
    /// Send `payloads` through the channel and report what was delivered.
    ///
    /// State carries over between calls: a second run continues the
    /// sequence numbering and statistics of the first.
    fn run(&mut self, payloads: &[String]) -> DeliveryResult;

    fn sender_stats(&self) -> SenderStats;

    fn receiver_stats(&self) -> ReceiverStats;

    /// Everything delivered so far, in order.
    fn delivered(&self) -> &[String];

    /// Every data-frame transmission so far.
    fn transmissions(&self) -> &[TxRecord];
}

// ---------------------------------------------------------------------------
// Protocol pairs
// ---------------------------------------------------------------------------

/// Stop-and-Wait sender and receiver.
#[derive(Debug)]
pub struct StopAndWait<F> {
    pub sender: SwSender,
    pub receiver: SwReceiver<F>,
}

impl<F: FaultModel> StopAndWait<F> {
    pub fn new(config: &ArqConfig, faults: F) -> Result<Self, ConfigError> {
        Ok(Self {
            sender: SwSender::new(config)?,
            receiver: SwReceiver::new(faults),
        })
    }
}

impl<F: FaultModel> ArqSession for StopAndWait<F> {
    fn run(&mut self, payloads: &[String]) -> DeliveryResult {
        let failed_before = self.sender.stats().failed_frames;
        self.sender.add_data(payloads.iter().cloned());
        let outcome = if self.sender.run(&mut self.receiver) {
            Outcome::Completed
        } else {
            Outcome::FramesFailed(self.sender.stats().failed_frames - failed_before)
        };
        DeliveryResult {
            delivered: self.receiver.delivered().to_vec(),
            outcome,
        }
    }

    fn sender_stats(&self) -> SenderStats {
        self.sender.stats()
    }

    fn receiver_stats(&self) -> ReceiverStats {
        self.receiver.stats()
    }

    fn delivered(&self) -> &[String] {
        self.receiver.delivered()
    }

    fn transmissions(&self) -> &[TxRecord] {
        self.sender.transmissions()
    }
}

/// Go-Back-N sender and receiver.
#[derive(Debug)]
pub struct GoBackN<F> {
    pub sender: GbnSender,
    pub receiver: GbnReceiver<F>,
}

impl<F: FaultModel> GoBackN<F> {
    pub fn new(config: &ArqConfig, faults: F) -> Result<Self, ConfigError> {
        Ok(Self {
            sender: GbnSender::new(config)?,
            receiver: GbnReceiver::new(config, faults)?,
        })
    }
}

impl<F: FaultModel> ArqSession for GoBackN<F> {
    fn run(&mut self, payloads: &[String]) -> DeliveryResult {
        self.sender.add_data(payloads.iter().cloned());
        let outcome = self.sender.run(&mut self.receiver);
        DeliveryResult {
            delivered: self.receiver.delivered().to_vec(),
            outcome,
        }
    }

    fn sender_stats(&self) -> SenderStats {
        self.sender.stats()
    }

    fn receiver_stats(&self) -> ReceiverStats {
        self.receiver.stats()
    }

    fn delivered(&self) -> &[String] {
        self.receiver.delivered()
    }

    fn transmissions(&self) -> &[TxRecord] {
        self.sender.transmissions()
    }
}

/// Selective Repeat sender and receiver.
#[derive(Debug)]
pub struct SelectiveRepeat<F> {
    pub sender: SrSender,
    pub receiver: SrReceiver<F>,
}

impl<F: FaultModel> SelectiveRepeat<F> {
    pub fn new(config: &ArqConfig, faults: F) -> Result<Self, ConfigError> {
        Ok(Self {
            sender: SrSender::new(config)?,
            receiver: SrReceiver::new(config, faults)?,
        })
    }
}

impl<F: FaultModel> ArqSession for SelectiveRepeat<F> {
    fn run(&mut self, payloads: &[String]) -> DeliveryResult {
        self.sender.add_data(payloads.iter().cloned());
        let outcome = self.sender.send_all(&mut self.receiver);
        DeliveryResult {
            delivered: self.receiver.delivered().to_vec(),
            outcome,
        }
    }

    fn sender_stats(&self) -> SenderStats {
        self.sender.stats()
    }

    fn receiver_stats(&self) -> ReceiverStats {
        self.receiver.stats()
    }

    fn delivered(&self) -> &[String] {
        self.receiver.delivered()
    }

    fn transmissions(&self) -> &[TxRecord] {
        self.sender.transmissions()
    }
}

// ---------------------------------------------------------------------------
// ReliabilityEngine
// ---------------------------------------------------------------------------

/// One protocol pair, chosen at runtime.
#[derive(Debug)]
pub enum ReliabilityEngine<F> {
    StopAndWait(StopAndWait<F>),
    GoBackN(GoBackN<F>),
    SelectiveRepeat(SelectiveRepeat<F>),
}

impl<F: FaultModel> ReliabilityEngine<F> {
    /// Build a `protocol` engine whose channel behaves per `faults`.
    ///
    /// Fails when `config` is invalid for `protocol`.
    pub fn new(protocol: Protocol, config: &ArqConfig, faults: F) -> Result<Self, ConfigError> {
        log::debug!("building {protocol} engine: {config:?}");
        Ok(match protocol {
            Protocol::StopAndWait => Self::StopAndWait(StopAndWait::new(config, faults)?),
            Protocol::GoBackN => Self::GoBackN(GoBackN::new(config, faults)?),
            Protocol::SelectiveRepeat => {
                Self::SelectiveRepeat(SelectiveRepeat::new(config, faults)?)
            }
        })
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Self::StopAndWait(_) => Protocol::StopAndWait,
            Self::GoBackN(_) => Protocol::GoBackN,
            Self::SelectiveRepeat(_) => Protocol::SelectiveRepeat,
        }
    }

    fn session(&self) -> &dyn ArqSession {
        match self {
            Self::StopAndWait(e) => e,
            Self::GoBackN(e) => e,
            Self::SelectiveRepeat(e) => e,
        }
    }

    fn session_mut(&mut self) -> &mut dyn ArqSession {
        match self {
            Self::StopAndWait(e) => e,
            Self::GoBackN(e) => e,
            Self::SelectiveRepeat(e) => e,
        }
    }
}

impl<F: FaultModel> ArqSession for ReliabilityEngine<F> {
    fn run(&mut self, payloads: &[String]) -> DeliveryResult {
        self.session_mut().run(payloads)
    }

    fn sender_stats(&self) -> SenderStats {
        self.session().sender_stats()
    }

    fn receiver_stats(&self) -> ReceiverStats {
        self.session().receiver_stats()
    }

    fn delivered(&self) -> &[String] {
        self.session().delivered()
    }

    fn transmissions(&self) -> &[TxRecord] {
        self.session().transmissions()
    }
}
