//! `arq-sim`: Stop-and-Wait, Go-Back-N and Selective Repeat ARQ over a
//! simulated lossy channel.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────┐   DATA frames   ┌────────────┐
//!  │  Sender  │────────────────▶│  Receiver  │──▶ delivered payloads
//!  └────┬─────┘                 └─────┬──────┘
//!       │        ACK / NAK            │
//!       │◀────────────────────────────┘
//!       │                             │ carry() / carry_ack()
//!  ┌────▼─────────┐             ┌─────▼───────┐
//!  │ LogicalClock │             │ FaultModel  │  (loss, corruption, ACK loss)
//!  └──────────────┘             └─────────────┘
//! ```
//!
//! Each module has a single responsibility:
//! - [`frame`]: frame type, checksum, damaged copies
//! - [`channel`]: fault model trait and seeded random channel
//! - [`timer`]: logical clock and timeout configuration
//! - [`config`]: window / sequence-space / limit configuration
//! - [`error`]: configuration errors
//! - [`window`]: modular sequence arithmetic and the send-window arena
//! - [`state`]: per-frame state machine
//! - [`stats`]: counters, outcomes, transmission log
//! - [`sender`]: Stop-and-Wait outbound side
//! - [`receiver`]: Stop-and-Wait inbound side
//! - [`gbn_sender`]: Go-Back-N outbound window
//! - [`gbn_receiver`]: Go-Back-N inbound cumulative-ACK side
//! - [`sr_sender`]: Selective Repeat outbound window, per-frame timers
//! - [`sr_receiver`]: Selective Repeat reorder buffer
//! - [`engine`]: protocol selection and the common run contract
//! - [`compare`]: all three protocols over identical input

pub mod channel;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod gbn_receiver;
pub mod gbn_sender;
pub mod receiver;
pub mod sender;
pub mod sr_receiver;
pub mod sr_sender;
pub mod state;
pub mod stats;
pub mod timer;
pub mod window;

pub use channel::{ChannelConfig, FaultModel, RandomChannel};
pub use config::ArqConfig;
pub use engine::{ArqSession, Protocol, ReliabilityEngine};
pub use error::ConfigError;
pub use frame::{Frame, FrameKind, SeqNum};
pub use stats::{DeliveryResult, Outcome, ReceiverStats, SenderStats, TxRecord};
