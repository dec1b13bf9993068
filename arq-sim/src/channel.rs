//! Fault-injecting channel between a sender and its receiver.
//!
//! Real links drop and damage frames.  To exercise the reliability
//! mechanisms without a network, every receiver owns a [`FaultModel`] that
//! decides, per transmitted unit, what happens to it in transit:
//!
//! | Fault       | Default rate | Effect                                        |
//! |-------------|--------------|-----------------------------------------------|
//! | Loss        | 15% (20% SW) | The data frame never reaches the receiver.    |
//! | Corruption  | 10%          | The frame arrives with a damaged checksum.    |
//! | ACK loss    | 10%          | The receiver's acknowledgement is dropped.    |
//!
//! [`RandomChannel`] draws from its own seeded generator, so two engines
//! built with the same seed see the same fault sequence and never perturb
//! each other.  Tests plug in scripted models through the same trait.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;
use crate::frame::Frame;

/// Decides the fate of each unit crossing the channel.
///
/// Each method consumes one decision; callers invoke them in a fixed order
/// (`lost`, then `corrupt`, then `ack_lost` if an ACK is produced) so a
/// seeded model yields reproducible runs.
pub trait FaultModel {
    /// `true` when the data frame is damaged in transit.
    fn corrupt(&mut self) -> bool;

    /// `true` when the data frame is dropped in transit.
    fn lost(&mut self) -> bool;

    /// `true` when the acknowledgement is dropped on the way back.
    fn ack_lost(&mut self) -> bool;

    /// Carry `frame` across the channel.
    ///
    /// Returns `None` when the frame is lost, otherwise the frame as the
    /// receiver sees it (possibly with a damaged checksum).
    fn carry(&mut self, frame: &Frame) -> Option<Frame> {
        if self.lost() {
            return None;
        }
        if self.corrupt() {
            Some(frame.with_bit_error())
        } else {
            Some(frame.clone())
        }
    }

    /// Carry a control frame back to the sender, or drop it.
    fn carry_ack(&mut self, ack: Frame) -> Option<Frame> {
        if self.ack_lost() {
            None
        } else {
            Some(ack)
        }
    }
}

impl<F: FaultModel + ?Sized> FaultModel for Box<F> {
    fn corrupt(&mut self) -> bool {
        (**self).corrupt()
    }

    fn lost(&mut self) -> bool {
        (**self).lost()
    }

    fn ack_lost(&mut self) -> bool {
        (**self).ack_lost()
    }
}

/// Fault probabilities, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    /// Probability that a data frame arrives corrupted.
    pub corruption_rate: f64,
    /// Probability that a data frame is dropped.
    pub loss_rate: f64,
    /// Probability that an acknowledgement is dropped.
    pub ack_loss_rate: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            corruption_rate: 0.10,
            loss_rate: 0.15,
            ack_loss_rate: 0.10,
        }
    }
}

impl ChannelConfig {
    /// Default rates with the higher data-loss rate used for Stop-and-Wait.
    pub fn stop_and_wait() -> Self {
        Self {
            loss_rate: 0.20,
            ..Self::default()
        }
    }

    /// A channel that never loses or damages anything.
    pub fn ideal() -> Self {
        Self {
            corruption_rate: 0.0,
            loss_rate: 0.0,
            ack_loss_rate: 0.0,
        }
    }

    /// Reject probabilities outside `[0, 1]` (including NaN).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("corruption", self.corruption_rate),
            ("loss", self.loss_rate),
            ("ack loss", self.ack_loss_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        Ok(())
    }
}

/// Probabilistic fault model backed by a private, seedable generator.
#[derive(Debug, Clone)]
pub struct RandomChannel {
    config: ChannelConfig,
    rng: StdRng,
}

impl RandomChannel {
    /// Reproducible channel: the same `seed` yields the same fault sequence.
    pub fn seeded(config: ChannelConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Channel seeded from the operating system's entropy source.
    pub fn from_os_rng(config: ChannelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: StdRng::from_os_rng(),
        })
    }
}

impl FaultModel for RandomChannel {
    fn corrupt(&mut self) -> bool {
        self.rng.random_bool(self.config.corruption_rate)
    }

    fn lost(&mut self) -> bool {
        self.rng.random_bool(self.config.loss_rate)
    }

    fn ack_lost(&mut self) -> bool {
        self.rng.random_bool(self.config.ack_loss_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(ch: &mut RandomChannel, n: usize) -> Vec<(bool, bool, bool)> {
        (0..n)
            .map(|_| (ch.lost(), ch.corrupt(), ch.ack_lost()))
            .collect()
    }

    #[test]
    fn same_seed_same_faults() {
        let mut a = RandomChannel::seeded(ChannelConfig::default(), 42).unwrap();
        let mut b = RandomChannel::seeded(ChannelConfig::default(), 42).unwrap();
        assert_eq!(draw(&mut a, 200), draw(&mut b, 200));
    }

    #[test]
    fn ideal_channel_never_faults() {
        let mut ch = RandomChannel::seeded(ChannelConfig::ideal(), 7).unwrap();
        assert!(draw(&mut ch, 500)
            .iter()
            .all(|&(l, c, a)| !l && !c && !a));
    }

    #[test]
    fn certain_loss_always_drops() {
        let cfg = ChannelConfig {
            loss_rate: 1.0,
            ..ChannelConfig::ideal()
        };
        let mut ch = RandomChannel::seeded(cfg, 1).unwrap();
        let f = Frame::data(0, "x");
        for _ in 0..50 {
            assert!(ch.carry(&f).is_none());
        }
    }

    #[test]
    fn certain_corruption_damages_copy() {
        let cfg = ChannelConfig {
            corruption_rate: 1.0,
            ..ChannelConfig::ideal()
        };
        let mut ch = RandomChannel::seeded(cfg, 1).unwrap();
        let f = Frame::data(0, "payload");
        let seen = ch.carry(&f).expect("not lost");
        assert!(!seen.is_intact());
        assert!(f.is_intact());
    }

    #[test]
    fn certain_ack_loss_drops_acks() {
        let cfg = ChannelConfig {
            ack_loss_rate: 1.0,
            ..ChannelConfig::ideal()
        };
        let mut ch = RandomChannel::seeded(cfg, 1).unwrap();
        assert!(ch.carry_ack(Frame::ack(3)).is_none());
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let cfg = ChannelConfig {
            loss_rate: 1.5,
            ..ChannelConfig::default()
        };
        assert_eq!(
            RandomChannel::seeded(cfg, 0).unwrap_err(),
            ConfigError::InvalidProbability {
                name: "loss",
                value: 1.5
            }
        );
        let nan = ChannelConfig {
            corruption_rate: f64::NAN,
            ..ChannelConfig::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn os_seeded_channel_honours_rates() {
        let cfg = ChannelConfig {
            loss_rate: 1.0,
            ..ChannelConfig::ideal()
        };
        let mut ch = RandomChannel::from_os_rng(cfg).unwrap();
        assert!(ch.carry(&Frame::data(1, "x")).is_none());
        assert!(!ch.ack_lost());

        let bad = ChannelConfig {
            ack_loss_rate: -0.1,
            ..ChannelConfig::default()
        };
        assert!(RandomChannel::from_os_rng(bad).is_err());
    }

    #[test]
    fn stop_and_wait_preset_raises_loss() {
        let cfg = ChannelConfig::stop_and_wait();
        assert_eq!(cfg.loss_rate, 0.20);
        assert_eq!(cfg.corruption_rate, 0.10);
        assert_eq!(cfg.ack_loss_rate, 0.10);
    }
}
