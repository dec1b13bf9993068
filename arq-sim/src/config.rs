//! Engine configuration and construction-time validation.

use crate::engine::Protocol;
use crate::error::ConfigError;
use crate::timer::TimerConfig;

/// Window, sequence-space, timer and budget settings shared by all engines.
///
/// Stop-and-Wait ignores `window_size` and `max_seq` (it always runs a
/// 1-bit sequence space with one outstanding frame).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArqConfig {
    /// Frames the sender may have outstanding (and the receiver may buffer).
    pub window_size: usize,
    /// Size of the modular sequence space.
    pub max_seq: u32,
    pub timer: TimerConfig,
    /// Stop-and-Wait: transmission attempts per frame before giving up.
    pub max_attempts: u32,
    /// Go-Back-N: retransmissions allowed over a whole run.
    pub retransmission_budget: u32,
    /// Windowed engines: defensive bound on sender loop passes.
    pub max_iterations: u32,
}

impl Default for ArqConfig {
    fn default() -> Self {
        Self {
            window_size: 4,
            max_seq: 8,
            timer: TimerConfig::default(),
            max_attempts: 5,
            retransmission_budget: 10,
            max_iterations: 1000,
        }
    }
}

impl ArqConfig {
    /// Check that this configuration yields a correct `protocol` engine.
    ///
    /// Selective Repeat needs `window_size <= max_seq / 2` so that a
    /// retransmitted old frame can never be mistaken for a new one; Go-Back-N
    /// only needs `window_size < max_seq`.
    pub fn validate(&self, protocol: Protocol) -> Result<(), ConfigError> {
        if self.timer.timeout_ticks == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        match protocol {
            Protocol::StopAndWait => {
                if self.max_attempts == 0 {
                    return Err(ConfigError::ZeroLimit("max_attempts"));
                }
            }
            Protocol::GoBackN | Protocol::SelectiveRepeat => {
                if self.window_size == 0 {
                    return Err(ConfigError::ZeroWindow);
                }
                if self.max_seq < 2 {
                    return Err(ConfigError::SequenceSpaceTooSmall(self.max_seq));
                }
                if self.max_iterations == 0 {
                    return Err(ConfigError::ZeroLimit("max_iterations"));
                }
                let limit = match protocol {
                    Protocol::SelectiveRepeat => (self.max_seq / 2) as usize,
                    _ => (self.max_seq - 1) as usize,
                };
                if self.window_size > limit {
                    return Err(ConfigError::WindowTooLarge {
                        protocol,
                        window: self.window_size,
                        max_seq: self.max_seq,
                        limit,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_for_every_protocol() {
        let cfg = ArqConfig::default();
        for p in Protocol::ALL {
            cfg.validate(p).unwrap();
        }
    }

    #[test]
    fn selective_repeat_window_limited_to_half_space() {
        let cfg = ArqConfig {
            window_size: 5,
            ..ArqConfig::default()
        };
        assert_eq!(
            cfg.validate(Protocol::SelectiveRepeat),
            Err(ConfigError::WindowTooLarge {
                protocol: Protocol::SelectiveRepeat,
                window: 5,
                max_seq: 8,
                limit: 4,
            })
        );
        // Go-Back-N tolerates up to max_seq - 1.
        cfg.validate(Protocol::GoBackN).unwrap();
    }

    #[test]
    fn go_back_n_window_must_stay_below_space() {
        let cfg = ArqConfig {
            window_size: 8,
            ..ArqConfig::default()
        };
        assert!(matches!(
            cfg.validate(Protocol::GoBackN),
            Err(ConfigError::WindowTooLarge { limit: 7, .. })
        ));
    }

    #[test]
    fn zero_window_rejected() {
        let cfg = ArqConfig {
            window_size: 0,
            ..ArqConfig::default()
        };
        assert_eq!(cfg.validate(Protocol::GoBackN), Err(ConfigError::ZeroWindow));
        // Stop-and-Wait has no window to configure.
        cfg.validate(Protocol::StopAndWait).unwrap();
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut cfg = ArqConfig::default();
        cfg.timer.timeout_ticks = 0;
        for p in Protocol::ALL {
            assert_eq!(cfg.validate(p), Err(ConfigError::ZeroTimeout));
        }
    }

    #[test]
    fn tiny_sequence_space_rejected() {
        let cfg = ArqConfig {
            max_seq: 1,
            window_size: 1,
            ..ArqConfig::default()
        };
        assert_eq!(
            cfg.validate(Protocol::SelectiveRepeat),
            Err(ConfigError::SequenceSpaceTooSmall(1))
        );
    }

    #[test]
    fn zero_limits_rejected() {
        let cfg = ArqConfig {
            max_attempts: 0,
            max_iterations: 0,
            ..ArqConfig::default()
        };
        assert_eq!(
            cfg.validate(Protocol::StopAndWait),
            Err(ConfigError::ZeroLimit("max_attempts"))
        );
        assert_eq!(
            cfg.validate(Protocol::SelectiveRepeat),
            Err(ConfigError::ZeroLimit("max_iterations"))
        );
    }
}
