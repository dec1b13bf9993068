//! Side-by-side runs of all three protocols over identical input.

use std::fmt;

use crate::channel::{ChannelConfig, RandomChannel};
use crate::config::ArqConfig;
use crate::engine::{ArqSession, Protocol, ReliabilityEngine};
use crate::error::ConfigError;
use crate::stats::{Outcome, ReceiverStats, SenderStats};

/// Payloads `"{prefix}1"` through `"{prefix}{n}"`.
pub fn numbered_payloads(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{prefix}{i}")).collect()
}

/// Result of one protocol in a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub protocol: Protocol,
    pub sender: SenderStats,
    pub receiver: ReceiverStats,
    pub outcome: Outcome,
    /// Delivered sequence equals the input.
    pub delivered_all: bool,
}

/// Rows for every protocol, printable as a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
}

/// Run every protocol over `payloads`.
///
/// Each engine gets its own [`RandomChannel`] seeded with `seed`.  When
/// `channel` is the default channel, Stop-and-Wait runs with the
/// [`ChannelConfig::stop_and_wait`] loss rate instead.
pub fn compare(
    payloads: &[String],
    config: &ArqConfig,
    channel: &ChannelConfig,
    seed: u64,
) -> Result<Comparison, ConfigError> {
    let mut rows = Vec::with_capacity(Protocol::ALL.len());
    for protocol in Protocol::ALL {
        let channel = match protocol {
            Protocol::StopAndWait if *channel == ChannelConfig::default() => {
                ChannelConfig::stop_and_wait()
            }
            _ => channel.clone(),
        };
        let faults = RandomChannel::seeded(channel, seed)?;
        let mut engine = ReliabilityEngine::new(protocol, config, faults)?;
        let result = engine.run(payloads);
        rows.push(ComparisonRow {
            protocol,
            sender: engine.sender_stats(),
            receiver: engine.receiver_stats(),
            outcome: result.outcome,
            delivered_all: result.delivered == payloads,
        });
    }
    Ok(Comparison { rows })
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<18} {:>6} {:>8} {:>11} {:>9} {:>10}  outcome",
            "protocol", "sent", "resent", "efficiency", "delivered", "duplicates"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<18} {:>6} {:>8} {:>10.1}% {:>9} {:>10}  {}",
                row.protocol.to_string(),
                row.sender.total_transmissions,
                row.sender.retransmissions,
                row.sender.efficiency(),
                row.receiver.frames_delivered,
                row.receiver.duplicates,
                row.outcome
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_payloads_start_at_one() {
        assert_eq!(numbered_payloads("Data", 3), ["Data1", "Data2", "Data3"]);
        assert!(numbered_payloads("Data", 0).is_empty());
    }

    #[test]
    fn ideal_channel_all_protocols_perfect() {
        let payloads = numbered_payloads("Data", 5);
        let cmp = compare(&payloads, &ArqConfig::default(), &ChannelConfig::ideal(), 1).unwrap();
        assert_eq!(cmp.rows.len(), 3);
        for row in &cmp.rows {
            assert!(row.delivered_all, "{}", row.protocol);
            assert_eq!(row.sender.total_transmissions, 5);
            assert_eq!(row.outcome, Outcome::Completed);
        }
    }

    #[test]
    fn same_seed_same_table() {
        let payloads = numbered_payloads("Data", 10);
        let cfg = ArqConfig::default();
        let a = compare(&payloads, &cfg, &ChannelConfig::default(), 42).unwrap();
        let b = compare(&payloads, &cfg, &ChannelConfig::default(), 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn table_has_header_and_one_line_per_protocol() {
        let payloads = numbered_payloads("Data", 2);
        let cmp = compare(&payloads, &ArqConfig::default(), &ChannelConfig::ideal(), 0).unwrap();
        let table = cmp.to_string();
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("Selective Repeat"));
    }

    #[test]
    fn invalid_window_surfaces_error() {
        let cfg = ArqConfig {
            window_size: 5,
            ..ArqConfig::default()
        };
        let payloads = numbered_payloads("Data", 1);
        assert!(compare(&payloads, &cfg, &ChannelConfig::ideal(), 0).is_err());
    }
}
