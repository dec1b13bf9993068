//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;

use arq_sim::FaultModel;

/// Fault model that fails exactly the calls it is told to.
///
/// Calls are counted per decision kind, starting at 1: `lose_nth(3)` drops the
/// data frame on the third `lost()` query, whichever frame that turns out
/// to be.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFaults {
    lose: HashSet<u64>,
    corrupt: HashSet<u64>,
    drop_ack: HashSet<u64>,
    lost_calls: u64,
    corrupt_calls: u64,
    ack_calls: u64,
}

impl ScriptedFaults {
    /// A perfect channel.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn lose_nth(mut self, nth: u64) -> Self {
        self.lose.insert(nth);
        self
    }

    pub fn corrupt_nth(mut self, nth: u64) -> Self {
        self.corrupt.insert(nth);
        self
    }

    pub fn drop_ack_nth(mut self, nth: u64) -> Self {
        self.drop_ack.insert(nth);
        self
    }
}

impl FaultModel for ScriptedFaults {
    fn corrupt(&mut self) -> bool {
        self.corrupt_calls += 1;
        self.corrupt.contains(&self.corrupt_calls)
    }

    fn lost(&mut self) -> bool {
        self.lost_calls += 1;
        self.lose.contains(&self.lost_calls)
    }

    fn ack_lost(&mut self) -> bool {
        self.ack_calls += 1;
        self.drop_ack.contains(&self.ack_calls)
    }
}

/// Payloads `Data1..=n`.
pub fn payloads(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Data{i}")).collect()
}
