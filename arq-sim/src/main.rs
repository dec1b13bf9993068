//! Entry point for `arq-sim`.
//!
//! Parses CLI arguments and runs either one protocol or the three-way
//! comparison.  All protocol work is delegated to the library; `main.rs`
//! owns only process setup (logging, argument parsing, output).

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use arq_sim::compare::{compare, numbered_payloads};
use arq_sim::timer::TimerConfig;
use arq_sim::{
    ArqConfig, ArqSession, ChannelConfig, ConfigError, Protocol, RandomChannel, ReliabilityEngine,
};

/// ARQ protocols over a simulated lossy channel.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Run one protocol and print its statistics.
    Run {
        #[arg(short, long, value_enum)]
        protocol: Protocol,
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Run all three protocols over identical input.
    Compare {
        #[command(flatten)]
        sim: SimArgs,
    },
}

#[derive(Args)]
struct SimArgs {
    /// Number of payloads (`Data1..N`).
    #[arg(short, long, default_value_t = 10)]
    frames: usize,
    /// Sender/receiver window size.
    #[arg(short, long, default_value_t = 4)]
    window: usize,
    /// Size of the sequence-number space.
    #[arg(long, default_value_t = 8)]
    max_seq: u32,
    /// Timeout in logical ticks.
    #[arg(short, long, default_value_t = 10)]
    timeout: u64,
    /// Channel seed; random when omitted.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Data-frame loss probability (default 0.15, 0.20 for Stop-and-Wait).
    #[arg(long)]
    loss: Option<f64>,
    /// Data-frame corruption probability.
    #[arg(long, default_value_t = 0.10)]
    corruption: f64,
    /// ACK loss probability.
    #[arg(long, default_value_t = 0.10)]
    ack_loss: f64,
    /// Wall-clock delay per transmission, in milliseconds.
    #[arg(long, default_value_t = 0)]
    pace_ms: u64,
}

impl SimArgs {
    fn arq_config(&self) -> ArqConfig {
        ArqConfig {
            window_size: self.window,
            max_seq: self.max_seq,
            timer: TimerConfig {
                timeout_ticks: self.timeout,
                pacing: Duration::from_millis(self.pace_ms),
            },
            ..ArqConfig::default()
        }
    }

    /// Channel rates; `loss` falls back to the per-protocol default.
    fn channel(&self, protocol: Option<Protocol>) -> ChannelConfig {
        let base = match protocol {
            Some(Protocol::StopAndWait) => ChannelConfig::stop_and_wait(),
            _ => ChannelConfig::default(),
        };
        ChannelConfig {
            corruption_rate: self.corruption,
            loss_rate: self.loss.unwrap_or(base.loss_rate),
            ack_loss_rate: self.ack_loss,
        }
    }

    /// Comparison seed; all three engines must share one, so draw it when
    /// none was given.
    fn shared_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    fn random_channel(&self, protocol: Protocol) -> Result<(RandomChannel, String), ConfigError> {
        let channel = self.channel(Some(protocol));
        match self.seed {
            Some(seed) => Ok((RandomChannel::seeded(channel, seed)?, format!("seed {seed}"))),
            None => Ok((RandomChannel::from_os_rng(channel)?, "unseeded".to_string())),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();

    match cli.mode {
        Mode::Run { protocol, sim } => {
            let payloads = numbered_payloads("Data", sim.frames);
            let (faults, seed_label) = sim
                .random_channel(protocol)
                .context("invalid channel configuration")?;
            let mut engine = ReliabilityEngine::new(protocol, &sim.arq_config(), faults)
                .with_context(|| format!("cannot build {protocol} engine"))?;

            log::info!("running {protocol} over {} payload(s), {seed_label}", payloads.len());
            let result = engine.run(&payloads);

            println!("{protocol} ({seed_label}): {}", result.outcome);
            println!("  sender:   {}", engine.sender_stats());
            println!("  receiver: {}", engine.receiver_stats());
            println!("  delivered: {}", result.delivered.join(" "));
        }
        Mode::Compare { sim } => {
            let seed = sim.shared_seed();
            let payloads = numbered_payloads("Data", sim.frames);
            let table = compare(&payloads, &sim.arq_config(), &sim.channel(None), seed)
                .context("cannot run comparison")?;
            println!("seed {seed}, {} payload(s)", payloads.len());
            print!("{table}");
        }
    }

    Ok(())
}
