//! Integration tests for the Stop-and-Wait engine.

mod common;

use arq_sim::engine::StopAndWait;
use arq_sim::state::FrameState;
use arq_sim::{ArqConfig, ArqSession, Outcome};
use common::{payloads, ScriptedFaults};

fn engine(faults: ScriptedFaults) -> StopAndWait<ScriptedFaults> {
    StopAndWait::new(&ArqConfig::default(), faults).expect("valid config")
}

// ---------------------------------------------------------------------------
// Clean channel
// ---------------------------------------------------------------------------

#[test]
fn test_sw_clean_channel() {
    let mut e = engine(ScriptedFaults::none());
    let words: Vec<String> = ["Hello", "World", "Stop", "Wait"]
        .map(String::from)
        .to_vec();
    let result = e.run(&words);

    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.delivered, words);
    assert_eq!(e.sender_stats().total_transmissions, 4);
    assert_eq!(e.sender.seq(), 0); // toggled four times
}

// ---------------------------------------------------------------------------
// Recovery from each fault kind
// ---------------------------------------------------------------------------

#[test]
fn test_sw_lost_frame_retransmitted() {
    let mut e = engine(ScriptedFaults::none().lose_nth(1));
    let result = e.run(&payloads(2));

    assert!(result.is_complete());
    assert_eq!(result.delivered, payloads(2));
    assert_eq!(e.sender_stats().total_transmissions, 3);
    assert_eq!(e.sender_stats().retransmissions, 1);
}

#[test]
fn test_sw_corrupted_frame_naked_and_resent() {
    let mut e = engine(ScriptedFaults::none().corrupt_nth(1));
    let result = e.run(&payloads(1));

    assert!(result.is_complete());
    assert_eq!(result.delivered, payloads(1));
    assert_eq!(e.sender_stats().retransmissions, 1);
    assert_eq!(e.receiver_stats().frames_discarded, 1);
}

#[test]
fn test_sw_lost_ack_not_redelivered() {
    let mut e = engine(ScriptedFaults::none().drop_ack_nth(1));
    let result = e.run(&payloads(2));

    assert!(result.is_complete());
    assert_eq!(result.delivered, payloads(2));
    assert_eq!(e.receiver_stats().duplicates, 1);
    assert_eq!(e.sender_stats().retransmissions, 1);
}

// ---------------------------------------------------------------------------
// Attempt limit
// ---------------------------------------------------------------------------

#[test]
fn test_sw_gives_up_after_max_attempts() {
    let mut faults = ScriptedFaults::none();
    for n in 1..=5 {
        faults = faults.lose_nth(n);
    }
    let mut e = engine(faults);
    let result = e.run(&payloads(2));

    assert_eq!(result.outcome, Outcome::FramesFailed(1));
    // Data1 abandoned; Data2 still goes through.
    assert_eq!(result.delivered, ["Data2"]);
    assert_eq!(e.sender_stats().failed_frames, 1);
    assert_eq!(e.sender_stats().total_transmissions, 6);
    assert_eq!(e.sender.state(), FrameState::Acked);
}

#[test]
fn test_sw_failed_counts_unacknowledged_not_undelivered() {
    // Data1 arrives but all five of its ACKs are lost.
    let mut faults = ScriptedFaults::none();
    for n in 1..=5 {
        faults = faults.drop_ack_nth(n);
    }
    let mut e = engine(faults);
    let result = e.run(&payloads(3));

    assert_eq!(result.outcome, Outcome::FramesFailed(1));
    // Data2 reuses bit 0, is re-ACKed as a duplicate and never delivered.
    assert_eq!(result.delivered, ["Data1", "Data3"]);
    assert_eq!(e.receiver_stats().duplicates, 5);
    assert_eq!(e.sender_stats().total_transmissions, 7);
}

#[test]
fn test_sw_delivery_never_duplicates() {
    // Drop every other ACK.
    let mut faults = ScriptedFaults::none();
    for n in (1..40).step_by(2) {
        faults = faults.drop_ack_nth(n);
    }
    let mut e = engine(faults);
    let result = e.run(&payloads(8));

    assert!(result.is_complete());
    assert_eq!(result.delivered, payloads(8));
}
