//! Sequence-space arithmetic and the sender-side window arena.
//!
//! Senders number frame *instances* with an unbounded `u64` counter and put
//! only `instance % max_seq` on the wire.  Keeping the unbounded number on the
//! sender side distinguishes two frames that share a modular number after
//! wrap-around.
//!
//! ```text
//!        base                 next          base + capacity
//!          │                    │                  │
//!  ────────┼────────────────────┼──────────────────┼────▶ instances
//!          │ <── outstanding ──▶│ <── sendable ───▶│
//! ```
//!
//! [`SendWindow`] stores in-flight entries in a fixed ring of `capacity`
//! slots indexed by `instance % capacity`.  Every live instance lies in
//! `[base, base + capacity)`, so the index is unique and slots are reused as
//! the window slides.

use crate::frame::{Frame, SeqNum};

/// Reduce an unbounded instance number to its wire sequence number.
#[inline]
pub fn to_seq(instance: u64, max_seq: u32) -> SeqNum {
    (instance % u64::from(max_seq)) as SeqNum
}

/// Forward distance from `from` to `to` in a space of `max_seq` numbers.
#[inline]
pub fn seq_distance(from: SeqNum, to: SeqNum, max_seq: u32) -> u32 {
    let m = u64::from(max_seq);
    ((u64::from(to) + m - u64::from(from) % m) % m) as u32
}

/// `true` when `seq` lies in the `len`-wide window starting at `start`,
/// wrapping around the end of the sequence space.
#[inline]
pub fn in_window(seq: SeqNum, start: SeqNum, len: usize, max_seq: u32) -> bool {
    (seq_distance(start, seq, max_seq) as usize) < len
}

/// A frame that has been sent and not yet acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    /// The frame exactly as first transmitted.
    pub frame: Frame,
    /// Tick of the most recent transmission (this frame's timer).
    pub sent_at: u64,
    /// Number of times this frame has been transmitted (1 = first send).
    pub tx_count: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    instance: u64,
    entry: InFlight,
}

/// Fixed-capacity arena of in-flight frames keyed by instance number.
#[derive(Debug, Clone)]
pub struct SendWindow {
    slots: Vec<Option<Slot>>,
    base: u64,
    next: u64,
}

impl SendWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "window capacity must be at least 1");
        Self {
            slots: vec![None; capacity],
            base: 0,
            next: 0,
        }
    }

    /// Oldest instance not yet retired (left window edge).
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Instance number the next admitted frame will get.
    pub fn next(&self) -> u64 {
        self.next
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// `true` when another frame may be admitted.
    pub fn has_room(&self) -> bool {
        self.next < self.base + self.slots.len() as u64
    }

    /// Number of entries still awaiting acknowledgement.
    pub fn outstanding(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// `true` when no entry awaits acknowledgement.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    fn index(&self, instance: u64) -> usize {
        (instance % self.slots.len() as u64) as usize
    }

    /// Admit `entry` as instance `next` and return that instance number.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when the window is full.  Check
    /// [`has_room`](Self::has_room) first.
    pub fn push(&mut self, entry: InFlight) -> u64 {
        debug_assert!(
            self.has_room(),
            "push on a full window (base={}, next={}, capacity={})",
            self.base,
            self.next,
            self.slots.len()
        );
        let instance = self.next;
        let idx = self.index(instance);
        self.slots[idx] = Some(Slot { instance, entry });
        self.next += 1;
        instance
    }

    pub fn get(&self, instance: u64) -> Option<&InFlight> {
        match &self.slots[self.index(instance)] {
            Some(slot) if slot.instance == instance => Some(&slot.entry),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, instance: u64) -> Option<&mut InFlight> {
        let idx = self.index(instance);
        match &mut self.slots[idx] {
            Some(slot) if slot.instance == instance => Some(&mut slot.entry),
            _ => None,
        }
    }

    /// Remove the entry for `instance`, leaving `base` untouched.
    pub fn remove(&mut self, instance: u64) -> Option<InFlight> {
        let idx = self.index(instance);
        match &self.slots[idx] {
            Some(slot) if slot.instance == instance => self.slots[idx].take().map(|s| s.entry),
            _ => None,
        }
    }

    /// Retire every instance below `to`, dropping their entries.
    ///
    /// Returns the number of entries dropped.  `to` is clamped to `next`.
    pub fn advance_base(&mut self, to: u64) -> usize {
        let to = to.min(self.next);
        let mut dropped = 0;
        while self.base < to {
            if self.remove(self.base).is_some() {
                dropped += 1;
            }
            self.base += 1;
        }
        dropped
    }

    /// Smallest instance in `[base, next)` whose wire number is `seq`.
    pub fn instance_for(&self, seq: SeqNum, max_seq: u32) -> Option<u64> {
        (self.base..self.next).find(|&i| to_seq(i, max_seq) == seq)
    }

    /// Instances that still hold an entry, oldest first.
    pub fn instances(&self) -> Vec<u64> {
        (self.base..self.next)
            .filter(|&i| self.get(i).is_some())
            .collect()
    }
}
