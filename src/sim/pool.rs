//! Fixed-capacity entity pools
//!
//! Nothing in here allocates. Queues and tables are plain arrays sized at
//! compile time; overflow is absorbed by a per-pool policy and counted.

use serde::{Deserialize, Serialize};

/// What a full ring queue does with a new entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Retire the oldest entry to make room
    OverwriteOldest,
    /// Discard the new entry
    DropNewest,
}

/// Overflow counters for a pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Entries retired early to make room for a newer one
    pub overwritten: u32,
    /// Insert requests that were discarded
    pub dropped: u32,
}

/// FIFO ring queue over `SLOTS` array slots
///
/// One slot always stays unused so that `head == tail` means empty, which
/// gives a usable capacity of `SLOTS - 1`.
#[derive(Debug, Clone, Copy)]
pub struct RingQueue<T: Copy + Default, const SLOTS: usize> {
    items: [T; SLOTS],
    head: usize,
    tail: usize,
    policy: OverflowPolicy,
    stats: PoolStats,
}

impl<T: Copy + Default, const SLOTS: usize> RingQueue<T, SLOTS> {
    pub fn new(policy: OverflowPolicy) -> Self {
        assert!(SLOTS >= 2, "ring queue needs at least two slots");
        Self {
            items: [T::default(); SLOTS],
            head: 0,
            tail: 0,
            policy,
            stats: PoolStats::default(),
        }
    }

    /// Maximum number of live entries
    pub const fn capacity(&self) -> usize {
        SLOTS - 1
    }

    pub fn len(&self) -> usize {
        (self.tail + SLOTS - self.head) % SLOTS
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        (self.tail + 1) % SLOTS == self.head
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Append an entry at the tail, applying the overflow policy when full.
    ///
    /// Returns false if the entry was discarded.
    pub fn push(&mut self, item: T) -> bool {
        if self.is_full() {
            match self.policy {
                OverflowPolicy::DropNewest => {
                    self.stats.dropped += 1;
                    return false;
                }
                OverflowPolicy::OverwriteOldest => {
                    self.head = (self.head + 1) % SLOTS;
                    self.stats.overwritten += 1;
                }
            }
        }
        self.items[self.tail] = item;
        self.tail = (self.tail + 1) % SLOTS;
        true
    }

    /// Remove and return the oldest entry
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.items[self.head];
        self.head = (self.head + 1) % SLOTS;
        Some(item)
    }

    pub fn front(&self) -> Option<&T> {
        (!self.is_empty()).then(|| &self.items[self.head])
    }

    /// Drop every entry `keep` rejects, closing the gaps in place. Survivors
    /// stay in order and the head does not move. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let len = self.len();
        let mut kept = 0;
        for i in 0..len {
            let item = self.items[(self.head + i) % SLOTS];
            if keep(&item) {
                self.items[(self.head + kept) % SLOTS] = item;
                kept += 1;
            }
        }
        self.tail = (self.head + kept) % SLOTS;
        len - kept
    }

    /// Live entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (head, len) = (self.head, self.len());
        (0..len).map(move |i| &self.items[(head + i) % SLOTS])
    }

    /// Live entries, oldest first
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        let (front, back) = if self.head <= self.tail {
            let (_, rest) = self.items.split_at_mut(self.head);
            let (live, _) = rest.split_at_mut(self.tail - self.head);
            (live, Default::default())
        } else {
            let (wrapped, rest) = self.items.split_at_mut(self.head);
            (rest, &mut wrapped[..self.tail])
        };
        front.iter_mut().chain(back.iter_mut())
    }
}

/// Anything that can sit in a [`SlotTable`]
pub trait Slot: Copy + Default {
    fn is_free(&self) -> bool;
}

/// Fixed array addressed by slot index, with a forward free-slot scan
#[derive(Debug, Clone, Copy)]
pub struct SlotTable<T: Slot, const N: usize> {
    slots: [T; N],
    cursor: usize,
    stats: PoolStats,
}

impl<T: Slot, const N: usize> Default for SlotTable<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Slot, const N: usize> SlotTable<T, N> {
    pub fn new() -> Self {
        Self {
            slots: [T::default(); N],
            cursor: 0,
            stats: PoolStats::default(),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_free()).count()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Store `item` in the first free slot found scanning forward from the
    /// last-used index, wrapping. A full table drops the request.
    pub fn insert(&mut self, item: T) -> Option<usize> {
        for step in 0..N {
            let index = (self.cursor + step) % N;
            if self.slots[index].is_free() {
                self.slots[index] = item;
                self.cursor = index;
                return Some(index);
            }
        }
        self.stats.dropped += 1;
        log::debug!("slot table full, dropped insert");
        None
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    /// Every slot, free ones included
    pub fn slots(&self) -> &[T; N] {
        &self.slots
    }

    pub fn iter_occupied(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots.iter().enumerate().filter(|(_, s)| !s.is_free())
    }

    pub fn iter_occupied_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter(|s| !s.is_free())
    }
}
