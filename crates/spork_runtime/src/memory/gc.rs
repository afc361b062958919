//! Mark-and-sweep collection over the arena.
//!
//! Marking walks the root stack with an explicit work-list: a pair's head is
//! queued and its tail is followed in the same loop, so neither long lists nor
//! deep trees grow the call stack. Sweeping visits every slot of every chunk.

use std::time::Duration;

use serde::Serialize;

use crate::memory::ValueRef;
use crate::memory::arena::{Arena, Slot};
use crate::value::Value;

/// Outcome of one collection cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GcReport {
    /// Live slots that were reachable and kept
    pub survivors: usize,
    /// Live slots returned to the free list
    pub reclaimed: usize,
    /// String buffers dropped while reclaiming
    pub strings_released: usize,
    /// Bytes held by those string buffers
    pub bytes_released: usize,
    /// Countdown installed for the next cycle
    pub threshold: i64,
    /// Chunks in the arena when the cycle finished
    pub chunks: usize,
    /// Time spent marking
    pub mark_time: Duration,
    /// Time spent sweeping
    pub sweep_time: Duration,
    /// Wall-clock time spent in the whole cycle
    pub duration: Duration,
}

/// Cumulative statistics across every cycle run by a state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GcStats {
    pub collections: usize,
    pub total_reclaimed: usize,
    pub total_strings_released: usize,
    pub total_bytes_released: usize,
    pub total_duration: Duration,
}

impl GcStats {
    pub fn record(&mut self, report: &GcReport) {
        self.collections += 1;
        self.total_reclaimed += report.reclaimed;
        self.total_strings_released += report.strings_released;
        self.total_bytes_released += report.bytes_released;
        self.total_duration += report.duration;
    }
}

/// Counts produced by [`Arena::sweep`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SweepCounts {
    pub(crate) clean: usize,
    pub(crate) dirty: usize,
    pub(crate) strings: usize,
    pub(crate) bytes: usize,
}

impl Arena {
    /// Mark everything reachable from `roots`.
    pub(crate) fn mark(&mut self, roots: &[ValueRef]) {
        let mut gray = std::mem::take(&mut self.gray);
        gray.extend_from_slice(roots);

        while let Some(start) = gray.pop() {
            let mut current = Some(start);
            while let Some(at) = current.take() {
                let Some(Slot::Live { mark, value }) = self.slot_mut(at) else {
                    continue;
                };
                if *mark {
                    continue;
                }
                *mark = true;
                if let Value::Pair { head, tail } = value {
                    if let Some(head) = *head {
                        gray.push(head);
                    }
                    current = *tail;
                }
            }
        }

        self.gray = gray;
    }

    /// Reclaim every unmarked live slot and clear marks on the rest.
    pub(crate) fn sweep(&mut self) -> SweepCounts {
        let mut counts = SweepCounts::default();

        for (chunk_index, chunk) in self.chunks.iter_mut().enumerate() {
            for (slot_index, slot) in chunk.slots.iter_mut().enumerate() {
                match slot {
                    Slot::Free { .. } => continue,
                    Slot::Live { mark, .. } if *mark => {
                        *mark = false;
                        counts.clean += 1;
                        continue;
                    }
                    Slot::Live { value, .. } => {
                        if let Some(len) = value.string_len() {
                            counts.strings += 1;
                            counts.bytes += len;
                        }
                    }
                }

                let at = ValueRef::new(chunk_index as u32, slot_index as u32);
                *slot = Slot::Free { next: self.free };
                self.free = Some(at);
                self.free_len += 1;
                counts.dirty += 1;
            }
        }

        counts
    }
}
