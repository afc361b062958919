use std::fmt;

use crate::error::{Result, RuntimeError};
use crate::value::Value;

/// Stable address of a value slot: chunk number plus index inside the chunk.
///
/// Chunks are never moved or released while the owning state lives, so a
/// `ValueRef` stays valid until the slot it names is swept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueRef {
    chunk: u32,
    slot: u32,
}

impl ValueRef {
    pub(crate) const fn new(chunk: u32, slot: u32) -> Self {
        Self { chunk, slot }
    }

    pub const fn chunk(self) -> usize {
        self.chunk as usize
    }

    pub const fn slot(self) -> usize {
        self.slot as usize
    }
}

impl fmt::Display for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chunk, self.slot)
    }
}

/// A single arena slot. Free slots carry only the free-list link.
#[derive(Debug)]
pub(crate) enum Slot {
    Free { next: Option<ValueRef> },
    Live { mark: bool, value: Value },
}

/// Fixed-capacity slab of slots.
#[derive(Debug)]
pub(crate) struct Chunk {
    pub(crate) slots: Box<[Slot]>,
}

/// Chunked slab allocator with a free list threaded through free slots.
#[derive(Debug)]
pub struct Arena {
    pub(crate) chunks: Vec<Chunk>,
    pub(crate) free: Option<ValueRef>,
    pub(crate) free_len: usize,
    /// Scratch work-list reused by the mark phase.
    pub(crate) gray: Vec<ValueRef>,
    chunk_capacity: usize,
}

impl Arena {
    pub fn new(chunk_capacity: usize) -> Self {
        let chunk_capacity = chunk_capacity.clamp(1, u32::MAX as usize);
        Self {
            chunks: Vec::new(),
            free: None,
            free_len: 0,
            gray: Vec::new(),
            chunk_capacity,
        }
    }

    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn slot_capacity(&self) -> usize {
        self.chunks.len() * self.chunk_capacity
    }

    pub fn free_slots(&self) -> usize {
        self.free_len
    }

    pub fn live_slots(&self) -> usize {
        self.slot_capacity() - self.free_len
    }

    pub fn has_free(&self) -> bool {
        self.free.is_some()
    }

    /// Allocate one chunk and thread all of its slots onto the free list.
    pub(crate) fn grow(&mut self) -> Result<()> {
        let capacity = self.chunk_capacity;
        let requested = capacity * size_of::<Slot>();
        let chunk_index =
            u32::try_from(self.chunks.len()).map_err(|_| RuntimeError::OutOfMemory { requested })?;

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| RuntimeError::OutOfMemory { requested })?;
        for index in 1..capacity {
            slots.push(Slot::Free {
                next: Some(ValueRef::new(chunk_index, index as u32)),
            });
        }
        slots.push(Slot::Free { next: self.free });

        self.chunks
            .try_reserve(1)
            .map_err(|_| RuntimeError::OutOfMemory {
                requested: size_of::<Chunk>(),
            })?;
        self.chunks.push(Chunk {
            slots: slots.into_boxed_slice(),
        });
        self.free = Some(ValueRef::new(chunk_index, 0));
        self.free_len += capacity;

        tracing::trace!(chunk = chunk_index, capacity, "arena grew");
        Ok(())
    }

    /// Pop the free-list head and turn it into a live `Nil` slot.
    pub(crate) fn take_free(&mut self) -> Option<ValueRef> {
        let head = self.free?;
        let slot = self.slot_mut(head)?;
        let next = match slot {
            Slot::Free { next } => *next,
            Slot::Live { .. } => unreachable!("free list points at live slot {head}"),
        };
        *slot = Slot::Live {
            mark: false,
            value: Value::Nil,
        };
        self.free = next;
        self.free_len -= 1;
        Some(head)
    }

    pub(crate) fn slot(&self, at: ValueRef) -> Option<&Slot> {
        self.chunks.get(at.chunk())?.slots.get(at.slot())
    }

    pub(crate) fn slot_mut(&mut self, at: ValueRef) -> Option<&mut Slot> {
        self.chunks.get_mut(at.chunk())?.slots.get_mut(at.slot())
    }

    /// The live value at `at`, or `None` for a free or unknown slot.
    pub fn get(&self, at: ValueRef) -> Option<&Value> {
        match self.slot(at)? {
            Slot::Live { value, .. } => Some(value),
            Slot::Free { .. } => None,
        }
    }

    pub fn get_mut(&mut self, at: ValueRef) -> Option<&mut Value> {
        match self.slot_mut(at)? {
            Slot::Live { value, .. } => Some(value),
            Slot::Free { .. } => None,
        }
    }

    pub fn is_live(&self, at: ValueRef) -> bool {
        matches!(self.slot(at), Some(Slot::Live { .. }))
    }

    pub fn is_marked(&self, at: ValueRef) -> bool {
        matches!(self.slot(at), Some(Slot::Live { mark: true, .. }))
    }
}
