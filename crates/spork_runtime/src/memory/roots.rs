use crate::error::{Result, RuntimeError};
use crate::memory::ValueRef;

/// Explicit, caller-driven root set. Strict LIFO.
#[derive(Debug, Default)]
pub struct RootStack {
    entries: Vec<ValueRef>,
    /// 0 means unbounded.
    limit: usize,
}

impl RootStack {
    pub fn new(capacity: usize, limit: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            limit,
        }
    }

    pub fn push(&mut self, value: ValueRef) -> Result<()> {
        if self.limit != 0 && self.entries.len() >= self.limit {
            return Err(RuntimeError::StackOverflow { limit: self.limit });
        }
        if self.entries.len() == self.entries.capacity() {
            let additional = self.entries.capacity().max(1);
            self.entries
                .try_reserve_exact(additional)
                .map_err(|_| RuntimeError::OutOfMemory {
                    requested: additional * size_of::<ValueRef>(),
                })?;
        }
        self.entries.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<ValueRef> {
        self.entries.pop().ok_or(RuntimeError::StackUnderflow)
    }

    pub fn peek(&self) -> Option<ValueRef> {
        self.entries.last().copied()
    }

    /// Drop every entry above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.entries.truncate(depth);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn as_slice(&self) -> &[ValueRef] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(slot: u32) -> ValueRef {
        ValueRef::new(0, slot)
    }

    #[test]
    fn lifo_order() {
        let mut stack = RootStack::new(2, 0);
        stack.push(at(1)).unwrap();
        stack.push(at(2)).unwrap();
        assert_eq!(stack.peek(), Some(at(2)));
        assert_eq!(stack.pop(), Ok(at(2)));
        assert_eq!(stack.pop(), Ok(at(1)));
        assert_eq!(stack.pop(), Err(RuntimeError::StackUnderflow));
    }

    #[test]
    fn capacity_doubles_when_full() {
        let mut stack = RootStack::new(2, 0);
        stack.push(at(0)).unwrap();
        stack.push(at(1)).unwrap();
        assert_eq!(stack.capacity(), 2);
        stack.push(at(2)).unwrap();
        assert!(stack.capacity() >= 4);
        assert_eq!(stack.as_slice(), &[at(0), at(1), at(2)]);
    }

    #[test]
    fn zero_capacity_still_grows() {
        let mut stack = RootStack::new(0, 0);
        for slot in 0..10 {
            stack.push(at(slot)).unwrap();
        }
        assert_eq!(stack.len(), 10);
    }

    #[test]
    fn limit_is_enforced() {
        let mut stack = RootStack::new(1, 2);
        stack.push(at(0)).unwrap();
        stack.push(at(1)).unwrap();
        assert_eq!(
            stack.push(at(2)),
            Err(RuntimeError::StackOverflow { limit: 2 })
        );
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn truncate_drops_top_entries() {
        let mut stack = RootStack::new(4, 0);
        for slot in 0..4 {
            stack.push(at(slot)).unwrap();
        }
        stack.truncate(1);
        assert_eq!(stack.as_slice(), &[at(0)]);
        assert!(!stack.is_empty());
    }
}
