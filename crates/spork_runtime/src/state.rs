//! The runtime state: arena, root stack and collector bookkeeping.

use spork_utils::timer::PhaseTimer;

use crate::config::RuntimeConfig;
use crate::error::{OrFatal, Result, RuntimeError, fatal};
use crate::memory::{Arena, GcConfig, GcReport, GcStats, RootStack, ValueRef};
use crate::value::{Value, ValueType};

/// Emit the structured `gc cycle` event at `$level`.
macro_rules! cycle_event {
    ($level:expr, $report:expr) => {
        tracing::event!(
            target: "spork::gc",
            $level,
            survivors = $report.survivors,
            reclaimed = $report.reclaimed,
            threshold = $report.threshold,
            chunks = $report.chunks,
            mark = ?$report.mark_time,
            sweep = ?$report.sweep_time,
            "gc cycle"
        )
    };
}

/// Owner of one independent heap.
///
/// Every value handed out is pushed onto the root stack; it stays alive as long
/// as it, or a pair that transitively refers to it, is on that stack.
#[derive(Debug)]
pub struct State {
    arena: Arena,
    roots: RootStack,
    countdown: i64,
    config: GcConfig,
    gc_enabled: bool,
    report_cycles: bool,
    last_report: Option<GcReport>,
    stats: GcStats,
}

impl State {
    pub fn new() -> Self {
        Self::with_config(GcConfig::default())
    }

    pub fn with_config(config: GcConfig) -> Self {
        tracing::debug!(
            chunk_capacity = config.chunk_capacity,
            initial_countdown = config.initial_countdown,
            "state created"
        );
        Self {
            arena: Arena::new(config.chunk_capacity),
            roots: RootStack::new(config.root_stack_capacity, config.root_stack_limit),
            countdown: config.initial_countdown,
            gc_enabled: config.auto_gc,
            report_cycles: false,
            last_report: None,
            stats: GcStats::default(),
            config,
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        let mut state = Self::with_config(config.gc.clone());
        state.report_cycles = config.logging.report_cycles;
        state
    }

    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Allocations left before the next automatic collection.
    pub fn countdown(&self) -> i64 {
        self.countdown
    }

    pub fn last_report(&self) -> Option<&GcReport> {
        self.last_report.as_ref()
    }

    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// Log every cycle at `info` instead of `debug`.
    pub fn set_cycle_reports(&mut self, enabled: bool) {
        self.report_cycles = enabled;
    }

    // -----------------------------------------------------------------------
    // Allocation
    // -----------------------------------------------------------------------

    /// Hand out a live, unrooted `Nil` slot, collecting or growing as needed.
    pub fn allocate_slot(&mut self) -> ValueRef {
        self.try_allocate_slot().or_fatal()
    }

    pub fn try_allocate_slot(&mut self) -> Result<ValueRef> {
        self.countdown = self.countdown.saturating_sub(1);
        if self.gc_enabled && (self.countdown < 0 || !self.arena.has_free()) {
            self.collect();
        }
        if !self.arena.has_free() {
            self.arena.grow()?;
        }
        self.arena.take_free().ok_or(RuntimeError::OutOfMemory {
            requested: self.arena.chunk_capacity(),
        })
    }

    fn install(&mut self, at: ValueRef, value: Value) {
        match self.arena.get_mut(at) {
            Some(slot) => *slot = value,
            None => fatal(RuntimeError::FreeSlot { slot: at }),
        }
    }

    fn alloc_rooted(&mut self, value: Value) -> ValueRef {
        let at = self.allocate_slot();
        self.install(at, value);
        self.push(at);
        at
    }

    pub fn make_nil(&mut self) -> ValueRef {
        self.alloc_rooted(Value::Nil)
    }

    pub fn make_number(&mut self, number: i64) -> ValueRef {
        self.alloc_rooted(Value::Number(number))
    }

    /// Copy `bytes` into a new string value.
    pub fn make_string(&mut self, bytes: impl AsRef<[u8]>) -> ValueRef {
        let buffer: Box<[u8]> = bytes.as_ref().into();
        self.alloc_rooted(Value::String(buffer))
    }

    /// Pop the two most recent roots (tail first, then head) into a new pair
    /// and root the pair in their place.
    pub fn make_pair(&mut self) -> ValueRef {
        // The slot is taken before the children are popped so a collection
        // triggered here still sees them as roots.
        let at = self.allocate_slot();
        let tail = self.pop();
        let head = self.pop();
        self.install(
            at,
            Value::Pair {
                head: Some(head),
                tail: Some(tail),
            },
        );
        self.push(at);
        at
    }

    // -----------------------------------------------------------------------
    // Root stack
    // -----------------------------------------------------------------------

    pub fn push(&mut self, at: ValueRef) {
        self.roots.push(at).or_fatal();
    }

    pub fn pop(&mut self) -> ValueRef {
        self.roots.pop().or_fatal()
    }

    pub fn try_pop(&mut self) -> Result<ValueRef> {
        self.roots.pop()
    }

    pub fn peek(&self) -> Option<ValueRef> {
        self.roots.peek()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn roots(&self) -> &[ValueRef] {
        self.roots.as_slice()
    }

    /// Drop every root above `depth`.
    pub fn truncate_roots(&mut self, depth: usize) {
        self.roots.truncate(depth);
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    pub fn try_get(&self, at: ValueRef) -> Result<&Value> {
        self.arena.get(at).ok_or(RuntimeError::FreeSlot { slot: at })
    }

    pub fn get(&self, at: ValueRef) -> &Value {
        self.try_get(at).or_fatal()
    }

    pub fn type_of(&self, at: ValueRef) -> ValueType {
        self.get(at).value_type()
    }

    pub fn check_type(&self, at: ValueRef, expected: ValueType) -> Result<()> {
        let actual = self.try_get(at)?.value_type();
        if actual == expected {
            Ok(())
        } else {
            Err(RuntimeError::TypeMismatch { expected, actual })
        }
    }

    pub fn expect_type(&self, at: ValueRef, expected: ValueType) {
        self.check_type(at, expected).or_fatal();
    }

    fn mismatch(&self, at: ValueRef, expected: ValueType) -> ! {
        fatal(RuntimeError::TypeMismatch {
            expected,
            actual: self.type_of(at),
        })
    }

    pub fn number(&self, at: ValueRef) -> i64 {
        match self.get(at) {
            Value::Number(number) => *number,
            _ => self.mismatch(at, ValueType::Number),
        }
    }

    pub fn string_bytes(&self, at: ValueRef) -> &[u8] {
        match self.get(at) {
            Value::String(bytes) => &bytes[..],
            _ => self.mismatch(at, ValueType::String),
        }
    }

    pub fn head(&self, at: ValueRef) -> Option<ValueRef> {
        match self.get(at) {
            Value::Pair { head, .. } => *head,
            _ => self.mismatch(at, ValueType::Pair),
        }
    }

    pub fn tail(&self, at: ValueRef) -> Option<ValueRef> {
        match self.get(at) {
            Value::Pair { tail, .. } => *tail,
            _ => self.mismatch(at, ValueType::Pair),
        }
    }

    pub fn set_head(&mut self, pair: ValueRef, value: Option<ValueRef>) {
        self.expect_type(pair, ValueType::Pair);
        if let Some(Value::Pair { head, .. }) = self.arena.get_mut(pair) {
            *head = value;
        }
    }

    pub fn set_tail(&mut self, pair: ValueRef, value: Option<ValueRef>) {
        self.expect_type(pair, ValueType::Pair);
        if let Some(Value::Pair { tail, .. }) = self.arena.get_mut(pair) {
            *tail = value;
        }
    }

    // -----------------------------------------------------------------------
    // Collection
    // -----------------------------------------------------------------------

    /// Run one full mark-and-sweep cycle.
    pub fn collect(&mut self) -> GcReport {
        let mut timer = PhaseTimer::start();

        self.arena.mark(self.roots.as_slice());
        let mark_time = timer.lap();
        let counts = self.arena.sweep();
        let sweep_time = timer.lap();
        self.countdown = self.config.next_countdown(counts.clean);

        let report = GcReport {
            survivors: counts.clean,
            reclaimed: counts.dirty,
            strings_released: counts.strings,
            bytes_released: counts.bytes,
            threshold: self.countdown,
            chunks: self.arena.chunk_count(),
            mark_time,
            sweep_time,
            duration: timer.total(),
        };
        self.stats.record(&report);
        self.last_report = Some(report);

        if self.report_cycles {
            cycle_event!(tracing::Level::INFO, report);
        } else {
            cycle_event!(tracing::Level::DEBUG, report);
        }

        report
    }

    /// Enable automatic collection. Returns the previous setting.
    pub fn enable_gc(&mut self) -> bool {
        std::mem::replace(&mut self.gc_enabled, true)
    }

    /// Disable automatic collection. Returns the previous setting.
    pub fn disable_gc(&mut self) -> bool {
        std::mem::replace(&mut self.gc_enabled, false)
    }

    pub fn is_gc_enabled(&self) -> bool {
        self.gc_enabled
    }

    /// Tear the state down, returning the statistics it accumulated.
    pub fn close(self) -> GcStats {
        self.stats.clone()
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for State {
    fn drop(&mut self) {
        tracing::debug!(
            chunks = self.arena.chunk_count(),
            live = self.arena.live_slots(),
            roots = self.roots.len(),
            collections = self.stats.collections,
            "state closed"
        );
    }
}
