//! Memory management for the spork runtime
//!
//! Provides the chunked slab arena, the explicit root stack and the
//! mark-and-sweep collector that ties them together.

pub mod arena;
pub mod config;
pub mod gc;
pub mod roots;

pub use arena::{Arena, ValueRef};
pub use config::{DEFAULT_CHUNK_CAPACITY, GcConfig};
pub use gc::{GcReport, GcStats};
pub use roots::RootStack;
