//! Spork runtime: a chunked slab heap for nil, number, string and pair values,
//! reclaimed by mark-and-sweep collection from an explicit root stack.
//!
//! ```
//! use spork_runtime::State;
//!
//! let mut state = State::new();
//! state.make_number(2);
//! state.make_number(2);
//! state.make_pair();
//! let pair = state.pop();
//! assert_eq!(state.render(pair), "(2,2)");
//! ```

pub mod config;
pub mod error;
pub mod fmt;
pub mod memory;
pub mod state;
pub mod value;

pub use config::{LoggingConfig, RuntimeConfig};
pub use error::{RuntimeError, fatal};
pub use memory::{GcConfig, GcReport, GcStats, ValueRef};
pub use state::State;
pub use value::{Value, ValueType};

/// Runtime version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
