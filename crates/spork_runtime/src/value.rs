//! The value model stored in arena slots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::memory::ValueRef;

/// A live value. Pairs refer to their children by arena address and never own
/// them; only the collector frees slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Nil,
    Number(i64),
    /// Owned copy of the bytes the value was created from.
    String(Box<[u8]>),
    Pair {
        head: Option<ValueRef>,
        tail: Option<ValueRef>,
    },
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Nil => ValueType::Nil,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Pair { .. } => ValueType::Pair,
        }
    }

    /// Length of the owned string buffer, if this is a string.
    pub fn string_len(&self) -> Option<usize> {
        match self {
            Value::String(bytes) => Some(bytes.len()),
            _ => None,
        }
    }
}

/// Discriminant of a [`Value`], used in diagnostics and type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Nil,
    Number,
    String,
    Pair,
}

impl ValueType {
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Nil => "nil",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Pair => "pair",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
