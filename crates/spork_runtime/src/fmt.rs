//! Textual rendering of values.

use std::io::Write;

use ahash::AHashSet;

use crate::memory::ValueRef;
use crate::state::State;
use crate::value::Value;

/// Token printed for `nil` values and empty pair children.
pub const NIL_TOKEN: &str = "nil";

enum Step {
    Visit(Option<ValueRef>),
    Text(&'static str),
    Leave(ValueRef),
}

impl State {
    /// Render `at` as text: `nil`, decimal numbers, raw string bytes and
    /// `(head,tail)` for pairs.
    ///
    /// A pair reached again while it is still being rendered prints as
    /// `<cycle@chunk:slot>`; a reference to a free slot as `<free@chunk:slot>`.
    /// String contents are copied byte for byte.
    pub fn render_bytes(&self, at: ValueRef) -> Vec<u8> {
        let mut out = Vec::new();
        let mut open = AHashSet::new();
        let mut steps = vec![Step::Visit(Some(at))];

        while let Some(step) = steps.pop() {
            let at = match step {
                Step::Text(text) => {
                    out.extend_from_slice(text.as_bytes());
                    continue;
                }
                Step::Leave(at) => {
                    open.remove(&at);
                    continue;
                }
                Step::Visit(None) => {
                    out.extend_from_slice(NIL_TOKEN.as_bytes());
                    continue;
                }
                Step::Visit(Some(at)) => at,
            };

            match self.arena().get(at) {
                None => {
                    let _ = write!(out, "<free@{at}>");
                }
                Some(Value::Nil) => out.extend_from_slice(NIL_TOKEN.as_bytes()),
                Some(Value::Number(number)) => {
                    let _ = write!(out, "{number}");
                }
                Some(Value::String(bytes)) => out.extend_from_slice(bytes),
                Some(Value::Pair { .. }) if open.contains(&at) => {
                    let _ = write!(out, "<cycle@{at}>");
                }
                Some(Value::Pair { head, tail }) => {
                    open.insert(at);
                    out.push(b'(');
                    steps.extend([
                        Step::Leave(at),
                        Step::Text(")"),
                        Step::Visit(*tail),
                        Step::Text(","),
                        Step::Visit(*head),
                    ]);
                }
            }
        }

        out
    }

    /// [`State::render_bytes`] decoded for display. Invalid UTF-8 becomes U+FFFD.
    pub fn render(&self, at: ValueRef) -> String {
        String::from_utf8_lossy(&self.render_bytes(at)).into_owned()
    }

    /// Render `at` and store the bytes as a new rooted string value.
    pub fn to_string_value(&mut self, at: ValueRef) -> ValueRef {
        let bytes = self.render_bytes(at);
        self.make_string(bytes)
    }
}
