//! The output side of the parser: an opaque bundle of per-field handlers.
//!
//! The parser reports every recognized construct through exactly one of the
//! methods below. Each call carries a [`Selector`] identifying the field the
//! event belongs to, so a sink can route data without consulting the schema
//! again. All handlers default to doing nothing and returning `true`
//! (continue), so a sink implements only the events it cares about.
//!
//! A handler returning `false` asks the parser to stop. Only the return
//! value of [`Sink::end_msg`] is currently honored; see the crate-level
//! error handling notes.

/// Identifies the field a handler call refers to.
///
/// Selectors are derived from the field's number in its containing message,
/// obtained via [`crate::FieldDef::selector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector(pub u32);

/// Receiver for the semantic event stream produced by the parser.
///
/// Events arrive strictly nested: `start_msg`/`end_msg` bracket each
/// message, `start_submsg`/`end_submsg` bracket a message-typed member,
/// `start_seq`/`end_seq` bracket a repeated field (including the synthetic
/// sequence of map entries), and `start_str`/`end_str` bracket the
/// `put_string` chunks of one string or bytes value.
#[allow(unused_variables)]
pub trait Sink {
    /// A message begins (the opening `{` of a message-typed object).
    fn start_msg(&mut self) -> bool {
        true
    }

    /// A message ends. Returning `false` aborts the parse.
    fn end_msg(&mut self) -> bool {
        true
    }

    /// A message-typed member (or one synthesized map entry) begins.
    fn start_submsg(&mut self, sel: Selector) -> bool {
        true
    }

    fn end_submsg(&mut self, sel: Selector) -> bool {
        true
    }

    /// A repeated field begins; map fields are reported as a sequence of
    /// map-entry submessages.
    fn start_seq(&mut self, sel: Selector) -> bool {
        true
    }

    fn end_seq(&mut self, sel: Selector) -> bool {
        true
    }

    /// A string or bytes value begins. `size_hint` is the known length in
    /// bytes, or 0 when the value is streamed.
    fn start_str(&mut self, sel: Selector, size_hint: usize) -> bool {
        true
    }

    /// One contiguous chunk of string or decoded bytes data. A single value
    /// may arrive in any number of chunks; only the concatenation is
    /// meaningful.
    fn put_string(&mut self, sel: Selector, chunk: &[u8]) -> bool {
        true
    }

    fn end_str(&mut self, sel: Selector) -> bool {
        true
    }

    fn put_bool(&mut self, sel: Selector, value: bool) -> bool {
        true
    }

    fn put_int32(&mut self, sel: Selector, value: i32) -> bool {
        true
    }

    fn put_int64(&mut self, sel: Selector, value: i64) -> bool {
        true
    }

    fn put_uint32(&mut self, sel: Selector, value: u32) -> bool {
        true
    }

    fn put_uint64(&mut self, sel: Selector, value: u64) -> bool {
        true
    }

    fn put_float(&mut self, sel: Selector, value: f32) -> bool {
        true
    }

    fn put_double(&mut self, sel: Selector, value: f64) -> bool {
        true
    }
}
