//! A push-driven streaming JSON parser that emits schema-typed events
//! against a caller-supplied protobuf message definition.
//!
//! The parser never materializes a document tree. Input arrives as raw byte
//! chunks of any size; as soon as each JSON token is recognized it is bound
//! to a protobuf field, coerced to that field's declared scalar type, and
//! reported to an output [`Sink`]. Values split across chunk boundaries or
//! punctuated by escape sequences are reassembled transparently.
//!
//! # Examples
//!
//! ```rust
//! use protomodem::{FieldDef, FieldType, JsonParser, MessageDef, ParserMethod, Selector, Sink};
//!
//! #[derive(Default)]
//! struct Count(usize);
//!
//! impl Sink for Count {
//!     fn put_int32(&mut self, _sel: Selector, _value: i32) -> bool {
//!         self.0 += 1;
//!         true
//!     }
//! }
//!
//! let msg = MessageDef::new(
//!     "example.Point",
//!     vec![
//!         FieldDef::new("x", 1, FieldType::Int32),
//!         FieldDef::new("y", 2, FieldType::Int32),
//!     ],
//! );
//! let method = ParserMethod::new(msg);
//! let mut parser = JsonParser::new(method, Count::default());
//! parser.parse(br#"{"x": 1, "#).unwrap();
//! parser.parse(br#""y": 2}"#).unwrap();
//! parser.end().unwrap();
//! assert_eq!(parser.sink().0, 2);
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod method;
mod parser;
mod schema;
mod sink;

pub use method::ParserMethod;
pub use parser::{BytesSink, ErrorKind, JsonParser, ParserError, MAX_DEPTH};
pub use schema::{EnumDef, FieldDef, FieldType, MessageDef};
pub use sink::{Selector, Sink};

#[cfg(test)]
mod tests;
