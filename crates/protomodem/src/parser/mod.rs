//! The streaming JSON-to-protobuf parser implementation.
//!
//! The machine is a conventional state-per-construct dispatcher over input
//! bytes. Nested values, strings, and numbers are handled by jumping into a
//! sub-machine after pushing the state to return to onto an explicit,
//! bounded return stack; the sub-machine's terminator pops it and, for
//! numbers, re-scans the terminating byte in the caller's context. Semantic
//! actions fire on the transitions and drive the frame stack, the multipart
//! text plumbing, and the output sink.
//!
//! The parser is stateful across `parse` calls: machine state, both stacks,
//! the accumulator, the capture flag, and the multipart state all persist,
//! so input may be chunked at any byte position.

mod accum;
mod base64;
mod error;
mod escape;
mod frame;
mod literal;
mod multipart;
mod numbers;


use alloc::{string::String, string::ToString, sync::Arc, vec::Vec};

use accum::Accumulator;
pub use error::{ErrorKind, ParserError};
use escape::{simple_escape, UnicodeEscapeBuffer};
use frame::{Frame, FrameStack};
pub use frame::MAX_DEPTH;
use literal::{ExpectedLiteral, Literal, Step};
use multipart::{Capture, Multipart};

use crate::method::ParserMethod;
use crate::schema::{FieldType, MessageDef, MAP_KEY_FIELD, MAP_VALUE_FIELD};
use crate::sink::Sink;

/// The input side of the parser.
///
/// Push raw byte chunks with `parse`, then signal the end of the document
/// with `end`. A successful `parse` consumes the whole chunk; an error is
/// sticky and carries the position where parsing stopped.
pub trait BytesSink {
    fn parse(&mut self, chunk: &[u8]) -> Result<usize, ParserError>;
    fn end(&mut self) -> Result<(), ParserError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Leading whitespace before the root object.
    StartDoc,
    /// Trailing whitespace after the root object.
    EndDoc,
    /// `{` consumed; expect a member name or `}`.
    ObjectOpen,
    /// `,` consumed inside an object; expect a member name.
    MemberNext,
    /// Member name consumed; expect `:`.
    MemberColon,
    /// `:` consumed; expect a value.
    MemberValue,
    /// Member value consumed; expect `,` or `}`.
    AfterMember,
    /// `[` consumed; expect an element or `]`.
    ArrayOpen,
    /// `,` consumed inside an array; expect an element.
    ElementNext,
    /// Element consumed; expect `,` or `]`.
    AfterElement,
    /// First byte of a value selects a sub-machine.
    ValueStart,
    // String machine.
    Str,
    StrEscape,
    StrUnicode,
    // Number machine.
    NumSign,
    NumZero,
    NumInt,
    NumDot,
    NumFrac,
    NumExp,
    NumExpSign,
    NumExpInt,
    // Literal machine (`true` / `false` / `null`).
    Lit,
}

/// Which construct the string machine is feeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrTarget {
    MemberName,
    Value,
}

/// The streaming parser. One instance parses one document at a time and is
/// reset between documents; the schema-derived [`ParserMethod`] is shared.
#[derive(Debug)]
pub struct JsonParser<S: Sink> {
    method: Arc<ParserMethod>,
    sink: S,

    state: State,
    /// Return states for nested value/string/number sub-machines. Shares
    /// the [`MAX_DEPTH`] bound with the frame stack (distinct stacks).
    returns: Vec<State>,
    frames: FrameStack,

    accum: Accumulator,
    capture: Capture,
    multipart: Multipart,
    literal: ExpectedLiteral,
    str_target: StrTarget,
    unicode: UnicodeEscapeBuffer,

    pos: usize,
    line: usize,
    column: usize,
    error: Option<ParserError>,
}

impl<S: Sink> JsonParser<S> {
    /// Creates a parser bound to `sink`, ready for the first chunk of a
    /// document matching `method`'s root message.
    pub fn new(method: Arc<ParserMethod>, sink: S) -> Self {
        let root = method.root().clone();
        let root_table = method.root_table().clone();
        let mut frames = FrameStack::new();
        frames.reset(Frame::new(root, root_table));
        Self {
            method,
            sink,
            state: State::StartDoc,
            returns: Vec::new(),
            frames,
            accum: Accumulator::new(),
            capture: Capture::Inactive,
            multipart: Multipart::Inactive,
            literal: ExpectedLiteral::none(),
            str_target: StrTarget::Value,
            unicode: UnicodeEscapeBuffer::new(),
            pos: 0,
            line: 1,
            column: 1,
            error: None,
        }
    }

    /// Clears all document state so the parser can accept a new document.
    /// The accumulator's buffer is retained; the sink is untouched.
    pub fn reset(&mut self) {
        self.state = State::StartDoc;
        self.returns.clear();
        let root = self.method.root().clone();
        let root_table = self.method.root_table().clone();
        self.frames.reset(Frame::new(root, root_table));
        self.accum.clear();
        self.capture = Capture::Inactive;
        self.multipart = Multipart::Inactive;
        self.literal = ExpectedLiteral::none();
        self.unicode.reset();
        self.pos = 0;
        self.line = 1;
        self.column = 1;
        self.error = None;
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Total bytes consumed since construction or the last reset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Parses one chunk of input. Returns the number of bytes consumed,
    /// which on success is always the full chunk; any state needed to
    /// resume (including text captured from `chunk`) is copied before
    /// returning, so the chunk may be released immediately.
    pub fn parse(&mut self, chunk: &[u8]) -> Result<usize, ParserError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.capture == Capture::Suspended {
            self.capture = Capture::Active(0);
        }

        let mut i = 0;
        while i < chunk.len() {
            match self.step(chunk, i, chunk[i]) {
                Ok(consumed) => {
                    for &b in &chunk[i..i + consumed] {
                        self.advance(b);
                    }
                    i += consumed;
                }
                Err(kind) => return Err(self.fatal(kind)),
            }
        }

        if let Err(kind) = self.suspend(chunk) {
            return Err(self.fatal(kind));
        }
        Ok(chunk.len())
    }

    /// Signals the end of input. Fails unless exactly one complete root
    /// object has been parsed.
    pub fn end(&mut self) -> Result<(), ParserError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.state != State::EndDoc {
            return Err(self.fatal(ErrorKind::UnexpectedEndOfInput));
        }
        Ok(())
    }

    // --------------------------------------------------------------------
    // Machine
    // --------------------------------------------------------------------

    /// Processes the byte `b` at `chunk[i]`. Returns the number of bytes
    /// consumed; 0 means the state changed and the same byte must be
    /// re-dispatched (the one-byte rewind of sub-machine exits).
    fn step(&mut self, chunk: &[u8], i: usize, b: u8) -> Result<usize, ErrorKind> {
        use State::*;

        match self.state {
            // The root object runs inline; only nested constructs push onto
            // the return stack.
            StartDoc => match b {
                _ if is_ws(b) => Ok(1),
                b'{' => {
                    self.start_object()?;
                    self.state = ObjectOpen;
                    Ok(1)
                }
                _ => Err(ErrorKind::Syntax(b as char)),
            },

            EndDoc => {
                if is_ws(b) {
                    Ok(1)
                } else {
                    Err(ErrorKind::Syntax(b as char))
                }
            }

            ObjectOpen | MemberNext => match b {
                _ if is_ws(b) => Ok(1),
                b'"' => {
                    self.start_member()?;
                    self.str_target = StrTarget::MemberName;
                    self.state = Str;
                    Ok(1)
                }
                b'}' if self.state == ObjectOpen => {
                    self.close_object()?;
                    Ok(1)
                }
                _ => Err(ErrorKind::Syntax(b as char)),
            },

            MemberColon => match b {
                _ if is_ws(b) => Ok(1),
                b':' => {
                    self.state = MemberValue;
                    Ok(1)
                }
                _ => Err(ErrorKind::Syntax(b as char)),
            },

            MemberValue => {
                if is_ws(b) {
                    Ok(1)
                } else {
                    self.push_return(AfterMember)?;
                    self.state = ValueStart;
                    Ok(0)
                }
            }

            AfterMember => match b {
                _ if is_ws(b) => Ok(1),
                b',' => {
                    self.state = MemberNext;
                    Ok(1)
                }
                b'}' => {
                    self.close_object()?;
                    Ok(1)
                }
                _ => Err(ErrorKind::Syntax(b as char)),
            },

            ArrayOpen => match b {
                _ if is_ws(b) => Ok(1),
                b']' => {
                    self.close_array()?;
                    Ok(1)
                }
                _ => {
                    self.push_return(AfterElement)?;
                    self.state = ValueStart;
                    Ok(0)
                }
            },

            ElementNext => {
                if is_ws(b) {
                    Ok(1)
                } else {
                    self.push_return(AfterElement)?;
                    self.state = ValueStart;
                    Ok(0)
                }
            }

            AfterElement => match b {
                _ if is_ws(b) => Ok(1),
                b',' => {
                    self.state = ElementNext;
                    Ok(1)
                }
                b']' => {
                    self.close_array()?;
                    Ok(1)
                }
                _ => Err(ErrorKind::Syntax(b as char)),
            },

            ValueStart => match b {
                b'{' => {
                    self.start_subobject()?;
                    self.start_object()?;
                    self.state = ObjectOpen;
                    Ok(1)
                }
                b'[' => {
                    self.start_array()?;
                    self.state = ArrayOpen;
                    Ok(1)
                }
                b'"' => {
                    self.start_stringval()?;
                    self.str_target = StrTarget::Value;
                    self.state = Str;
                    Ok(1)
                }
                b'-' => {
                    self.start_number(i)?;
                    self.state = NumSign;
                    Ok(1)
                }
                b'0' => {
                    self.start_number(i)?;
                    self.state = NumZero;
                    Ok(1)
                }
                b'1'..=b'9' => {
                    self.start_number(i)?;
                    self.state = NumInt;
                    Ok(1)
                }
                b't' | b'f' | b'n' => {
                    self.literal = ExpectedLiteral::new(b);
                    self.state = Lit;
                    Ok(1)
                }
                _ => Err(ErrorKind::Syntax(b as char)),
            },

            // ------------------------- strings ---------------------------
            Str => match b {
                b'"' => {
                    self.end_text(chunk, i, true)?;
                    match self.str_target {
                        StrTarget::MemberName => {
                            self.end_membername(chunk)?;
                            self.state = MemberColon;
                        }
                        StrTarget::Value => {
                            self.end_stringval(chunk)?;
                            self.finish_value()?;
                        }
                    }
                    Ok(1)
                }
                b'\\' => {
                    self.end_text(chunk, i, true)?;
                    self.state = StrEscape;
                    Ok(1)
                }
                0x00..=0x1F => Err(ErrorKind::Syntax(b as char)),
                _ => {
                    if self.capture == Capture::Inactive {
                        self.start_text(i)?;
                    }
                    // Consume the whole text run in one scan.
                    let run = chunk[i..]
                        .iter()
                        .position(|&c| c == b'"' || c == b'\\' || c < 0x20)
                        .unwrap_or(chunk.len() - i);
                    Ok(run)
                }
            },

            StrEscape => {
                if b == b'u' {
                    self.unicode.reset();
                    self.state = StrUnicode;
                    Ok(1)
                } else if let Some(mapped) = simple_escape(b) {
                    self.put_escaped(chunk, &[mapped])?;
                    self.state = Str;
                    Ok(1)
                } else {
                    Err(ErrorKind::Syntax(b as char))
                }
            }

            StrUnicode => {
                if !b.is_ascii_hexdigit() {
                    return Err(ErrorKind::Syntax(b as char));
                }
                if let Some(encoded) = self.unicode.feed(b) {
                    self.put_escaped(chunk, encoded.as_bytes())?;
                    self.state = Str;
                }
                Ok(1)
            }

            // ------------------------- numbers ---------------------------
            NumSign => match b {
                b'0' => {
                    self.state = NumZero;
                    Ok(1)
                }
                b'1'..=b'9' => {
                    self.state = NumInt;
                    Ok(1)
                }
                _ => Err(ErrorKind::Syntax(b as char)),
            },

            NumZero => match b {
                b'.' => {
                    self.state = NumDot;
                    Ok(1)
                }
                b'e' | b'E' => {
                    self.state = NumExp;
                    Ok(1)
                }
                _ => self.finish_number(chunk, i),
            },

            NumInt => match b {
                b'0'..=b'9' => Ok(digit_run(chunk, i)),
                b'.' => {
                    self.state = NumDot;
                    Ok(1)
                }
                b'e' | b'E' => {
                    self.state = NumExp;
                    Ok(1)
                }
                _ => self.finish_number(chunk, i),
            },

            NumDot => match b {
                b'0'..=b'9' => {
                    self.state = NumFrac;
                    Ok(digit_run(chunk, i))
                }
                _ => Err(ErrorKind::Syntax(b as char)),
            },

            NumFrac => match b {
                b'0'..=b'9' => Ok(digit_run(chunk, i)),
                b'e' | b'E' => {
                    self.state = NumExp;
                    Ok(1)
                }
                _ => self.finish_number(chunk, i),
            },

            NumExp => match b {
                b'+' | b'-' => {
                    self.state = NumExpSign;
                    Ok(1)
                }
                b'0'..=b'9' => {
                    self.state = NumExpInt;
                    Ok(digit_run(chunk, i))
                }
                _ => Err(ErrorKind::Syntax(b as char)),
            },

            NumExpSign => match b {
                b'0'..=b'9' => {
                    self.state = NumExpInt;
                    Ok(digit_run(chunk, i))
                }
                _ => Err(ErrorKind::Syntax(b as char)),
            },

            NumExpInt => match b {
                b'0'..=b'9' => Ok(digit_run(chunk, i)),
                _ => self.finish_number(chunk, i),
            },

            // ------------------------- literals --------------------------
            Lit => match self.literal.step(b) {
                Step::NeedMore => Ok(1),
                Step::Done(lit) => {
                    self.put_literal(lit)?;
                    self.finish_value()?;
                    Ok(1)
                }
                Step::Reject => Err(ErrorKind::Syntax(b as char)),
            },
        }
    }

    /// Closes the number sub-machine at its terminator byte, which is then
    /// re-scanned by the caller state (consumes 0 bytes).
    fn finish_number(&mut self, chunk: &[u8], i: usize) -> Result<usize, ErrorKind> {
        self.end_number(chunk, i)?;
        self.finish_value()?;
        Ok(0)
    }

    /// Pops the return state after a completed value; a member value also
    /// fires `end_member`.
    fn finish_value(&mut self) -> Result<(), ErrorKind> {
        let ret = self.pop_return()?;
        if ret == State::AfterMember {
            self.end_member()?;
        }
        self.state = ret;
        Ok(())
    }

    fn close_object(&mut self) -> Result<(), ErrorKind> {
        self.end_object()?;
        match self.returns.pop() {
            // Empty stack: this was the root object.
            None => self.state = State::EndDoc,
            Some(ret) => {
                self.end_subobject()?;
                if ret == State::AfterMember {
                    self.end_member()?;
                }
                self.state = ret;
            }
        }
        Ok(())
    }

    fn close_array(&mut self) -> Result<(), ErrorKind> {
        self.end_array()?;
        let ret = self.pop_return()?;
        if ret == State::AfterMember {
            self.end_member()?;
        }
        self.state = ret;
        Ok(())
    }

    fn push_return(&mut self, state: State) -> Result<(), ErrorKind> {
        if self.returns.len() >= MAX_DEPTH {
            return Err(ErrorKind::NestingTooDeep);
        }
        self.returns.push(state);
        Ok(())
    }

    fn pop_return(&mut self) -> Result<State, ErrorKind> {
        self.returns
            .pop()
            .ok_or(ErrorKind::Internal("return stack underflow"))
    }

    // --------------------------------------------------------------------
    // Semantic layer: frame transitions (schema binding)
    // --------------------------------------------------------------------

    fn top(&self) -> Result<&Frame, ErrorKind> {
        self.frames
            .last()
            .ok_or(ErrorKind::Internal("frame stack empty"))
    }

    fn top_mut(&mut self) -> Result<&mut Frame, ErrorKind> {
        self.frames
            .last_mut()
            .ok_or(ErrorKind::Internal("frame stack empty"))
    }

    fn start_object(&mut self) -> Result<(), ErrorKind> {
        if !self.top()?.is_map {
            let _ = self.sink.start_msg();
        }
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), ErrorKind> {
        if !self.top()?.is_map && !self.sink.end_msg() {
            return Err(ErrorKind::Sink);
        }
        Ok(())
    }

    fn start_member(&mut self) -> Result<(), ErrorKind> {
        if self.top()?.field.is_some() {
            return Err(ErrorKind::Internal("member name while a field is pending"));
        }
        self.multipart_start_accum();
        Ok(())
    }

    fn end_membername(&mut self, chunk: &[u8]) -> Result<(), ErrorKind> {
        if self.top()?.is_map {
            return self.handle_mapentry(chunk);
        }
        let field = {
            let name = self.accum.get(chunk);
            self.top()?.table.lookup(name).cloned().ok_or_else(|| {
                ErrorKind::NoSuchField(String::from_utf8_lossy(name).into_owned())
            })?
        };
        self.top_mut()?.field = Some(field);
        self.multipart_end();
        Ok(())
    }

    /// A member name completed inside a map object: synthesize the map-entry
    /// submessage, emit the accumulated name as its key, and leave the frame
    /// positioned at the value field.
    fn handle_mapentry(&mut self, chunk: &[u8]) -> Result<(), ErrorKind> {
        let mapfield = self
            .top()?
            .mapfield
            .clone()
            .ok_or(ErrorKind::Internal("map frame without map field"))?;
        let entry_msg = mapfield
            .message_subdef()
            .cloned()
            .ok_or(ErrorKind::Internal("map field without entry message"))?;
        let key_field = entry_msg
            .field_by_number(MAP_KEY_FIELD)
            .cloned()
            .ok_or(ErrorKind::MapEntryNoKey)?;
        let value_field = entry_msg
            .field_by_number(MAP_VALUE_FIELD)
            .cloned()
            .ok_or(ErrorKind::MapEntryNoValue)?;

        let table = self.table_for(&entry_msg)?;
        let mut frame = Frame::new(entry_msg, table);
        frame.mapfield = Some(mapfield.clone());
        self.frames.push(frame)?;
        let _ = self.sink.start_submsg(mapfield.selector());
        let _ = self.sink.start_msg();

        let sel = key_field.selector();
        match key_field.field_type() {
            FieldType::String | FieldType::Bytes => {
                let name = self.accum.get(chunk);
                let _ = self.sink.start_str(sel, name.len());
                if !name.is_empty() {
                    let _ = self.sink.put_string(sel, name);
                }
                let _ = self.sink.end_str(sel);
            }
            FieldType::Int32 | FieldType::Int64 | FieldType::UInt32 | FieldType::UInt64 => {
                numbers::emit_number(&mut self.sink, &key_field, self.accum.get(chunk))?;
            }
            FieldType::Bool => {
                let name = self.accum.get(chunk);
                let value = match name {
                    b"true" => true,
                    b"false" => false,
                    _ => {
                        return Err(ErrorKind::MapBoolKey(
                            String::from_utf8_lossy(name).into_owned(),
                        ))
                    }
                };
                let _ = self.sink.put_bool(sel, value);
            }
            _ => return Err(ErrorKind::InvalidMapKeyType),
        }

        let top = self.top_mut()?;
        top.field = Some(value_field);
        top.is_mapentry = true;
        self.multipart_end();
        Ok(())
    }

    fn end_member(&mut self) -> Result<(), ErrorKind> {
        if self.top()?.is_mapentry {
            if !self.sink.end_msg() {
                return Err(ErrorKind::Sink);
            }
            let frame = self
                .frames
                .pop()
                .ok_or(ErrorKind::Internal("frame stack underflow"))?;
            let mapfield = frame
                .mapfield
                .ok_or(ErrorKind::Internal("map entry frame without map field"))?;
            let _ = self.sink.end_submsg(mapfield.selector());
        }
        self.top_mut()?.field = None;
        Ok(())
    }

    fn start_stringval(&mut self) -> Result<(), ErrorKind> {
        let field = self
            .top()?
            .field
            .clone()
            .ok_or(ErrorKind::Internal("string value without a field"))?;
        match field.field_type() {
            FieldType::String | FieldType::Bytes => {
                let top = self.top()?;
                let mut frame = Frame::new(top.msg.clone(), top.table.clone());
                frame.field = Some(field.clone());
                self.frames.push(frame)?;
                let sel = field.selector();
                let _ = self.sink.start_str(sel, 0);
                if field.field_type() == FieldType::String {
                    self.multipart = Multipart::PushEagerly(sel);
                    self.accum.clear();
                } else {
                    // Base64 needs the whole value before decoding.
                    self.multipart_start_accum();
                }
            }
            FieldType::Enum => self.multipart_start_accum(),
            _ => return Err(ErrorKind::StringForNonString(field.name().to_string())),
        }
        Ok(())
    }

    fn end_stringval(&mut self, chunk: &[u8]) -> Result<(), ErrorKind> {
        let field = self
            .top()?
            .field
            .clone()
            .ok_or(ErrorKind::Internal("string value without a field"))?;
        match field.field_type() {
            FieldType::String => {
                self.frames.pop();
                let _ = self.sink.end_str(field.selector());
            }
            FieldType::Bytes => {
                let sel = field.selector();
                base64::decode_to_sink(&mut self.sink, sel, field.name(), self.accum.get(chunk))?;
                self.frames.pop();
                let _ = self.sink.end_str(sel);
            }
            FieldType::Enum => {
                let value = {
                    let name = self.accum.get(chunk);
                    let enumdef = field
                        .enum_subdef()
                        .ok_or(ErrorKind::Internal("enum field without enum def"))?;
                    core::str::from_utf8(name)
                        .ok()
                        .and_then(|s| enumdef.value_by_name(s))
                        .ok_or_else(|| {
                            ErrorKind::UnknownEnumValue(String::from_utf8_lossy(name).into_owned())
                        })?
                };
                let _ = self.sink.put_int32(field.selector(), value);
            }
            _ => return Err(ErrorKind::Internal("unexpected field type at string end")),
        }
        self.multipart_end();
        Ok(())
    }

    fn start_subobject(&mut self) -> Result<(), ErrorKind> {
        let field = self
            .top()?
            .field
            .clone()
            .ok_or(ErrorKind::Internal("object value without a field"))?;
        if field.is_map() {
            let entry_msg = field
                .message_subdef()
                .cloned()
                .ok_or(ErrorKind::Internal("map field without entry message"))?;
            let table = self.table_for(&entry_msg)?;
            let mut frame = Frame::new(entry_msg, table);
            frame.is_map = true;
            frame.mapfield = Some(field.clone());
            self.frames.push(frame)?;
            // The repeated map-entry submessages are modeled as a sequence.
            let _ = self.sink.start_seq(field.selector());
        } else if field.field_type() == FieldType::Message {
            let sub = field
                .message_subdef()
                .cloned()
                .ok_or(ErrorKind::Internal("message field without subdef"))?;
            let table = self.table_for(&sub)?;
            self.frames.push(Frame::new(sub, table))?;
            let _ = self.sink.start_submsg(field.selector());
        } else {
            return Err(ErrorKind::ObjectForNonMessage(field.name().to_string()));
        }
        Ok(())
    }

    fn end_subobject(&mut self) -> Result<(), ErrorKind> {
        let frame = self
            .frames
            .pop()
            .ok_or(ErrorKind::Internal("frame stack underflow"))?;
        if frame.is_map {
            let mapfield = frame
                .mapfield
                .ok_or(ErrorKind::Internal("map frame without map field"))?;
            let _ = self.sink.end_seq(mapfield.selector());
        } else {
            let field = self
                .top()?
                .field
                .clone()
                .ok_or(ErrorKind::Internal("subobject end without a field"))?;
            let _ = self.sink.end_submsg(field.selector());
        }
        Ok(())
    }

    fn start_array(&mut self) -> Result<(), ErrorKind> {
        let field = self
            .top()?
            .field
            .clone()
            .ok_or(ErrorKind::Internal("array value without a field"))?;
        // Maps start via objects, never arrays.
        if !field.is_repeated() || field.is_map() {
            return Err(ErrorKind::ArrayForNonRepeated(field.name().to_string()));
        }
        let top = self.top()?;
        let mut frame = Frame::new(top.msg.clone(), top.table.clone());
        frame.field = Some(field.clone());
        self.frames.push(frame)?;
        let _ = self.sink.start_seq(field.selector());
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), ErrorKind> {
        let frame = self
            .frames
            .pop()
            .ok_or(ErrorKind::Internal("frame stack underflow"))?;
        let field = frame
            .field
            .ok_or(ErrorKind::Internal("array frame without a field"))?;
        let _ = self.sink.end_seq(field.selector());
        Ok(())
    }

    fn put_literal(&mut self, lit: Literal) -> Result<(), ErrorKind> {
        match lit {
            // `null` is accepted for any field and leaves its default.
            Literal::Null => Ok(()),
            Literal::True => self.put_bool(true),
            Literal::False => self.put_bool(false),
        }
    }

    fn put_bool(&mut self, value: bool) -> Result<(), ErrorKind> {
        let field = self
            .top()?
            .field
            .clone()
            .ok_or(ErrorKind::Internal("bool value without a field"))?;
        if field.field_type() != FieldType::Bool {
            return Err(ErrorKind::BoolForNonBool(field.name().to_string()));
        }
        let _ = self.sink.put_bool(field.selector(), value);
        Ok(())
    }

    fn table_for(&self, msg: &Arc<MessageDef>) -> Result<Arc<crate::method::NameTable>, ErrorKind> {
        self.method
            .table(msg)
            .ok_or(ErrorKind::Internal("message not reachable from root"))
    }

    // --------------------------------------------------------------------
    // Multipart text plumbing
    // --------------------------------------------------------------------

    fn start_number(&mut self, offset: usize) -> Result<(), ErrorKind> {
        self.multipart_start_accum();
        self.capture_begin(offset)
    }

    fn end_number(&mut self, chunk: &[u8], offset: usize) -> Result<(), ErrorKind> {
        self.end_text(chunk, offset, true)?;
        let field = self
            .top()?
            .field
            .clone()
            .ok_or(ErrorKind::Internal("number value without a field"))?;
        numbers::emit_number(&mut self.sink, &field, self.accum.get(chunk))?;
        self.multipart_end();
        Ok(())
    }

    fn start_text(&mut self, offset: usize) -> Result<(), ErrorKind> {
        self.capture_begin(offset)
    }

    /// Forwards the open capture as `chunk[start..end]` and deactivates it.
    /// No-op when no capture is open (empty text run).
    fn end_text(&mut self, chunk: &[u8], end: usize, can_alias: bool) -> Result<(), ErrorKind> {
        if let Capture::Active(start) = self.capture {
            self.multipart_text(chunk, start, end, can_alias)?;
            self.capture = Capture::Inactive;
        }
        Ok(())
    }

    fn capture_begin(&mut self, offset: usize) -> Result<(), ErrorKind> {
        debug_assert!(self.multipart != Multipart::Inactive);
        if self.capture != Capture::Inactive {
            return Err(ErrorKind::Internal("capture already active"));
        }
        self.capture = Capture::Active(offset);
        Ok(())
    }

    fn multipart_start_accum(&mut self) {
        self.multipart = Multipart::Accumulate;
        self.accum.clear();
    }

    fn multipart_end(&mut self) {
        debug_assert_eq!(self.capture, Capture::Inactive);
        self.multipart = Multipart::Inactive;
        self.accum.clear();
    }

    fn multipart_text(
        &mut self,
        chunk: &[u8],
        start: usize,
        end: usize,
        can_alias: bool,
    ) -> Result<(), ErrorKind> {
        if start == end {
            return Ok(());
        }
        match self.multipart {
            Multipart::Accumulate => self.accum.append(chunk, start, end, can_alias),
            Multipart::PushEagerly(sel) => {
                let _ = self.sink.put_string(sel, &chunk[start..end]);
                Ok(())
            }
            Multipart::Inactive => Err(ErrorKind::Internal("text outside of a value")),
        }
    }

    /// Routes bytes that did not come from the chunk (decoded escapes).
    fn put_escaped(&mut self, chunk: &[u8], bytes: &[u8]) -> Result<(), ErrorKind> {
        match self.multipart {
            Multipart::Accumulate => self.accum.append_bytes(chunk, bytes),
            Multipart::PushEagerly(sel) => {
                let _ = self.sink.put_string(sel, bytes);
                Ok(())
            }
            Multipart::Inactive => Err(ErrorKind::Internal("escape outside of a value")),
        }
    }

    /// Chunk epilogue: an open capture is forwarded with copying forced and
    /// flagged suspended, and any aliased accumulator content is copied, so
    /// nothing references the chunk after `parse` returns.
    fn suspend(&mut self, chunk: &[u8]) -> Result<(), ErrorKind> {
        if let Capture::Active(start) = self.capture {
            self.multipart_text(chunk, start, chunk.len(), false)?;
            self.capture = Capture::Suspended;
        }
        self.accum.make_owned(chunk)
    }

    // --------------------------------------------------------------------
    // Positions and errors
    // --------------------------------------------------------------------

    #[inline]
    fn advance(&mut self, b: u8) {
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.pos += 1;
    }

    fn fatal(&mut self, kind: ErrorKind) -> ParserError {
        let err = ParserError {
            kind,
            line: self.line,
            column: self.column,
        };
        self.error = Some(err.clone());
        err
    }

    #[cfg(test)]
    pub(crate) fn frames_depth(&self) -> usize {
        self.frames.depth()
    }
}

impl<S: Sink> BytesSink for JsonParser<S> {
    fn parse(&mut self, chunk: &[u8]) -> Result<usize, ParserError> {
        JsonParser::parse(self, chunk)
    }

    fn end(&mut self) -> Result<(), ParserError> {
        JsonParser::end(self)
    }
}

#[inline]
fn is_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Length of the digit run starting at `chunk[i]` (at least 1).
#[inline]
fn digit_run(chunk: &[u8], i: usize) -> usize {
    chunk[i..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .unwrap_or(chunk.len() - i)
}
