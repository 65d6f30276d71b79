use alloc::{format, sync::Arc, vec, vec::Vec};

use crate::{
    EnumDef, FieldDef, FieldType, JsonParser, MessageDef, ParserError, ParserMethod, Selector,
    Sink,
};

/// Flat record of every handler call, for comparing event sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum Ev {
    StartMsg,
    EndMsg,
    StartSubmsg(u32),
    EndSubmsg(u32),
    StartSeq(u32),
    EndSeq(u32),
    StartStr(u32),
    Str(u32, Vec<u8>),
    EndStr(u32),
    Bool(u32, bool),
    I32(u32, i32),
    I64(u32, i64),
    U32(u32, u32),
    U64(u32, u64),
    F32(u32, f32),
    F64(u32, f64),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Ev>,
}

impl Sink for RecordingSink {
    fn start_msg(&mut self) -> bool {
        self.events.push(Ev::StartMsg);
        true
    }
    fn end_msg(&mut self) -> bool {
        self.events.push(Ev::EndMsg);
        true
    }
    fn start_submsg(&mut self, sel: Selector) -> bool {
        self.events.push(Ev::StartSubmsg(sel.0));
        true
    }
    fn end_submsg(&mut self, sel: Selector) -> bool {
        self.events.push(Ev::EndSubmsg(sel.0));
        true
    }
    fn start_seq(&mut self, sel: Selector) -> bool {
        self.events.push(Ev::StartSeq(sel.0));
        true
    }
    fn end_seq(&mut self, sel: Selector) -> bool {
        self.events.push(Ev::EndSeq(sel.0));
        true
    }
    fn start_str(&mut self, sel: Selector, _size_hint: usize) -> bool {
        self.events.push(Ev::StartStr(sel.0));
        true
    }
    fn put_string(&mut self, sel: Selector, chunk: &[u8]) -> bool {
        self.events.push(Ev::Str(sel.0, chunk.to_vec()));
        true
    }
    fn end_str(&mut self, sel: Selector) -> bool {
        self.events.push(Ev::EndStr(sel.0));
        true
    }
    fn put_bool(&mut self, sel: Selector, value: bool) -> bool {
        self.events.push(Ev::Bool(sel.0, value));
        true
    }
    fn put_int32(&mut self, sel: Selector, value: i32) -> bool {
        self.events.push(Ev::I32(sel.0, value));
        true
    }
    fn put_int64(&mut self, sel: Selector, value: i64) -> bool {
        self.events.push(Ev::I64(sel.0, value));
        true
    }
    fn put_uint32(&mut self, sel: Selector, value: u32) -> bool {
        self.events.push(Ev::U32(sel.0, value));
        true
    }
    fn put_uint64(&mut self, sel: Selector, value: u64) -> bool {
        self.events.push(Ev::U64(sel.0, value));
        true
    }
    fn put_float(&mut self, sel: Selector, value: f32) -> bool {
        self.events.push(Ev::F32(sel.0, value));
        true
    }
    fn put_double(&mut self, sel: Selector, value: f64) -> bool {
        self.events.push(Ev::F64(sel.0, value));
        true
    }
}

pub fn color_enum() -> Arc<EnumDef> {
    EnumDef::new("test.Color", &[("BLACK", 0), ("RED", 1), ("GREEN", 2)])
}

pub fn child_message() -> Arc<MessageDef> {
    MessageDef::new(
        "test.Child",
        vec![
            FieldDef::new("x", 1, FieldType::Int32),
            FieldDef::new("s", 2, FieldType::String),
        ],
    )
}

/// The fixture schema used by most tests. Field numbers double as
/// selectors in the expected event sequences.
pub fn test_message() -> Arc<MessageDef> {
    let child = child_message();
    let color = color_enum();
    MessageDef::new(
        "test.Message",
        vec![
            FieldDef::new("a", 1, FieldType::Int32),
            FieldDef::new("b", 2, FieldType::String),
            FieldDef::new("raw", 3, FieldType::Bytes),
            FieldDef::new("flag", 4, FieldType::Bool),
            FieldDef::new("big", 5, FieldType::Int64),
            FieldDef::new("u", 6, FieldType::UInt32),
            FieldDef::new("uu", 7, FieldType::UInt64),
            FieldDef::new("f", 8, FieldType::Float),
            FieldDef::new("d", 9, FieldType::Double),
            FieldDef::enumeration("color", 10, &color),
            FieldDef::message("child", 11, &child),
            FieldDef::new("nums", 12, FieldType::Int32).repeated(),
            FieldDef::new("tags", 13, FieldType::String).repeated(),
            FieldDef::message("children", 14, &child).repeated(),
            FieldDef::map("counts", 15, FieldType::String, FieldType::Int32),
            FieldDef::map("names", 16, FieldType::Int32, FieldType::String),
            FieldDef::map("flags", 17, FieldType::Bool, FieldType::String),
            FieldDef::map("attrs", 18, FieldType::String, FieldType::String),
            FieldDef::new("snake_name", 19, FieldType::String),
            FieldDef::map_of_messages("objs", 20, FieldType::String, &child),
        ],
    )
}

/// A chain of `levels` single-field messages around an int32 leaf, for
/// nesting-depth tests.
pub fn deep_schema(levels: usize) -> Arc<MessageDef> {
    let mut msg = MessageDef::new("test.Leaf", vec![FieldDef::new("x", 1, FieldType::Int32)]);
    for i in 0..levels {
        msg = MessageDef::new(&format!("test.N{i}"), vec![FieldDef::message("a", 1, &msg)]);
    }
    msg
}

pub fn parse_chunks(
    schema: &Arc<MessageDef>,
    chunks: &[&[u8]],
) -> Result<Vec<Ev>, (ParserError, Vec<Ev>)> {
    let method = ParserMethod::new(schema.clone());
    let mut parser = JsonParser::new(method, RecordingSink::default());
    for chunk in chunks {
        if let Err(err) = parser.parse(chunk) {
            return Err((err, parser.into_sink().events));
        }
    }
    if let Err(err) = parser.end() {
        return Err((err, parser.into_sink().events));
    }
    Ok(parser.into_sink().events)
}

/// Parses a complete document against the fixture schema.
pub fn events(json: &str) -> Vec<Ev> {
    match parse_chunks(&test_message(), &[json.as_bytes()]) {
        Ok(events) => events,
        Err((err, _)) => panic!("unexpected parse failure for {json}: {err}"),
    }
}

/// Parses expecting failure; returns the error.
pub fn parse_err(schema: &Arc<MessageDef>, json: &str) -> ParserError {
    match parse_chunks(schema, &[json.as_bytes()]) {
        Ok(_) => panic!("expected parse failure for {json}"),
        Err((err, _)) => err,
    }
}

pub fn err(json: &str) -> ParserError {
    parse_err(&test_message(), json)
}

/// Coalesces adjacent string chunks of the same value. Chunk grouping
/// within one string is partition-dependent and not part of the event
/// contract; the concatenation is.
pub fn normalize(events: Vec<Ev>) -> Vec<Ev> {
    let mut out: Vec<Ev> = Vec::new();
    for ev in events {
        if let Ev::Str(sel, bytes) = &ev {
            if let Some(Ev::Str(prev_sel, prev_bytes)) = out.last_mut() {
                if prev_sel == sel {
                    prev_bytes.extend_from_slice(bytes);
                    continue;
                }
            }
        }
        out.push(ev);
    }
    out
}
