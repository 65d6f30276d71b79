#![no_main]
use std::sync::{Arc, OnceLock};

use libfuzzer_sys::fuzz_target;
use protomodem::{
    EnumDef, FieldDef, FieldType, JsonParser, MessageDef, ParserMethod, Sink,
};

struct Discard;

impl Sink for Discard {}

fn method() -> Arc<ParserMethod> {
    static METHOD: OnceLock<Arc<ParserMethod>> = OnceLock::new();
    METHOD
        .get_or_init(|| {
            let color = EnumDef::new("fuzz.Color", &[("A", 0), ("B", 1)]);
            let child = MessageDef::new(
                "fuzz.Child",
                vec![
                    FieldDef::new("x", 1, FieldType::Int32),
                    FieldDef::new("s", 2, FieldType::String),
                ],
            );
            let root = MessageDef::new(
                "fuzz.Root",
                vec![
                    FieldDef::new("i", 1, FieldType::Int32),
                    FieldDef::new("s", 2, FieldType::String),
                    FieldDef::new("raw", 3, FieldType::Bytes),
                    FieldDef::new("b", 4, FieldType::Bool),
                    FieldDef::new("d", 5, FieldType::Double),
                    FieldDef::enumeration("e", 6, &color),
                    FieldDef::message("child", 7, &child),
                    FieldDef::new("nums", 8, FieldType::Int32).repeated(),
                    FieldDef::map("m", 9, FieldType::String, FieldType::Int32),
                ],
            );
            ParserMethod::new(root)
        })
        .clone()
}

// First two bytes seed the chunk splitting; the rest is parser input. The
// parser must never panic, and after the first error it must stay stuck.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    let split_seed = usize::from(data[0]) | (usize::from(data[1]) << 8);
    let data = &data[2..];

    let mut parser = JsonParser::new(method(), Discard);
    let mut idx = 0;
    let mut failed = false;
    while idx < data.len() {
        let remaining = data.len() - idx;
        let size = 1 + split_seed % remaining;
        if parser.parse(&data[idx..idx + size]).is_err() {
            failed = true;
            break;
        }
        idx += size;
    }

    if failed {
        assert!(parser.parse(b"{}").is_err());
        assert!(parser.end().is_err());
    } else {
        let _ = parser.end();
    }
});
