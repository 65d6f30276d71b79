//! Scalar coercion of completed number literals.
//!
//! The lexer guarantees the literal is well-formed JSON number syntax; this
//! module converts it to the target field's declared type and emits it
//! through the matching handler. Range errors and any representation the
//! target type cannot parse surface as "error parsing number" — notably,
//! integer fields do not accept exponent form (`1e6`) even though JSON
//! permits it.

use alloc::string::ToString;
use core::str::{self, FromStr};

use super::error::ErrorKind;
use crate::schema::{FieldDef, FieldType};
use crate::sink::Sink;

/// Converts `text` per the field's scalar type and emits it to the sink.
pub(crate) fn emit_number<S: Sink>(
    sink: &mut S,
    field: &FieldDef,
    text: &[u8],
) -> Result<(), ErrorKind> {
    let s = str::from_utf8(text).map_err(|_| ErrorKind::Internal("number literal not ASCII"))?;
    let sel = field.selector();
    match field.field_type() {
        FieldType::Int32 => {
            let _ = sink.put_int32(sel, parse(s)?);
        }
        FieldType::Int64 => {
            let _ = sink.put_int64(sel, parse(s)?);
        }
        FieldType::UInt32 => {
            let _ = sink.put_uint32(sel, parse(s)?);
        }
        FieldType::UInt64 => {
            let _ = sink.put_uint64(sel, parse(s)?);
        }
        FieldType::Float => {
            let _ = sink.put_float(sel, parse(s)?);
        }
        FieldType::Double => {
            let _ = sink.put_double(sel, parse(s)?);
        }
        // Numeric enum values ride the int32 path; symbolic names go
        // through the string machine instead.
        FieldType::Enum => {
            let _ = sink.put_int32(sel, parse(s)?);
        }
        FieldType::Bool | FieldType::String | FieldType::Bytes | FieldType::Message => {
            return Err(ErrorKind::NumberForNonNumeric(field.name().to_string()));
        }
    }
    Ok(())
}

fn parse<T: FromStr>(s: &str) -> Result<T, ErrorKind> {
    s.parse().map_err(|_| ErrorKind::NumberParse(s.to_string()))
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::sink::Selector;

    #[derive(Default)]
    struct Last {
        i32s: Vec<i32>,
        u64s: Vec<u64>,
        f64s: Vec<f64>,
    }

    impl Sink for Last {
        fn put_int32(&mut self, _sel: Selector, value: i32) -> bool {
            self.i32s.push(value);
            true
        }
        fn put_uint64(&mut self, _sel: Selector, value: u64) -> bool {
            self.u64s.push(value);
            true
        }
        fn put_double(&mut self, _sel: Selector, value: f64) -> bool {
            self.f64s.push(value);
            true
        }
    }

    #[test]
    fn int32_bounds() {
        let field = FieldDef::new("a", 1, FieldType::Int32);
        let mut sink = Last::default();
        emit_number(&mut sink, &field, b"2147483647").unwrap();
        emit_number(&mut sink, &field, b"-2147483648").unwrap();
        assert_eq!(sink.i32s, [i32::MAX, i32::MIN]);
        assert!(matches!(
            emit_number(&mut sink, &field, b"2147483648"),
            Err(ErrorKind::NumberParse(_))
        ));
    }

    #[test]
    fn integer_rejects_exponent_form() {
        let field = FieldDef::new("a", 1, FieldType::Int32);
        let mut sink = Last::default();
        assert!(matches!(
            emit_number(&mut sink, &field, b"1e6"),
            Err(ErrorKind::NumberParse(_))
        ));
        assert!(matches!(
            emit_number(&mut sink, &field, b"1.0"),
            Err(ErrorKind::NumberParse(_))
        ));
    }

    #[test]
    fn uint64_range() {
        let field = FieldDef::new("uu", 1, FieldType::UInt64);
        let mut sink = Last::default();
        emit_number(&mut sink, &field, b"18446744073709551615").unwrap();
        assert_eq!(sink.u64s, [u64::MAX]);
        assert!(matches!(
            emit_number(&mut sink, &field, b"-1"),
            Err(ErrorKind::NumberParse(_))
        ));
    }

    #[test]
    fn double_accepts_exponents() {
        let field = FieldDef::new("d", 1, FieldType::Double);
        let mut sink = Last::default();
        emit_number(&mut sink, &field, b"1e6").unwrap();
        emit_number(&mut sink, &field, b"-0.25").unwrap();
        assert_eq!(sink.f64s, [1e6, -0.25]);
    }

    #[test]
    fn non_numeric_field_rejected() {
        let field = FieldDef::new("b", 1, FieldType::String);
        let mut sink = Last::default();
        assert!(matches!(
            emit_number(&mut sink, &field, b"1"),
            Err(ErrorKind::NumberForNonNumeric(_))
        ));
    }
}
