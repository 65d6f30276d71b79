//! Minimal protobuf descriptor model.
//!
//! The parser only needs a narrow slice of the descriptor surface: member
//! name lookup, field numbers and declared types, submessage and enum
//! access, and the map-entry convention. This module supplies exactly that,
//! with descriptors shared immutably behind `Arc` so one schema can
//! configure any number of parsers.
//!
//! Member names resolve against both the field's JSON name (an explicit
//! override, or the lowerCamelCase derivation of the proto name) and, when
//! different, the proto name itself.

use alloc::{
    format,
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};

use crate::sink::Selector;

/// Field number of the synthetic key field in a map-entry message.
pub(crate) const MAP_KEY_FIELD: u32 = 1;
/// Field number of the synthetic value field in a map-entry message.
pub(crate) const MAP_VALUE_FIELD: u32 = 2;

/// Declared type of a protobuf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    Bytes,
    Enum,
    Message,
}

/// A protobuf enum: symbolic names bound to `int32` values.
#[derive(Debug)]
pub struct EnumDef {
    full_name: String,
    values: Vec<(String, i32)>,
}

impl EnumDef {
    #[must_use]
    pub fn new(full_name: &str, values: &[(&str, i32)]) -> Arc<Self> {
        Arc::new(Self {
            full_name: full_name.to_string(),
            values: values
                .iter()
                .map(|(name, number)| (name.to_string(), *number))
                .collect(),
        })
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Resolves a symbolic enum name to its declared number.
    #[must_use]
    pub fn value_by_name(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, number)| *number)
    }
}

/// One field of a message.
#[derive(Debug)]
pub struct FieldDef {
    name: String,
    json_name: String,
    number: u32,
    ty: FieldType,
    repeated: bool,
    message: Option<Arc<MessageDef>>,
    enumeration: Option<Arc<EnumDef>>,
}

impl FieldDef {
    /// Creates a singular scalar field. The JSON name is derived from
    /// `name` by lowerCamelCase conversion unless overridden with
    /// [`FieldDef::json_name`].
    #[must_use]
    pub fn new(name: &str, number: u32, ty: FieldType) -> Self {
        Self {
            name: name.to_string(),
            json_name: camel_case(name),
            number,
            ty,
            repeated: false,
            message: None,
            enumeration: None,
        }
    }

    /// Creates a message-typed field.
    #[must_use]
    pub fn message(name: &str, number: u32, msg: &Arc<MessageDef>) -> Self {
        let mut field = Self::new(name, number, FieldType::Message);
        field.message = Some(msg.clone());
        field
    }

    /// Creates an enum-typed field.
    #[must_use]
    pub fn enumeration(name: &str, number: u32, en: &Arc<EnumDef>) -> Self {
        let mut field = Self::new(name, number, FieldType::Enum);
        field.enumeration = Some(en.clone());
        field
    }

    /// Creates a map field with scalar values. The synthetic map-entry
    /// message (key field 1, value field 2) is built here.
    #[must_use]
    pub fn map(name: &str, number: u32, key: FieldType, value: FieldType) -> Self {
        Self::map_with_value(name, number, key, FieldDef::new("value", MAP_VALUE_FIELD, value))
    }

    /// Creates a map field whose values are messages.
    #[must_use]
    pub fn map_of_messages(
        name: &str,
        number: u32,
        key: FieldType,
        value_msg: &Arc<MessageDef>,
    ) -> Self {
        Self::map_with_value(
            name,
            number,
            key,
            FieldDef::message("value", MAP_VALUE_FIELD, value_msg),
        )
    }

    fn map_with_value(name: &str, number: u32, key: FieldType, value: FieldDef) -> Self {
        let entry = MessageDef::map_entry(
            &format!("{name}Entry"),
            FieldDef::new("key", MAP_KEY_FIELD, key),
            value,
        );
        let mut field = Self::new(name, number, FieldType::Message);
        field.repeated = true;
        field.message = Some(entry);
        field
    }

    /// Marks the field repeated.
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Overrides the derived JSON name.
    #[must_use]
    pub fn json_name(mut self, json_name: &str) -> Self {
        self.json_name = json_name.to_string();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn json_name_str(&self) -> &str {
        &self.json_name
    }

    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.ty
    }

    #[must_use]
    pub fn is_repeated(&self) -> bool {
        self.repeated
    }

    /// True for map fields: repeated message fields whose type is a
    /// map-entry message.
    #[must_use]
    pub fn is_map(&self) -> bool {
        self.repeated
            && self.ty == FieldType::Message
            && self.message.as_ref().is_some_and(|m| m.is_map_entry())
    }

    #[must_use]
    pub fn message_subdef(&self) -> Option<&Arc<MessageDef>> {
        self.message.as_ref()
    }

    #[must_use]
    pub fn enum_subdef(&self) -> Option<&Arc<EnumDef>> {
        self.enumeration.as_ref()
    }

    /// The handle identifying this field on the output sink.
    #[must_use]
    pub fn selector(&self) -> Selector {
        Selector(self.number)
    }
}

/// A protobuf message type.
#[derive(Debug)]
pub struct MessageDef {
    full_name: String,
    fields: Vec<Arc<FieldDef>>,
    map_entry: bool,
}

impl MessageDef {
    #[must_use]
    pub fn new(full_name: &str, fields: Vec<FieldDef>) -> Arc<Self> {
        Arc::new(Self {
            full_name: full_name.to_string(),
            fields: fields.into_iter().map(Arc::new).collect(),
            map_entry: false,
        })
    }

    fn map_entry(full_name: &str, key: FieldDef, value: FieldDef) -> Arc<Self> {
        Arc::new(Self {
            full_name: full_name.to_string(),
            fields: alloc::vec![Arc::new(key), Arc::new(value)],
            map_entry: true,
        })
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn fields(&self) -> &[Arc<FieldDef>] {
        &self.fields
    }

    #[must_use]
    pub fn field_by_number(&self, number: u32) -> Option<&Arc<FieldDef>> {
        self.fields.iter().find(|f| f.number == number)
    }

    /// True for the synthetic message type representing one map entry.
    #[must_use]
    pub fn is_map_entry(&self) -> bool {
        self.map_entry
    }
}

/// Derives the JSON name from a proto field name: underscores are removed
/// and the following letter is uppercased.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_derivation() {
        assert_eq!(camel_case("foo_bar"), "fooBar");
        assert_eq!(camel_case("foo_bar_baz"), "fooBarBaz");
        assert_eq!(camel_case("already"), "already");
        assert_eq!(camel_case("trailing_"), "trailing");
    }

    #[test]
    fn json_name_override() {
        let f = FieldDef::new("snake_name", 1, FieldType::String);
        assert_eq!(f.json_name_str(), "snakeName");
        let f = FieldDef::new("snake_name", 1, FieldType::String).json_name("weird");
        assert_eq!(f.json_name_str(), "weird");
    }

    #[test]
    fn map_field_shape() {
        let f = FieldDef::map("counts", 3, FieldType::String, FieldType::Int32);
        assert!(f.is_map());
        assert!(f.is_repeated());
        let entry = f.message_subdef().unwrap();
        assert!(entry.is_map_entry());
        let key = entry.field_by_number(MAP_KEY_FIELD).unwrap();
        let value = entry.field_by_number(MAP_VALUE_FIELD).unwrap();
        assert_eq!(key.field_type(), FieldType::String);
        assert_eq!(value.field_type(), FieldType::Int32);
    }

    #[test]
    fn repeated_message_is_not_map() {
        let child = MessageDef::new("test.Child", alloc::vec![]);
        let f = FieldDef::message("children", 4, &child).repeated();
        assert!(!f.is_map());
    }

    #[test]
    fn enum_lookup() {
        let en = EnumDef::new("test.Color", &[("RED", 1), ("GREEN", 2)]);
        assert_eq!(en.value_by_name("GREEN"), Some(2));
        assert_eq!(en.value_by_name("PINK"), None);
    }
}
