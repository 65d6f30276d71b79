use alloc::string::String;
use thiserror::Error;

/// A fatal parse error, positioned at the line and column where it was
/// detected. After any error the parser stops processing input for the
/// current document; further `parse` calls return the same error.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{kind} at {line}:{column}")]
pub struct ParserError {
    pub(crate) kind: ErrorKind,
    pub line: usize,
    pub column: usize,
}

impl ParserError {
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    #[error("Parse error at {0:?}")]
    Syntax(char),
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("Nesting too deep")]
    NestingTooDeep,
    #[error("No such field: {0}")]
    NoSuchField(String),
    #[error("Array specified for non-repeated field: {0}")]
    ArrayForNonRepeated(String),
    #[error("String specified for non-string/non-enum field: {0}")]
    StringForNonString(String),
    #[error("Object specified for non-message field: {0}")]
    ObjectForNonMessage(String),
    #[error("Boolean value specified for non-bool field: {0}")]
    BoolForNonBool(String),
    #[error("Number specified for non-numeric field: {0}")]
    NumberForNonNumeric(String),
    #[error("mapentry message has no key field")]
    MapEntryNoKey,
    #[error("mapentry message has no value field")]
    MapEntryNoValue,
    #[error("Map bool key not 'true' or 'false': {0:?}")]
    MapBoolKey(String),
    #[error("Invalid map key type")]
    InvalidMapKeyType,
    #[error("Enum value unknown: {0:?}")]
    UnknownEnumValue(String),
    #[error("error parsing number: {0:?}")]
    NumberParse(String),
    #[error("Non-base64 characters in field: {0}")]
    NonBase64Chars(String),
    #[error("Incorrect base64 padding in field: {0}")]
    Base64Padding(String),
    #[error("Base64 input for field {0} is not a multiple of 4")]
    Base64Length(String),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Integer overflow")]
    IntegerOverflow,
    #[error("error reported by output sink")]
    Sink,
    #[error("internal error: {0}")]
    Internal(&'static str),
}
