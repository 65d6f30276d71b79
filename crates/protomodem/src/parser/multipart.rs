//! Multipart routing state for the string or number value in flight.
//!
//! `Capture` marks the range of the current input chunk that belongs to the
//! value being recognized. A capture begun in one chunk and not closed by
//! its end is forwarded (with copying forced) and flagged `Suspended`; the
//! next `parse` call re-anchors it at offset 0.
//!
//! `Multipart` selects the destination for captured text and decoded
//! escapes: the accumulator, for values that must be inspected whole
//! (member names, numbers, enum names, bytes fields, map keys), or the
//! sink's string handler, for ordinary string fields whose chunks can flow
//! through without buffering.

use crate::sink::Selector;

/// Byte range of the current input chunk belonging to the value in
/// progress. At most one capture is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Capture {
    Inactive,
    /// Capture began at this offset of the current chunk.
    Active(usize),
    /// The value continues in the next chunk; the partial text has already
    /// been forwarded with copying forced.
    Suspended,
}

/// Destination of multipart text while a string or number value is open.
/// `Inactive` exactly when no such value is being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Multipart {
    Inactive,
    /// Buffer in the accumulator for inspection at value end.
    Accumulate,
    /// Forward each piece directly to the sink's string handler.
    PushEagerly(Selector),
}
