//! The multipart accumulator: a logical byte string assembled from pieces.
//!
//! While a member name, number literal, enum name, bytes value, or map key
//! is being recognized, its text may arrive as several ranges of the input
//! (separated by escape sequences or chunk boundaries). The accumulator
//! holds the concatenation. When the whole value lies in one range of the
//! current chunk it is adopted by reference (zero copy); as soon as a
//! second piece arrives, or the chunk is about to be released, the content
//! moves into an owned buffer that is retained across values.
//!
//! Aliases are stored as offsets and resolved against the chunk passed to
//! the current `parse` call, so a borrow of the input can never outlive it.

use alloc::vec::Vec;

use super::error::ErrorKind;

const INITIAL_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repr {
    Empty,
    /// Content is `chunk[start..start + len]` of the current input chunk.
    Aliased { start: usize, len: usize },
    /// Content is the owned buffer.
    Owned,
}

#[derive(Debug)]
pub(crate) struct Accumulator {
    buf: Vec<u8>,
    repr: Repr,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            repr: Repr::Empty,
        }
    }

    /// Resets to empty. The owned buffer keeps its capacity for reuse.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.repr = Repr::Empty;
    }

    /// Appends `chunk[start..end]`. An empty accumulator adopts the range
    /// by reference when `can_alias` holds; otherwise the bytes are copied
    /// into the owned buffer.
    pub fn append(
        &mut self,
        chunk: &[u8],
        start: usize,
        end: usize,
        can_alias: bool,
    ) -> Result<(), ErrorKind> {
        if start == end {
            return Ok(());
        }
        if can_alias && self.repr == Repr::Empty {
            self.repr = Repr::Aliased {
                start,
                len: end - start,
            };
            return Ok(());
        }
        self.flatten(chunk)?;
        self.push_bytes(&chunk[start..end])
    }

    /// Appends bytes that do not come from the input chunk (decoded escape
    /// sequences). Always copies.
    pub fn append_bytes(&mut self, chunk: &[u8], bytes: &[u8]) -> Result<(), ErrorKind> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.flatten(chunk)?;
        self.push_bytes(bytes)
    }

    /// The logical content. Valid until the next append or until `chunk` is
    /// released.
    pub fn get<'a>(&'a self, chunk: &'a [u8]) -> &'a [u8] {
        match self.repr {
            Repr::Empty => &[],
            Repr::Aliased { start, len } => &chunk[start..start + len],
            Repr::Owned => &self.buf,
        }
    }

    /// Copies any aliased content into the owned buffer. Called before the
    /// current chunk is released back to the caller.
    pub fn make_owned(&mut self, chunk: &[u8]) -> Result<(), ErrorKind> {
        self.flatten(chunk)
    }

    fn flatten(&mut self, chunk: &[u8]) -> Result<(), ErrorKind> {
        if let Repr::Aliased { start, len } = self.repr {
            debug_assert!(self.buf.is_empty());
            self.reserve_for(len)?;
            self.buf.extend_from_slice(&chunk[start..start + len]);
            self.repr = Repr::Owned;
        }
        Ok(())
    }

    fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        self.reserve_for(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        self.repr = Repr::Owned;
        Ok(())
    }

    /// Geometric growth from a 128-byte floor, with explicit overflow and
    /// allocation-failure reporting.
    fn reserve_for(&mut self, extra: usize) -> Result<(), ErrorKind> {
        let need = self
            .buf
            .len()
            .checked_add(extra)
            .ok_or(ErrorKind::IntegerOverflow)?;
        if need <= self.buf.capacity() {
            return Ok(());
        }
        let mut cap = self.buf.capacity().max(INITIAL_CAPACITY);
        while cap < need {
            cap = cap.saturating_mul(2);
        }
        self.buf
            .try_reserve(cap - self.buf.len())
            .map_err(|_| ErrorKind::OutOfMemory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adopts_first_piece_by_reference() {
        let chunk = b"hello world";
        let mut acc = Accumulator::new();
        acc.append(chunk, 0, 5, true).unwrap();
        assert_eq!(acc.get(chunk), b"hello");
        assert_eq!(acc.repr, Repr::Aliased { start: 0, len: 5 });
    }

    #[test]
    fn second_piece_forces_copy() {
        let chunk = b"hello world";
        let mut acc = Accumulator::new();
        acc.append(chunk, 0, 5, true).unwrap();
        acc.append(chunk, 6, 11, true).unwrap();
        assert_eq!(acc.get(chunk), b"helloworld");
        assert_eq!(acc.repr, Repr::Owned);
    }

    #[test]
    fn can_alias_false_copies_immediately() {
        let chunk = b"abc";
        let mut acc = Accumulator::new();
        acc.append(chunk, 0, 3, false).unwrap();
        assert_eq!(acc.repr, Repr::Owned);
        assert_eq!(acc.get(b""), b"abc");
    }

    #[test]
    fn make_owned_survives_chunk_release() {
        let mut acc = Accumulator::new();
        {
            let chunk = b"transient";
            acc.append(chunk, 0, 9, true).unwrap();
            acc.make_owned(chunk).unwrap();
        }
        assert_eq!(acc.get(b""), b"transient");
    }

    #[test]
    fn escape_bytes_flatten_alias() {
        let chunk = b"ab";
        let mut acc = Accumulator::new();
        acc.append(chunk, 0, 2, true).unwrap();
        acc.append_bytes(chunk, b"\n").unwrap();
        assert_eq!(acc.get(b""), b"ab\n");
    }

    #[test]
    fn clear_retains_capacity() {
        let chunk = [b'x'; 300];
        let mut acc = Accumulator::new();
        acc.append(&chunk, 0, 300, false).unwrap();
        let cap = acc.buf.capacity();
        assert!(cap >= 300);
        acc.clear();
        assert_eq!(acc.get(b""), b"");
        assert_eq!(acc.buf.capacity(), cap);
    }
}
