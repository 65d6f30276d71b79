//! Incremental matcher for the keyword literals `true`, `false`, `null`.

/// Keyword literal recognized by the value machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Literal {
    True,
    False,
    Null,
}

/// What happened after feeding one more byte into the literal matcher?
pub(crate) enum Step {
    /// Byte matched, but the literal is not finished yet.
    NeedMore,
    /// Byte matched and completed the literal.
    Done(Literal),
    /// Byte did not match the expected one.
    Reject,
}

/// `None` when no literal is in flight; `Some((remaining, literal))` while
/// matching. Survives chunk boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExpectedLiteral(Option<(&'static [u8], Literal)>);

impl ExpectedLiteral {
    pub fn none() -> Self {
        ExpectedLiteral(None)
    }

    /// Starts matching after the first byte (`t`, `f`, or `n`).
    pub fn new(first: u8) -> Self {
        match first {
            b't' => ExpectedLiteral(Some((b"rue", Literal::True))),
            b'f' => ExpectedLiteral(Some((b"alse", Literal::False))),
            b'n' => ExpectedLiteral(Some((b"ull", Literal::Null))),
            _ => ExpectedLiteral::none(),
        }
    }

    /// Gives the matcher the next input byte and learns what to do next.
    pub fn step(&mut self, b: u8) -> Step {
        let Some((bytes, literal)) = self.0.take() else {
            return Step::Reject;
        };

        match bytes.split_first() {
            Some((expected, rest)) if *expected == b => {
                if rest.is_empty() {
                    Step::Done(literal)
                } else {
                    self.0 = Some((rest, literal));
                    Step::NeedMore
                }
            }
            _ => {
                self.0 = Some((bytes, literal));
                Step::Reject
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_true() {
        let mut m = ExpectedLiteral::new(b't');
        assert!(matches!(m.step(b'r'), Step::NeedMore));
        assert!(matches!(m.step(b'u'), Step::NeedMore));
        assert!(matches!(m.step(b'e'), Step::Done(Literal::True)));
    }

    #[test]
    fn rejects_mismatch() {
        let mut m = ExpectedLiteral::new(b'n');
        assert!(matches!(m.step(b'u'), Step::NeedMore));
        assert!(matches!(m.step(b'x'), Step::Reject));
    }

    #[test]
    fn unknown_first_byte_rejects() {
        let mut m = ExpectedLiteral::new(b'z');
        assert!(matches!(m.step(b'z'), Step::Reject));
    }
}
