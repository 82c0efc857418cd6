use std::iter::Fuse;

use crate::utf8::{
    dfa::{decode_utf8, Outcome, State},
    error::Utf8Error,
};

/// Result of feeding one byte to a [`Utf8Decoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoded {
    Char(char),
    Pending,
    Invalid,
}

/// The `(state, codepoint)` pair of the automaton, held by value.
///
/// After [`Decoded::Invalid`] the decoder stays invalid until [`reset`]
/// is called.
///
/// [`reset`]: Utf8Decoder::reset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Utf8Decoder {
    state: State,
    codepoint: u32,
}

impl Utf8Decoder {
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: State::ACCEPT,
            codepoint: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, byte: u8) -> Decoded {
        match decode_utf8(&mut self.state, &mut self.codepoint, byte).outcome() {
            Outcome::Accept => match char::from_u32(self.codepoint) {
                Some(c) => Decoded::Char(c),
                None => Decoded::Invalid,
            },
            Outcome::More => Decoded::Pending,
            Outcome::Reject => Decoded::Invalid,
        }
    }

    pub const fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub const fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Decodes a byte stream into scalar values, reporting ill-formed
/// sequences as errors and carrying on after them.
///
/// A sequence cut short by an unexpected byte is reported as one error
/// covering the bytes before it, and that byte is then decoded afresh. A
/// byte that cannot start a sequence is one error on its own. Each error
/// therefore corresponds to exactly one U+FFFD in the substitution scheme
/// used by [`String::from_utf8_lossy`].
pub fn decode<I: IntoIterator<Item = u8>>(bytes: I) -> Decode<I::IntoIter> {
    Decode {
        bytes: bytes.into_iter().fuse(),
        decoder: Utf8Decoder::new(),
        pos: 0,
        start: 0,
        replay: None,
    }
}

/// Like [`decode`], with every error replaced by U+FFFD.
pub fn decode_lossy<I: IntoIterator<Item = u8>>(bytes: I) -> impl Iterator<Item = char> {
    decode(bytes).map(|item| item.unwrap_or(char::REPLACEMENT_CHARACTER))
}

/// Returns the number of scalar values in `bytes`, or the first error.
pub fn validate(bytes: &[u8]) -> Result<usize, Utf8Error> {
    let mut count = 0;
    for item in decode(bytes.iter().copied()) {
        item?;
        count += 1;
    }
    Ok(count)
}

pub struct Decode<I> {
    bytes: Fuse<I>,
    decoder: Utf8Decoder,
    // bytes taken from `bytes` so far
    pos: usize,
    // offset of the first byte of the sequence in flight
    start: usize,
    replay: Option<u8>,
}

impl<I> Decode<I> {
    /// Byte offset of the next byte to be decoded.
    pub fn offset(&self) -> usize {
        self.pos - usize::from(self.replay.is_some())
    }
}

impl<I: Iterator<Item = u8>> Iterator for Decode<I> {
    type Item = Result<char, Utf8Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (byte, at) = match self.replay.take() {
                Some(byte) => (byte, self.pos - 1),
                None => match self.bytes.next() {
                    Some(byte) => {
                        self.pos += 1;
                        (byte, self.pos - 1)
                    }
                    None if self.decoder.is_pending() => {
                        self.decoder.reset();
                        return Some(Err(Utf8Error::Truncated {
                            offset: self.start,
                            len: self.pos - self.start,
                        }));
                    }
                    None => return None,
                },
            };
            if !self.decoder.is_pending() {
                self.start = at;
            }
            match self.decoder.push(byte) {
                Decoded::Char(c) => return Some(Ok(c)),
                Decoded::Pending => {}
                Decoded::Invalid => {
                    self.decoder.reset();
                    let len = if at == self.start {
                        1
                    } else {
                        self.replay = Some(byte);
                        at - self.start
                    };
                    return Some(Err(Utf8Error::Malformed {
                        offset: self.start,
                        len,
                    }));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // one replayed byte plus one trailing truncation error at most
        let (lower, upper) = self.bytes.size_hint();
        (lower.div_ceil(4), upper.and_then(|upper| upper.checked_add(2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn collect(bytes: &[u8]) -> Vec<Result<char, Utf8Error>> {
        decode(bytes.iter().copied()).collect()
    }

    #[test]
    fn push_multibyte() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.push(0xC3), Decoded::Pending);
        assert!(decoder.is_pending());
        assert_eq!(decoder.push(0xA9), Decoded::Char('é'));
        assert!(!decoder.is_pending());
        assert_eq!(decoder.push(0x00), Decoded::Char('\0'));
    }

    #[test]
    fn push_stays_invalid_until_reset() {
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.push(0x80), Decoded::Invalid);
        assert_eq!(decoder.push(b'a'), Decoded::Invalid);
        assert!(decoder.state().is_reject());
        decoder.reset();
        assert_eq!(decoder.push(b'a'), Decoded::Char('a'));
    }

    #[test]
    fn lone_continuation_between_ascii() {
        assert_eq!(
            collect(b"a\x80b"),
            vec![
                Ok('a'),
                Err(Utf8Error::Malformed { offset: 1, len: 1 }),
                Ok('b'),
            ]
        );
    }

    #[test]
    fn overlong_nul_is_three_errors() {
        assert_eq!(
            collect(b"\xE0\x80\x80"),
            vec![
                Err(Utf8Error::Malformed { offset: 0, len: 1 }),
                Err(Utf8Error::Malformed { offset: 1, len: 1 }),
                Err(Utf8Error::Malformed { offset: 2, len: 1 }),
            ]
        );
    }

    #[test]
    fn cut_short_sequence_replays_byte() {
        assert_eq!(
            collect(b"\xF0\x9F\x98A"),
            vec![Err(Utf8Error::Malformed { offset: 0, len: 3 }), Ok('A')]
        );
    }

    #[test]
    fn lead_byte_mid_sequence_resynchronizes() {
        assert_eq!(
            collect(b"\xE4\xC3\xA9"),
            vec![Err(Utf8Error::Malformed { offset: 0, len: 1 }), Ok('é')]
        );
    }

    #[test]
    fn truncated_at_end() {
        let mut iter = decode(b"ab\xE4\xB8".iter().copied());
        assert_eq!(iter.next(), Some(Ok('a')));
        assert_eq!(iter.next(), Some(Ok('b')));
        assert_eq!(iter.offset(), 2);
        assert_eq!(iter.next(), Some(Err(Utf8Error::Truncated { offset: 2, len: 2 })));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn lossy() {
        let text: String = decode_lossy(b"caf\xC3\xFF!".iter().copied()).collect();
        assert_eq!(text, "caf\u{FFFD}\u{FFFD}!");
    }

    #[test]
    fn validate_counts_scalars() {
        assert_eq!(validate(b""), Ok(0));
        assert_eq!(validate(b"\0"), Ok(1));
        assert_eq!(validate("成为更健康、更长久的世界一流企业".as_bytes()), Ok(16));
        assert_eq!(
            validate(b"ok\xED\xA0\x80"),
            Err(Utf8Error::Malformed { offset: 2, len: 1 })
        );
        assert_eq!(
            validate(b"ok\xF4\x8F\xBF"),
            Err(Utf8Error::Truncated { offset: 2, len: 3 })
        );
    }

    proptest! {
        #[test]
        fn validate_agrees_with_std(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            match (validate(&bytes), core::str::from_utf8(&bytes)) {
                (Ok(count), Ok(s)) => prop_assert_eq!(count, s.chars().count()),
                (Err(ours), Err(theirs)) => {
                    prop_assert_eq!(ours.valid_up_to(), theirs.valid_up_to());
                    prop_assert_eq!(ours.error_len(), theirs.error_len());
                }
                (ours, theirs) => prop_assert!(false, "{:?} vs {:?}", ours, theirs),
            }
        }

        #[test]
        fn lossy_agrees_with_std(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let ours: String = decode_lossy(bytes.iter().copied()).collect();
            prop_assert_eq!(ours, String::from_utf8_lossy(&bytes).into_owned());
        }

        #[test]
        fn decodes_valid_strings(s in any::<String>()) {
            let chars: Result<String, _> = decode(s.bytes()).collect();
            prop_assert_eq!(chars, Ok(s));
        }
    }
}
