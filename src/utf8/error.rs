use thiserror::Error;

/// An ill-formed stretch of input found while decoding a byte stream.
///
/// `offset` is the byte offset of the first byte of the offending sequence
/// and `len` the number of bytes it spans. Everything before `offset` is
/// well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Utf8Error {
    #[error("invalid UTF-8 sequence of {len} byte(s) at offset {offset}")]
    Malformed { offset: usize, len: usize },
    #[error("incomplete UTF-8 sequence of {len} byte(s) at offset {offset}")]
    Truncated { offset: usize, len: usize },
}

impl Utf8Error {
    /// Index up to which the input was valid, same as
    /// [`core::str::Utf8Error::valid_up_to`].
    pub const fn valid_up_to(&self) -> usize {
        match *self {
            Utf8Error::Malformed { offset, .. } | Utf8Error::Truncated { offset, .. } => offset,
        }
    }

    /// Length of the invalid sequence, or `None` when the input simply ended
    /// too early. Same meaning as [`core::str::Utf8Error::error_len`].
    pub const fn error_len(&self) -> Option<usize> {
        match *self {
            Utf8Error::Malformed { len, .. } => Some(len),
            Utf8Error::Truncated { .. } => None,
        }
    }

    pub const fn is_truncated(&self) -> bool {
        matches!(self, Utf8Error::Truncated { .. })
    }
}
