//! Table-driven UTF-8 decoding automaton.
//!
//! Bytes are first mapped to one of twelve classes, then the pair
//! `(state, class)` is looked up in a flat transition table. States are
//! stored pre-multiplied by the number of classes so that a transition is a
//! single add and load. Leading bytes whose second byte has a narrower legal
//! range (`E0`, `ED`, `F0`, `F4`) get their own class and their own
//! successor state, which is how overlong forms, surrogates and values past
//! U+10FFFF are rejected without a range check after decoding.
//!
//! The automaton is the one described by Bjoern Hoehrmann at
//! <https://bjoern.hoehrmann.de/utf-8/decoder/dfa/>.

/// Raw value of [`State::ACCEPT`].
pub const UTF8_ACCEPT: u32 = 0;
/// Raw value of [`State::REJECT`].
pub const UTF8_REJECT: u32 = 12;

// 0: 00..7F   1: 80..8F   2: C2..DF   3: E1..EC, EE..EF   4: ED
// 5: F4       6: F1..F3   7: A0..BF   8: C0..C1, F5..FF   9: 90..9F
// 10: E0      11: F0
#[rustfmt::skip]
const CLASSES: [u8; 256] = [
     0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
     0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
     0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
     0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
     1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,  9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,
     7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,  7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,
     8,8,2,2,2,2,2,2,2,2,2,2,2,2,2,2,  2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,
    10,3,3,3,3,3,3,3,3,3,3,3,3,4,3,3, 11,6,6,6,5,8,8,8,8,8,8,8,8,8,8,8,
];

#[rustfmt::skip]
const TRANSITIONS: [u8; 108] = [
    // class: 0  1  2  3  4  5  6  7  8  9 10 11
     0,12,24,36,60,96,84,12,12,12,48,72, //  0 accept
    12,12,12,12,12,12,12,12,12,12,12,12, // 12 reject
    12, 0,12,12,12,12,12, 0,12, 0,12,12, // 24 one byte left
    12,24,12,12,12,12,12,24,12,24,12,12, // 36 two bytes left
    12,12,12,12,12,12,12,24,12,12,12,12, // 48 two bytes left, after E0: A0..BF
    12,24,12,12,12,12,12,12,12,24,12,12, // 60 two bytes left, after ED: 80..9F
    12,12,12,12,12,12,12,36,12,36,12,12, // 72 three bytes left, after F0: 90..BF
    12,36,12,12,12,12,12,36,12,36,12,12, // 84 three bytes left
    12,36,12,12,12,12,12,12,12,12,12,12, // 96 three bytes left, after F4: 80..8F
];

/// Position of the decoder within a multi-byte sequence.
///
/// The default value is [`State::ACCEPT`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct State(u8);

impl State {
    /// No sequence in flight; the last byte, if any, completed a scalar value.
    pub const ACCEPT: State = State(UTF8_ACCEPT as u8);
    /// The bytes seen so far cannot begin a well-formed sequence.
    pub const REJECT: State = State(UTF8_REJECT as u8);

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_accept(self) -> bool {
        self.0 == Self::ACCEPT.0
    }

    #[inline]
    pub const fn is_reject(self) -> bool {
        self.0 == Self::REJECT.0
    }

    /// True while continuation bytes are still expected.
    #[inline]
    pub const fn is_pending(self) -> bool {
        !self.is_accept() && !self.is_reject()
    }

    /// Number of continuation bytes still expected, `0` outside a sequence.
    pub const fn remaining(self) -> usize {
        match self.0 {
            24 => 1,
            36 | 48 | 60 => 2,
            72 | 84 | 96 => 3,
            _ => 0,
        }
    }

    #[inline]
    pub const fn outcome(self) -> Outcome {
        if self.is_accept() {
            Outcome::Accept
        } else if self.is_reject() {
            Outcome::Reject
        } else {
            Outcome::More
        }
    }
}

impl From<State> for u32 {
    fn from(state: State) -> Self {
        state.0 as u32
    }
}

/// What a single step produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Outcome {
    /// A scalar value is ready in the accumulated code point.
    Accept = 0,
    /// The sequence is incomplete.
    More,
    /// The sequence is ill-formed at this byte.
    Reject,
}

/// Advances the automaton by one byte, returning the next state and the
/// updated code point.
///
/// When the returned state is [`State::ACCEPT`] the code point is a Unicode
/// scalar value. In any other state it is a partial prefix and must not be
/// used. [`State::REJECT`] only leads back to itself; the caller decides
/// when to start over from [`State::ACCEPT`].
#[inline]
pub const fn step(state: State, codepoint: u32, byte: u8) -> (State, u32) {
    let class = CLASSES[byte as usize];
    let codepoint = if state.is_accept() {
        (0xFF >> class) & byte as u32
    } else {
        (codepoint << 6) | (byte & 0x3F) as u32
    };
    let next = TRANSITIONS[state.0 as usize + class as usize];
    (State(next), codepoint)
}

/// In-place form of [`step`]. The returned state is also the outcome code:
/// it compares equal to [`State::ACCEPT`] exactly when `codepoint` holds a
/// complete scalar value.
#[inline]
pub fn decode_utf8(state: &mut State, codepoint: &mut u32, byte: u8) -> State {
    (*state, *codepoint) = step(*state, *codepoint, byte);
    *state
}
