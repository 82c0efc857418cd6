pub mod decoder;
pub mod dfa;
pub mod error;

pub use decoder::{decode, decode_lossy, validate, Decode, Decoded, Utf8Decoder};
pub use dfa::{decode_utf8, step, Outcome, State, UTF8_ACCEPT, UTF8_REJECT};
pub use error::Utf8Error;
