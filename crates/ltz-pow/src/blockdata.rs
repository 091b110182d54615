//! Block data structures read by proof-of-work validation.

mod header;

pub use header::{BlockHeader, EQUIHASH_INPUT_SIZE};
