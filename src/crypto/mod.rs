//! Cryptographic primitives of the legacy signing scheme.
//!
//! Provides the keyed hash and the byte/word reversals the legacy client
//! applies around its big-integer arithmetic.

pub mod hash;
pub mod reverse;

pub use hash::keyed_hash;
pub use reverse::{reverse_bytes, reverse_bytes_as_words, reverse_words};

/// Length of a keyed-hash digest (16 bytes).
pub const DIGEST_LEN: usize = 16;
/// Random bytes appended to the message digest before signing.
pub const RANDOM_LEN: usize = 40;
/// Leading bytes of the container buffer that are stored in the clear.
pub const MASK_OFFSET: usize = 6;
