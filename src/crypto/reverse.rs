//! Byte and word order reversals.
//!
//! The legacy format keeps big integers least significant byte first, and
//! emits signatures as two-byte words in reverse order.

use crate::error::FormatError;
use crate::external::External;
use crate::format::ByteOrder;
use crate::format::kvm::Word;

pub fn reverse_bytes(data: &[u8]) -> Vec<u8> {
    data.iter().rev().copied().collect()
}

pub fn reverse_words(words: &[Word]) -> Vec<Word> {
    words.iter().rev().copied().collect()
}

/// Reverses the order of the two-byte words of `data`, keeping each word
/// intact.
///
/// Odd-length input is left-padded with one zero byte first.
pub fn reverse_bytes_as_words(external: &dyn External, data: &[u8]) -> Result<Vec<u8>, FormatError> {
    let mut padded = Vec::with_capacity(data.len() + 1);
    if data.len() % 2 != 0 {
        padded.push(0);
    }
    padded.extend_from_slice(data);

    let mut words = vec![Word::default(); padded.len() / 2];
    external.binary_read(&padded, ByteOrder::LittleEndian, &mut words)?;

    Ok(reverse_words(&words)
        .iter()
        .flat_map(|word| word.0)
        .collect())
}
