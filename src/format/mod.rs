//! Packed binary records.
//!
//! A record is read and written field by field in declaration order, each
//! field with its exact width and an explicit byte order. Nothing is aligned
//! or padded, so the encoded size of a record is the sum of its field widths.

use crate::error::FormatError;

pub mod kvm;

/// Byte order of multi-byte integer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

/// Field widths of a record, in on-disk order.
pub type Layout = &'static [usize];

/// Total packed width of a layout.
pub const fn layout_len(layout: Layout) -> usize {
    let mut len = 0;
    let mut i = 0;
    while i < layout.len() {
        len += layout[i];
        i += 1;
    }
    len
}

/// A fixed-layout record that can be packed to and from bytes.
pub trait Packed {
    /// Record name used in error messages.
    fn record(&self) -> &'static str;

    /// Exact number of bytes the record occupies.
    fn packed_len(&self) -> usize;

    fn read_fields(&mut self, reader: &mut Reader<'_>) -> Result<(), FormatError>;

    fn write_fields(&self, writer: &mut Writer);
}

/// Cursor over the bytes of a single record.
pub struct Reader<'a> {
    record: &'static str,
    data: &'a [u8],
    offset: usize,
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    pub fn new(record: &'static str, data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            record,
            data,
            offset: 0,
            order,
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if self.remaining() < n {
            return Err(FormatError::Truncated {
                record: self.record,
                needed: n,
                remaining: self.remaining(),
            });
        }

        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u16(&mut self) -> Result<u16, FormatError> {
        let bytes = self.read_array::<2>()?;
        Ok(match self.order {
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
            ByteOrder::BigEndian => u16::from_be_bytes(bytes),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32, FormatError> {
        let bytes = self.read_array::<4>()?;
        Ok(match self.order {
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
        })
    }
}

/// Growable output of a record encoding.
pub struct Writer {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl Writer {
    pub fn with_capacity(order: ByteOrder, capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            order,
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u16(&mut self, value: u16) {
        match self.order {
            ByteOrder::LittleEndian => self.write_bytes(&value.to_le_bytes()),
            ByteOrder::BigEndian => self.write_bytes(&value.to_be_bytes()),
        }
    }

    pub fn write_u32(&mut self, value: u32) {
        match self.order {
            ByteOrder::LittleEndian => self.write_bytes(&value.to_le_bytes()),
            ByteOrder::BigEndian => self.write_bytes(&value.to_be_bytes()),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Fills `into` from the head of `data`.
///
/// Consumes exactly `into.packed_len()` bytes; trailing bytes are left
/// untouched. `into` is not modified when `data` is too short.
///
/// # Errors
///
/// Returns [`FormatError::Truncated`] if fewer bytes than the record needs
/// are available.
pub fn decode(data: &[u8], order: ByteOrder, into: &mut dyn Packed) -> Result<(), FormatError> {
    let needed = into.packed_len();
    if data.len() < needed {
        return Err(FormatError::Truncated {
            record: into.record(),
            needed,
            remaining: data.len(),
        });
    }

    let mut reader = Reader::new(into.record(), &data[..needed], order);
    into.read_fields(&mut reader)?;

    if reader.remaining() != 0 {
        return Err(FormatError::Length {
            record: into.record(),
            expected: needed,
            actual: needed - reader.remaining(),
        });
    }

    Ok(())
}

/// Packs `from` into exactly `from.packed_len()` bytes.
pub fn encode(from: &dyn Packed, order: ByteOrder) -> Result<Vec<u8>, FormatError> {
    let expected = from.packed_len();
    let mut writer = Writer::with_capacity(order, expected);
    from.write_fields(&mut writer);

    let bytes = writer.into_bytes();
    if bytes.len() != expected {
        return Err(FormatError::Length {
            record: from.record(),
            expected,
            actual: bytes.len(),
        });
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        a: u16,
        b: u32,
    }

    const PAIR_LAYOUT: Layout = &[2, 4];

    impl Packed for Pair {
        fn record(&self) -> &'static str {
            "pair"
        }

        fn packed_len(&self) -> usize {
            layout_len(PAIR_LAYOUT)
        }

        fn read_fields(&mut self, reader: &mut Reader<'_>) -> Result<(), FormatError> {
            self.a = reader.read_u16()?;
            self.b = reader.read_u32()?;
            Ok(())
        }

        fn write_fields(&self, writer: &mut Writer) {
            writer.write_u16(self.a);
            writer.write_u32(self.b);
        }
    }

    #[test]
    fn fields_are_packed_without_padding() {
        let pair = Pair {
            a: 0x0102,
            b: 0x03040506,
        };

        let le = encode(&pair, ByteOrder::LittleEndian).unwrap();
        assert_eq!(le, [0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);

        let be = encode(&pair, ByteOrder::BigEndian).unwrap();
        assert_eq!(be, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    }

    #[test]
    fn decode_reads_in_declaration_order() {
        let mut pair = Pair::default();
        decode(&[0x02, 0x01, 0x06, 0x05, 0x04, 0x03], ByteOrder::LittleEndian, &mut pair).unwrap();
        assert_eq!(
            pair,
            Pair {
                a: 0x0102,
                b: 0x03040506
            }
        );
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let mut pair = Pair::default();
        decode(&[1, 0, 2, 0, 0, 0, 0xff, 0xff], ByteOrder::LittleEndian, &mut pair).unwrap();
        assert_eq!(pair, Pair { a: 1, b: 2 });
    }

    #[test]
    fn decode_too_short_fails_without_touching_target() {
        let mut pair = Pair { a: 7, b: 9 };
        let err = decode(&[1, 0, 2], ByteOrder::LittleEndian, &mut pair).unwrap_err();

        match err {
            FormatError::Truncated {
                record,
                needed,
                remaining,
            } => {
                assert_eq!(record, "pair");
                assert_eq!(needed, 6);
                assert_eq!(remaining, 3);
            }
            other => panic!("expected Truncated, got: {other:?}"),
        }
        assert_eq!(pair, Pair { a: 7, b: 9 });
    }

    #[test]
    fn layout_len_sums_widths() {
        assert_eq!(layout_len(PAIR_LAYOUT), 6);
        assert_eq!(layout_len(&[]), 0);
    }
}
