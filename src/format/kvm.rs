//! Records of the `.kvm` key container.
//!
//! ```text
//! KeyContainerHeader:
//! RESERVED (2) | SIGN_FLAG (2) | CHECKSUM (16) | LENGTH (4) | BUFFER (140)
//!
//! KeyData (decrypted BUFFER):
//! RESERVED (4) | POWER_BASE (2) | POWER (66) | MODULUS_BASE (2) | MODULUS (66)
//! ```
//!
//! All integers are little-endian. `POWER` and `MODULUS` hold big integers
//! with their bytes in reverse order.

use super::{Layout, Packed, Reader, Writer, layout_len};
use crate::error::FormatError;

pub const CHECKSUM_LEN: usize = 16;
pub const BUFFER_LEN: usize = 140;
pub const KEY_FIELD_LEN: usize = 66;

pub const HEADER_LAYOUT: Layout = &[
    2, // reserved
    2, // sign_flag
    CHECKSUM_LEN, // checksum
    4, // length
    BUFFER_LEN, // buffer
];

pub const KEY_DATA_LAYOUT: Layout = &[
    4, // reserved
    2, // power_base
    KEY_FIELD_LEN, // power
    2, // modulus_base
    KEY_FIELD_LEN, // modulus
];

/// Size of an encoded key container (164 bytes).
pub const HEADER_LEN: usize = layout_len(HEADER_LAYOUT);
/// Size of the decrypted key data, equal to [`BUFFER_LEN`].
pub const KEY_DATA_LEN: usize = layout_len(KEY_DATA_LAYOUT);

pub type Checksum = [u8; CHECKSUM_LEN];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyContainerHeader {
    pub reserved: u16,
    pub sign_flag: u16,
    pub checksum: Checksum,
    pub length: u32,
    pub buffer: [u8; BUFFER_LEN],
}

impl Default for KeyContainerHeader {
    fn default() -> Self {
        Self {
            reserved: 0,
            sign_flag: 0,
            checksum: [0u8; CHECKSUM_LEN],
            length: 0,
            buffer: [0u8; BUFFER_LEN],
        }
    }
}

impl Packed for KeyContainerHeader {
    fn record(&self) -> &'static str {
        "key container header"
    }

    fn packed_len(&self) -> usize {
        HEADER_LEN
    }

    fn read_fields(&mut self, reader: &mut Reader<'_>) -> Result<(), FormatError> {
        self.reserved = reader.read_u16()?;
        self.sign_flag = reader.read_u16()?;
        self.checksum = reader.read_array()?;
        self.length = reader.read_u32()?;
        self.buffer = reader.read_array()?;
        Ok(())
    }

    fn write_fields(&self, writer: &mut Writer) {
        writer.write_u16(self.reserved);
        writer.write_u16(self.sign_flag);
        writer.write_bytes(&self.checksum);
        writer.write_u32(self.length);
        writer.write_bytes(&self.buffer);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyData {
    pub reserved: u32,
    pub power_base: u16,
    pub power: [u8; KEY_FIELD_LEN],
    pub modulus_base: u16,
    pub modulus: [u8; KEY_FIELD_LEN],
}

impl Default for KeyData {
    fn default() -> Self {
        Self {
            reserved: 0,
            power_base: 0,
            power: [0u8; KEY_FIELD_LEN],
            modulus_base: 0,
            modulus: [0u8; KEY_FIELD_LEN],
        }
    }
}

impl Packed for KeyData {
    fn record(&self) -> &'static str {
        "key data"
    }

    fn packed_len(&self) -> usize {
        KEY_DATA_LEN
    }

    fn read_fields(&mut self, reader: &mut Reader<'_>) -> Result<(), FormatError> {
        self.reserved = reader.read_u32()?;
        self.power_base = reader.read_u16()?;
        self.power = reader.read_array()?;
        self.modulus_base = reader.read_u16()?;
        self.modulus = reader.read_array()?;
        Ok(())
    }

    fn write_fields(&self, writer: &mut Writer) {
        writer.write_u32(self.reserved);
        writer.write_u16(self.power_base);
        writer.write_bytes(&self.power);
        writer.write_u16(self.modulus_base);
        writer.write_bytes(&self.modulus);
    }
}

/// Two-byte unit of the word-order reversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Word(pub [u8; 2]);

/// A run of words; decoding fills the words already present.
impl Packed for Vec<Word> {
    fn record(&self) -> &'static str {
        "word sequence"
    }

    fn packed_len(&self) -> usize {
        self.len() * 2
    }

    fn read_fields(&mut self, reader: &mut Reader<'_>) -> Result<(), FormatError> {
        for word in self.iter_mut() {
            *word = Word(reader.read_array()?);
        }
        Ok(())
    }

    fn write_fields(&self, writer: &mut Writer) {
        for word in self {
            writer.write_bytes(&word.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ByteOrder, decode, encode};

    #[test]
    fn layouts_match_container_sizes() {
        assert_eq!(HEADER_LEN, 164);
        assert_eq!(KEY_DATA_LEN, BUFFER_LEN);
    }

    #[test]
    fn layout_widths_give_field_offsets() {
        let offsets: Vec<usize> = HEADER_LAYOUT
            .iter()
            .scan(0, |at, width| {
                let start = *at;
                *at += width;
                Some(start)
            })
            .collect();
        assert_eq!(offsets, [0, 2, 4, 20, 24]);

        assert_eq!(KEY_DATA_LAYOUT[..2].iter().sum::<usize>(), 6);
        assert_eq!(
            KEY_DATA_LAYOUT[..4].iter().sum::<usize>(),
            6 + KEY_FIELD_LEN + 2
        );
    }

    #[test]
    fn header_fields_land_at_their_offsets() {
        let mut raw = vec![0u8; HEADER_LEN];
        raw[0..2].copy_from_slice(&[0x81, 0x00]);
        raw[2..4].copy_from_slice(&[0x01, 0x00]);
        raw[4..20].copy_from_slice(&[0xaa; 16]);
        raw[20..24].copy_from_slice(&140u32.to_le_bytes());
        raw[24] = 0x55;
        raw[163] = 0x66;

        let mut header = KeyContainerHeader::default();
        decode(&raw, ByteOrder::LittleEndian, &mut header).unwrap();

        assert_eq!(header.reserved, 0x81);
        assert_eq!(header.sign_flag, 1);
        assert_eq!(header.checksum, [0xaa; 16]);
        assert_eq!(header.length, 140);
        assert_eq!(header.buffer[0], 0x55);
        assert_eq!(header.buffer[BUFFER_LEN - 1], 0x66);

        assert_eq!(encode(&header, ByteOrder::LittleEndian).unwrap(), raw);
    }

    #[test]
    fn key_data_fields_land_at_their_offsets() {
        let mut raw = vec![0u8; KEY_DATA_LEN];
        raw[4..6].copy_from_slice(&66u16.to_le_bytes());
        raw[6] = 0x11;
        raw[71] = 0x22;
        raw[72..74].copy_from_slice(&66u16.to_le_bytes());
        raw[74] = 0x33;
        raw[139] = 0x44;

        let mut data = KeyData::default();
        decode(&raw, ByteOrder::LittleEndian, &mut data).unwrap();

        assert_eq!(data.power_base, 66);
        assert_eq!(data.power[0], 0x11);
        assert_eq!(data.power[KEY_FIELD_LEN - 1], 0x22);
        assert_eq!(data.modulus_base, 66);
        assert_eq!(data.modulus[0], 0x33);
        assert_eq!(data.modulus[KEY_FIELD_LEN - 1], 0x44);
    }

    #[test]
    fn short_container_is_rejected() {
        let mut header = KeyContainerHeader::default();
        assert!(decode(b"1234567890", ByteOrder::LittleEndian, &mut header).is_err());
    }

    #[test]
    fn words_keep_byte_pairs() {
        let mut words = vec![Word::default(); 2];
        decode(&[1, 2, 3, 4], ByteOrder::LittleEndian, &mut words).unwrap();
        assert_eq!(words, vec![Word([1, 2]), Word([3, 4])]);
    }
}
