// Copyright 2025 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Byte-aligned field reading in either byte order
//!
//! Nearly every metadata field is a whole number of bytes wide,
//! but not every field uses the same byte order.
//! VORBIS_COMMENT's length fields are little-endian
//! while the rest of the file is big-endian.

use bitstream_io::BitRead;

/// Field byte order
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ByteOrder {
    /// Most significant byte first
    BigEndian,
    /// Least significant byte first
    LittleEndian,
}

impl ByteOrder {
    /// Combines bytes into an unsigned value in this byte order
    ///
    /// # Panics
    ///
    /// Panics if more than 8 bytes are given.
    pub fn to_u64(self, bytes: &[u8]) -> u64 {
        assert!(bytes.len() <= 8, "at most 8 bytes fit in a u64");

        let push = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);

        match self {
            Self::BigEndian => bytes.iter().fold(0, push),
            Self::LittleEndian => bytes.iter().rev().fold(0, push),
        }
    }
}

/// Reads unsigned, byte-aligned fields of a fixed width
///
/// This is implemented for every [`BitRead`] and may
/// be used regardless of the reader's own endianness.
///
/// # Example
/// ```
/// use bitstream_io::{BitReader, BigEndian};
/// use flac_dump::bits::{ByteOrder, FieldRead};
///
/// let data: &[u8] = &[0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x04];
/// let mut r = BitReader::endian(data, BigEndian);
/// assert_eq!(r.read_field::<24>(ByteOrder::BigEndian).unwrap(), 0x01_02_03);
/// assert_eq!(r.read_field::<32>(ByteOrder::LittleEndian).unwrap(), 0x04_03_02_01);
/// assert!(r.read_field::<8>(ByteOrder::BigEndian).is_err());
/// ```
pub trait FieldRead: BitRead {
    /// Reads a `BITS`-wide field in the given byte order
    ///
    /// `BITS` must be a multiple of 8 from 8 to 64,
    /// which is checked at compile-time.
    ///
    /// # Errors
    ///
    /// Returns an `UnexpectedEof` error if fewer than
    /// `BITS / 8` bytes remain in the stream.
    fn read_field<const BITS: u32>(&mut self, order: ByteOrder) -> std::io::Result<u64> {
        const {
            assert!(
                BITS >= 8 && BITS <= 64 && BITS % 8 == 0,
                "field width must be a whole number of bytes from 8 to 64 bits"
            )
        };

        let mut buf = [0; 8];
        let bytes = &mut buf[0..(BITS / 8) as usize];
        self.read_bytes(bytes)?;
        Ok(order.to_u64(bytes))
    }
}

impl<R: BitRead + ?Sized> FieldRead for R {}

#[test]
fn test_byte_orders() {
    assert_eq!(ByteOrder::BigEndian.to_u64(&[]), 0);
    assert_eq!(ByteOrder::BigEndian.to_u64(&[0xAB]), 0xAB);
    assert_eq!(ByteOrder::LittleEndian.to_u64(&[0xAB]), 0xAB);
    assert_eq!(ByteOrder::BigEndian.to_u64(&[0x12, 0x34]), 0x1234);
    assert_eq!(ByteOrder::LittleEndian.to_u64(&[0x12, 0x34]), 0x3412);
    assert_eq!(
        ByteOrder::BigEndian.to_u64(&[0xFF; 8]),
        u64::MAX,
        "no sign extension or overflow at full width"
    );
}

#[test]
fn test_field_widths() {
    use bitstream_io::{BigEndian, BitReader, LittleEndian};

    let data: &[u8] = &[0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];

    // the reader's own endianness has no bearing on field order
    let mut r = BitReader::endian(data, LittleEndian);
    assert_eq!(
        r.read_field::<64>(ByteOrder::BigEndian).unwrap(),
        0x80_00_00_00_00_00_00_01
    );

    let mut r = BitReader::endian(data, BigEndian);
    assert_eq!(
        r.read_field::<64>(ByteOrder::LittleEndian).unwrap(),
        0x01_00_00_00_00_00_00_80
    );

    let mut r = BitReader::endian(data, BigEndian);
    assert_eq!(r.read_field::<8>(ByteOrder::BigEndian).unwrap(), 0x80);
    assert_eq!(r.read_field::<16>(ByteOrder::BigEndian).unwrap(), 0);
    assert_eq!(r.read_field::<32>(ByteOrder::LittleEndian).unwrap(), 0);
    assert_eq!(r.read_field::<8>(ByteOrder::LittleEndian).unwrap(), 0x01);
    assert_eq!(
        r.read_field::<8>(ByteOrder::BigEndian).unwrap_err().kind(),
        std::io::ErrorKind::UnexpectedEof
    );
}
