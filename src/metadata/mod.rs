// Copyright 2025 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! For decoding a FLAC file's metadata blocks
//!
//! Many items are capitalized simply because they were capitalized
//! in the original FLAC format documentation.
//!
//! # Metadata Blocks
//!
//! | Block Type | Code | Decoded |
//! |-----------:|-----:|---------|
//! | [STREAMINFO](`Streaminfo`) | 0 | yes |
//! | [PADDING](`Padding`) | 1 | yes |
//! | APPLICATION | 2 | no |
//! | [SEEKTABLE](`SeekTable`) | 3 | yes |
//! | [VORBIS_COMMENT](`VorbisComment`) | 4 | yes |
//! | CUESHEET | 5 | no |
//! | [PICTURE](`Picture`) | 6 | yes |
//! | reserved | 7-126 | no |
//! | invalid | 127 | no |
//!
//! Blocks which are not decoded are a hard error
//! rather than being skipped.

use crate::Error;
use crate::bits::{ByteOrder, FieldRead};
use bitstream_io::{
    BigEndian, BitRead, BitReader, BitWrite, BitWriter, FromBitStream, FromBitStreamUsing,
    FromBitStreamWith, LittleEndian, ToBitStream, ToBitStreamUsing,
};
use log::{debug, trace, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

mod picture;

pub use picture::{Picture, PictureType};

const FLAC_TAG: &[u8; 4] = b"fLaC";

/// A FLAC metadata block header
///
/// | Bits | Field | Meaning |
/// |-----:|------:|---------|
/// | 1    | `last` | final metadata block in file |
/// | 7    | `block_type` | type of block |
/// | 24   | `size` | block size, in bytes |
///
/// # Example
/// ```
/// use bitstream_io::{BitReader, BitRead, BigEndian};
/// use flac_dump::metadata::{BlockHeader, BlockType};
///
/// let data: &[u8] = &[0b1_0000000, 0x00, 0x00, 0x22];
/// let mut r = BitReader::endian(data, BigEndian);
/// assert_eq!(
///     r.parse::<BlockHeader>().unwrap(),
///     BlockHeader {
///         last: true,
///         block_type: BlockType::Streaminfo,
///         size: 0x00_00_22u16.into(),
///     },
/// );
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BlockHeader {
    /// Whether we are the final block
    pub last: bool,
    /// Our block type
    pub block_type: BlockType,
    /// Our block size, in bytes
    pub size: BlockSize,
}

impl FromBitStream for BlockHeader {
    type Error = std::io::Error;

    fn from_reader<R: BitRead + ?Sized>(r: &mut R) -> Result<Self, Self::Error> {
        Ok(Self {
            last: r.read::<1, _>()?,
            block_type: r.parse()?,
            size: r.parse()?,
        })
    }
}

impl ToBitStream for BlockHeader {
    type Error = std::io::Error;

    fn to_writer<W: BitWrite + ?Sized>(&self, w: &mut W) -> Result<(), Self::Error> {
        w.write::<1, _>(self.last)?;
        w.build(&self.block_type)?;
        w.build(&self.size)?;
        Ok(())
    }
}

/// A FLAC metadata block type
///
/// Every possible 7-bit code corresponds to exactly one variant,
/// though not every variant can be decoded.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BlockType {
    /// The STREAMINFO block
    Streaminfo,
    /// The PADDING block
    Padding,
    /// The APPLICATION block
    Application,
    /// The SEEKTABLE block
    SeekTable,
    /// The VORBIS_COMMENT block
    VorbisComment,
    /// The CUESHEET block
    Cuesheet,
    /// The PICTURE block
    Picture,
    /// A reserved block type, from 7 to 126
    Reserved(u8),
    /// The forbidden block type 127
    Invalid,
}

impl BlockType {
    /// Our 7-bit type code
    pub fn code(&self) -> u8 {
        match self {
            Self::Streaminfo => 0,
            Self::Padding => 1,
            Self::Application => 2,
            Self::SeekTable => 3,
            Self::VorbisComment => 4,
            Self::Cuesheet => 5,
            Self::Picture => 6,
            Self::Reserved(code) => *code,
            Self::Invalid => 127,
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Streaminfo => "STREAMINFO".fmt(f),
            Self::Padding => "PADDING".fmt(f),
            Self::Application => "APPLICATION".fmt(f),
            Self::SeekTable => "SEEKTABLE".fmt(f),
            Self::VorbisComment => "VORBIS_COMMENT".fmt(f),
            Self::Cuesheet => "CUESHEET".fmt(f),
            Self::Picture => "PICTURE".fmt(f),
            Self::Reserved(_) => "RESERVED".fmt(f),
            Self::Invalid => "INVALID".fmt(f),
        }
    }
}

impl FromBitStream for BlockType {
    type Error = std::io::Error;

    fn from_reader<R: BitRead + ?Sized>(r: &mut R) -> Result<Self, Self::Error> {
        Ok(match r.read::<7, u8>()? {
            0 => Self::Streaminfo,
            1 => Self::Padding,
            2 => Self::Application,
            3 => Self::SeekTable,
            4 => Self::VorbisComment,
            5 => Self::Cuesheet,
            6 => Self::Picture,
            code @ 7..=126 => Self::Reserved(code),
            _ => Self::Invalid,
        })
    }
}

impl ToBitStream for BlockType {
    type Error = std::io::Error;

    fn to_writer<W: BitWrite + ?Sized>(&self, w: &mut W) -> Result<(), Self::Error> {
        w.write::<7, u8>(self.code())
    }
}

/// A 24-bit block size value, with safeguards against overflow
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct BlockSize(u32);

impl BlockSize {
    /// A value of 0
    pub const ZERO: BlockSize = BlockSize(0);

    const MAX: u32 = (1 << 24) - 1;

    /// Our current value as a u32
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for BlockSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromBitStream for BlockSize {
    type Error = std::io::Error;

    fn from_reader<R: BitRead + ?Sized>(r: &mut R) -> Result<Self, Self::Error> {
        r.read::<24, _>().map(Self)
    }
}

impl ToBitStream for BlockSize {
    type Error = std::io::Error;

    fn to_writer<W: BitWrite + ?Sized>(&self, w: &mut W) -> Result<(), Self::Error> {
        w.write::<24, _>(self.0)
    }
}

impl From<u8> for BlockSize {
    fn from(u: u8) -> Self {
        Self(u.into())
    }
}

impl From<u16> for BlockSize {
    fn from(u: u16) -> Self {
        Self(u.into())
    }
}

impl TryFrom<usize> for BlockSize {
    type Error = BlockSizeOverflow;

    fn try_from(u: usize) -> Result<Self, Self::Error> {
        u32::try_from(u)
            .map_err(|_| BlockSizeOverflow)
            .and_then(<Self as TryFrom<u32>>::try_from)
    }
}

impl TryFrom<u32> for BlockSize {
    type Error = BlockSizeOverflow;

    fn try_from(u: u32) -> Result<Self, Self::Error> {
        (u <= Self::MAX).then_some(Self(u)).ok_or(BlockSizeOverflow)
    }
}

/// An error that occurs when trying to build an overly large `BlockSize`
#[derive(Copy, Clone, Debug)]
pub struct BlockSizeOverflow;

impl std::error::Error for BlockSizeOverflow {}

impl std::fmt::Display for BlockSizeOverflow {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        "value too large for BlockSize".fmt(f)
    }
}

// like a slightly easier variant of "Take"
// which also remembers whether the inner reader ran dry
struct LimitedReader<R> {
    reader: R,
    size: usize,
    exhausted: bool,
}

impl<R: std::io::Read> std::io::Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let size = self.size.min(buf.len());
        if size == 0 {
            return Ok(0);
        }
        self.reader.read(&mut buf[0..size]).inspect(|amt_read| {
            self.size -= amt_read;
            self.exhausted |= *amt_read == 0;
        })
    }
}

/// An iterator over FLAC metadata blocks
///
/// Yields each block along with its header,
/// stopping after the block marked as last
/// or after the first error.
/// No bytes past the final metadata block are read.
pub struct BlockReader<R: std::io::Read> {
    reader: R,
    tag_read: bool,
    failed: bool,
    finished: bool,
}

impl<R: std::io::Read> BlockReader<R> {
    /// Creates an iterator over something that implements `Read`.
    /// Because this may perform many small reads,
    /// performance is greatly improved by buffering reads
    /// when reading from a raw `File`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            tag_read: false,
            failed: false,
            finished: false,
        }
    }

    /// Ensures the stream starts with the `fLaC` tag
    ///
    /// The tag is only read once, so calling this
    /// again after success does nothing.
    /// This is done automatically before the first block is read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFlacTag`] if the stream
    /// starts with anything else, or [`Error::Truncated`]
    /// if the stream is shorter than the tag.
    pub fn read_tag(&mut self) -> Result<(), Error> {
        if self.tag_read {
            return Ok(());
        }

        let mut tag = [0; 4];
        let result = self
            .reader
            .read_exact(&mut tag)
            .map_err(Error::from)
            .and_then(|()| match &tag {
                FLAC_TAG => Ok(()),
                _ => Err(Error::MissingFlacTag),
            });

        match result {
            Ok(()) => {
                self.tag_read = true;
                Ok(())
            }
            Err(err) => {
                self.failed = true;
                Err(err)
            }
        }
    }

    /// Whether the final metadata block has been read
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Returns our inner reader
    ///
    /// Once [`BlockReader::finished`] is true, the reader
    /// is positioned at the start of the first audio frame.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_block(&mut self) -> Result<(BlockHeader, Block), Error> {
        let header: BlockHeader = BitReader::endian(self.reader.by_ref(), BigEndian).parse()?;

        debug!(
            "{} block (type {}), {} bytes{}",
            header.block_type,
            header.block_type.code(),
            header.size,
            if header.last { ", last" } else { "" }
        );

        let mut limited = LimitedReader {
            reader: self.reader.by_ref(),
            size: header.size.get() as usize,
            exhausted: false,
        };

        let result = BitReader::endian(&mut limited, BigEndian).parse_with::<Block>(&header);

        let block = result.map_err(|err| match err {
            // the block ran out of room before the stream did
            Error::Truncated if !limited.exhausted => Error::MetadataBlockOverrun,
            err => err,
        })?;

        match limited.size {
            0 => {
                trace!("{} block consumed {} bytes", header.block_type, header.size);
                self.finished = header.last;
                Ok((header, block))
            }
            _ => {
                // a short body is only a framing error
                // if the stream actually holds the rest of the block
                std::io::copy(&mut limited, &mut std::io::sink())?;
                if limited.exhausted {
                    Err(Error::Truncated)
                } else {
                    Err(Error::InvalidMetadataBlockSize)
                }
            }
        }
    }
}

impl<R: std::io::Read> Iterator for BlockReader<R> {
    type Item = Result<(BlockHeader, Block), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.finished {
            // once we hit an error or the final block, stop any further reads
            return None;
        }

        match self.read_tag().and_then(|()| self.read_block()) {
            Ok(block) => Some(Ok(block)),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Returns iterator of blocks from the given reader
///
/// Because this may perform many small reads,
/// using a buffered reader may greatly improve performance
/// when reading from a raw `File`.
///
/// # Example
///
/// ```
/// use flac_dump::metadata::{read_blocks, write_blocks, Block, Padding, VorbisComment};
///
/// let comment = VorbisComment {
///     vendor_string: "reference libFLAC 1.4.3 20230623".to_owned(),
///     fields: vec!["TITLE=Testing".to_owned()],
/// };
///
/// let mut flac = vec![];
/// write_blocks(
///     [
///         Block::from(comment.clone()),
///         Block::from(Padding { size: 10u8.into() }),
///     ],
///     &mut flac,
/// )
/// .unwrap();
///
/// let blocks = read_blocks(flac.as_slice())
///     .map(|r| r.map(|(_, block)| block))
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
///
/// assert_eq!(
///     blocks,
///     vec![comment.into(), Padding { size: 10u8.into() }.into()],
/// );
/// ```
pub fn read_blocks<R: std::io::Read>(r: R) -> BlockReader<R> {
    BlockReader::new(r)
}

/// Returns iterator of blocks from the given path
///
/// # Errors
///
/// Returns any I/O error from opening the path.
/// Note that the iterator itself may return any errors
/// from reading individual blocks.
pub fn blocks<P: AsRef<Path>>(p: P) -> Result<BlockReader<BufReader<File>>, Error> {
    File::open(p.as_ref())
        .map(|f| read_blocks(BufReader::new(f)))
        .map_err(Error::Io)
}

/// Writes the `fLaC` tag and iterator of blocks to the given writer.
///
/// The final block written is marked as the last block.
///
/// Because this may perform many small writes,
/// buffering writes may greatly improve performance
/// when writing to a raw `File`.
///
/// # Errors
///
/// Passes along any I/O errors from the underlying stream.
/// May also generate an error if any of the blocks are too large.
pub fn write_blocks<B: std::borrow::Borrow<Block>>(
    blocks: impl IntoIterator<Item = B>,
    mut w: impl std::io::Write,
) -> Result<(), Error> {
    w.write_all(FLAC_TAG).map_err(Error::Io)?;

    let mut w = BitWriter::endian(w, BigEndian);
    let mut blocks = blocks.into_iter().peekable();

    while let Some(block) = blocks.next() {
        w.build_using(block.borrow(), blocks.peek().is_none())?;
    }

    Ok(())
}

/// A decodable FLAC metadata block
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Block {
    /// The STREAMINFO block
    Streaminfo(Streaminfo),
    /// The PADDING block
    Padding(Padding),
    /// The SEEKTABLE block
    SeekTable(SeekTable),
    /// The VORBIS_COMMENT block
    VorbisComment(VorbisComment),
    /// The PICTURE block
    Picture(Picture),
}

impl Block {
    /// Our block type
    pub fn block_type(&self) -> BlockType {
        match self {
            Self::Streaminfo(_) => BlockType::Streaminfo,
            Self::Padding(_) => BlockType::Padding,
            Self::SeekTable(_) => BlockType::SeekTable,
            Self::VorbisComment(_) => BlockType::VorbisComment,
            Self::Picture(_) => BlockType::Picture,
        }
    }
}

macro_rules! block {
    ($t:ty, $v:ident) => {
        impl From<$t> for Block {
            fn from(b: $t) -> Self {
                Self::$v(b)
            }
        }
    };
}

block!(Streaminfo, Streaminfo);
block!(Padding, Padding);
block!(SeekTable, SeekTable);
block!(VorbisComment, VorbisComment);
block!(Picture, Picture);

impl FromBitStreamWith<'_> for Block {
    type Context = BlockHeader;
    type Error = Error;

    // parses from reader without header
    fn from_reader<R: BitRead + ?Sized>(
        r: &mut R,
        header: &BlockHeader,
    ) -> Result<Self, Self::Error> {
        match header.block_type {
            BlockType::Streaminfo => Ok(Block::Streaminfo(r.parse()?)),
            BlockType::Padding => Ok(Block::Padding(r.parse_using(header.size)?)),
            BlockType::SeekTable => Ok(Block::SeekTable(r.parse_using(header.size)?)),
            BlockType::VorbisComment => Ok(Block::VorbisComment(r.parse_using(header.size)?)),
            BlockType::Picture => Ok(Block::Picture(r.parse_using(header.size)?)),
            unsupported @ (BlockType::Application
            | BlockType::Cuesheet
            | BlockType::Reserved(_)
            | BlockType::Invalid) => Err(Error::UnsupportedBlock(unsupported)),
        }
    }
}

impl ToBitStreamUsing for Block {
    type Context = bool;
    type Error = Error;

    // builds to writer with header
    fn to_writer<W: BitWrite + ?Sized>(&self, w: &mut W, last: bool) -> Result<(), Error> {
        let mut body = vec![];
        {
            let mut body = BitWriter::endian(&mut body, BigEndian);
            match self {
                Self::Streaminfo(streaminfo) => body.build(streaminfo)?,
                Self::Padding(padding) => body.build(padding)?,
                Self::SeekTable(seektable) => body.build(seektable)?,
                Self::VorbisComment(vorbis_comment) => body.build(vorbis_comment)?,
                Self::Picture(picture) => body.build(picture)?,
            }
        }

        w.build(&BlockHeader {
            last,
            block_type: self.block_type(),
            size: body
                .len()
                .try_into()
                .map_err(|_| Error::ExcessiveBlockSize)?,
        })?;
        w.write_bytes(&body)?;
        Ok(())
    }
}

/// A STREAMINFO metadata block
///
/// | Bits | Field | Meaning |
/// |-----:|------:|---------|
/// | 16   | `minimum_block_size` | minimum block size (in samples) in the stream
/// | 16   | `maximum_block_size` | maximum block size (in samples) in the stream
/// | 24   | `minimum_frame_size` | minimum frame size (in bytes) in the stream
/// | 24   | `maximum_frame_size` | maximum frame size (in bytes) in the stream
/// | 64   | `packed` | sample rate, channels, bits-per-sample, total samples
/// | 16×8 | `md5` | MD5 hash of the unencoded audio data
///
/// The `packed` field is kept exactly as read.
/// Its sub-fields are available from accessor methods.
///
/// | Bits | Sub-field |
/// |-----:|-----------|
/// | 20   | sample rate, in Hz
/// | 3    | channels - 1
/// | 5    | bits-per-sample - 1
/// | 36   | total samples
///
/// # Example
/// ```
/// use bitstream_io::{BitReader, BitRead, BigEndian};
/// use flac_dump::metadata::{BlockSize, Streaminfo};
///
/// let data: &[u8] = &[
///     0x10, 0x00,
///     0x10, 0x00,
///     0x00, 0x00, 0x0c,
///     0x00, 0x00, 0x0c,
///     0b00001010, 0b11000100, 0b0100_000_0, 0b1111_0000,
///     0b00000000, 0b00000000, 0b00000000, 0b00110010,
///     0xf5, 0x3f, 0x86, 0x87, 0x6d, 0xcd, 0x77, 0x83,
///     0x22, 0x5c, 0x93, 0xba, 0x8a, 0x93, 0x8c, 0x7d,
/// ];
///
/// let mut r = BitReader::endian(data, BigEndian);
/// let streaminfo = r.parse::<Streaminfo>().unwrap();
///
/// assert_eq!(streaminfo.minimum_block_size, 0x10_00);
/// assert_eq!(streaminfo.maximum_block_size, 0x10_00);
/// assert_eq!(streaminfo.minimum_frame_size, 0x0c);
/// assert_eq!(streaminfo.maximum_frame_size, 0x0c);
/// assert_eq!(streaminfo.sample_rate(), 44100);
/// assert_eq!(streaminfo.channels(), 1);
/// assert_eq!(streaminfo.bits_per_sample(), 16);
/// assert_eq!(streaminfo.total_samples(), 50);
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Streaminfo {
    /// The minimum block size (in samples) used in the stream,
    /// excluding the last block.
    pub minimum_block_size: u16,
    /// The maximum block size (in samples) used in the stream,
    /// excluding the last block.
    pub maximum_block_size: u16,
    /// The minimum framesize (in bytes) used in the stream.
    ///
    /// 0 indicates the value is unknown.
    pub minimum_frame_size: u32,
    /// The maximum framesize (in bytes) used in the stream.
    ///
    /// 0 indicates the value is unknown.
    pub maximum_frame_size: u32,
    /// Sample rate, channels, bits-per-sample and total samples
    /// as a single raw field
    pub packed: u64,
    /// MD5 hash of unencoded audio data.
    ///
    /// All zeroes indicates the value is unknown.
    pub md5: [u8; 16],
}

impl Streaminfo {
    /// Sample rate in Hz
    ///
    /// 0 indicates a non-audio stream.
    pub fn sample_rate(&self) -> u32 {
        (self.packed >> 44) as u32
    }

    /// Number of channels, from 1 to 8
    pub fn channels(&self) -> u8 {
        ((self.packed >> 41) & 0b111) as u8 + 1
    }

    /// Number of bits-per-sample, from 1 to 32
    pub fn bits_per_sample(&self) -> u8 {
        ((self.packed >> 36) & 0b11111) as u8 + 1
    }

    /// Total number of interchannel samples in stream.
    ///
    /// 0 indicates the value is unknown.
    pub fn total_samples(&self) -> u64 {
        self.packed & ((1 << 36) - 1)
    }
}

impl FromBitStream for Streaminfo {
    type Error = std::io::Error;

    fn from_reader<R: BitRead + ?Sized>(r: &mut R) -> Result<Self, Self::Error> {
        Ok(Self {
            minimum_block_size: r.read_field::<16>(ByteOrder::BigEndian)? as u16,
            maximum_block_size: r.read_field::<16>(ByteOrder::BigEndian)? as u16,
            minimum_frame_size: r.read_field::<24>(ByteOrder::BigEndian)? as u32,
            maximum_frame_size: r.read_field::<24>(ByteOrder::BigEndian)? as u32,
            packed: r.read_field::<64>(ByteOrder::BigEndian)?,
            md5: r.read_to()?,
        })
    }
}

impl ToBitStream for Streaminfo {
    type Error = std::io::Error;

    fn to_writer<W: BitWrite + ?Sized>(&self, w: &mut W) -> Result<(), Self::Error> {
        w.write_from(self.minimum_block_size)?;
        w.write_from(self.maximum_block_size)?;
        w.write::<24, _>(self.minimum_frame_size)?;
        w.write::<24, _>(self.maximum_frame_size)?;
        w.write_from(self.packed)?;
        w.write_from(self.md5)
    }
}

/// A PADDING metadata block
///
/// The contents of a PADDING block are ignored.
///
/// # Example
///
/// ```
/// use bitstream_io::{BitReader, BitRead, BigEndian};
/// use flac_dump::metadata::{BlockHeader, BlockType, Padding};
///
/// let data: &[u8] = &[
///     0x81, 0x00, 0x00, 0x0a,  // block header
///     // padding bytes
///     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
/// ];
///
/// let mut r = BitReader::endian(data, BigEndian);
/// let header = r.parse::<BlockHeader>().unwrap();
/// assert_eq!(
///     &header,
///     &BlockHeader {
///         last: true,
///         block_type: BlockType::Padding,
///         size: 0x0au8.into(),
///     },
/// );
///
/// assert_eq!(
///     r.parse_using::<Padding>(header.size).unwrap(),
///     Padding {
///         size: 0x0au8.into(),
///     },
/// );
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Padding {
    /// The size of the padding, in bytes
    pub size: BlockSize,
}

impl FromBitStreamUsing for Padding {
    type Context = BlockSize;
    type Error = Error;

    fn from_reader<R: BitRead + ?Sized>(r: &mut R, size: BlockSize) -> Result<Self, Self::Error> {
        r.skip(size.get() * 8)?;
        Ok(Self { size })
    }
}

impl ToBitStream for Padding {
    type Error = std::io::Error;

    fn to_writer<W: BitWrite + ?Sized>(&self, w: &mut W) -> Result<(), Self::Error> {
        w.pad(self.size.get() * 8)
    }
}

/// A SEEKTABLE metadata block
///
/// Its seekpoints occupy the entire block.
/// A block whose size is not an even multiple of
/// a seek point's 18 bytes is still read,
/// but its leftover bytes are counted in `trailing_bytes`.
///
/// # Example
/// ```
/// use bitstream_io::{BitReader, BitRead, BigEndian};
/// use flac_dump::metadata::{BlockHeader, BlockType, SeekTable, SeekPoint};
///
/// let data: &[u8] = &[
///     0x83, 0x00, 0x00, 0x24,  // block header
///     // seekpoint 0
///     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
///     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
///     0x00, 0x14,
///     // seekpoint 1
///     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x14,
///     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0c,
///     0x00, 0x14,
/// ];
///
/// let mut r = BitReader::endian(data, BigEndian);
/// let header = r.parse::<BlockHeader>().unwrap();
/// assert_eq!(header.block_type, BlockType::SeekTable);
///
/// assert_eq!(
///     r.parse_using::<SeekTable>(header.size).unwrap(),
///     SeekTable {
///         points: vec![
///             SeekPoint {
///                 sample_offset: 0x00,
///                 byte_offset: 0x00,
///                 frame_samples: 0x14,
///             },
///             SeekPoint {
///                 sample_offset: 0x14,
///                 byte_offset: 0x0c,
///                 frame_samples: 0x14,
///             },
///         ],
///         trailing_bytes: 0,
///     },
/// );
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SeekTable {
    /// The seek table's individual seek points
    pub points: Vec<SeekPoint>,
    /// Bytes left over after the final whole seek point
    ///
    /// This should always be 0 in a well-formed file.
    pub trailing_bytes: u32,
}

impl SeekTable {
    /// The size of a single seek point, in bytes
    pub const POINT_SIZE: u32 = 18;
}

impl FromBitStreamUsing for SeekTable {
    type Context = BlockSize;
    type Error = Error;

    fn from_reader<R: BitRead + ?Sized>(r: &mut R, size: BlockSize) -> Result<Self, Self::Error> {
        let (count, trailing_bytes) = (size.get() / Self::POINT_SIZE, size.get() % Self::POINT_SIZE);

        if trailing_bytes != 0 {
            warn!(
                "SEEKTABLE size {size} is not a multiple of {}, \
                 {trailing_bytes} trailing bytes",
                Self::POINT_SIZE
            );
        }

        let points = (0..count)
            .map(|_| r.parse())
            .collect::<Result<Vec<SeekPoint>, _>>()?;

        r.skip(trailing_bytes * 8)?;

        Ok(Self {
            points,
            trailing_bytes,
        })
    }
}

impl ToBitStream for SeekTable {
    type Error = std::io::Error;

    fn to_writer<W: BitWrite + ?Sized>(&self, w: &mut W) -> Result<(), Self::Error> {
        self.points.iter().try_for_each(|point| w.build(point))?;
        w.pad(self.trailing_bytes * 8)
    }
}

/// An individual SEEKTABLE seek point
///
/// | Bits | Field | Meaning |
/// |-----:|------:|---------|
/// | 64   | `sample_offset` | sample number of first sample in target frame
/// | 64   | `byte_offset` | offset, in bytes, from first frame to target frame's header
/// | 16   | `frame_samples` | number of samples in target frame
///
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SeekPoint {
    /// The sample number of the first sample in the target frame
    pub sample_offset: u64,
    /// Offset, in bytes, from the first byte of the first frame header
    /// to the first byte in the target frame's header
    pub byte_offset: u64,
    /// Number of samples in the target frame
    pub frame_samples: u16,
}

impl SeekPoint {
    /// The sample offset of a placeholder point
    pub const PLACEHOLDER: u64 = u64::MAX;

    /// Whether this is a placeholder point
    /// rather than one which points to a frame
    pub fn is_placeholder(&self) -> bool {
        self.sample_offset == Self::PLACEHOLDER
    }
}

impl FromBitStream for SeekPoint {
    type Error = std::io::Error;

    fn from_reader<R: BitRead + ?Sized>(r: &mut R) -> Result<Self, Self::Error> {
        Ok(Self {
            sample_offset: r.read_field::<64>(ByteOrder::BigEndian)?,
            byte_offset: r.read_field::<64>(ByteOrder::BigEndian)?,
            frame_samples: r.read_field::<16>(ByteOrder::BigEndian)? as u16,
        })
    }
}

impl ToBitStream for SeekPoint {
    type Error = std::io::Error;

    fn to_writer<W: BitWrite + ?Sized>(&self, w: &mut W) -> Result<(), Self::Error> {
        w.write_from(self.sample_offset)?;
        w.write_from(self.byte_offset)?;
        w.write_from(self.frame_samples)
    }
}

/// A VORBIS_COMMENT metadata block
///
/// # Byte Order
///
/// Unlike the rest of a FLAC file, the Vorbis comment's
/// length fields are stored in little-endian byte order.
///
/// | Bits | Field | Meaning |
/// |-----:|------:|---------|
/// | 32   | vendor string len | length of vendor string, in bytes
/// | `vendor string len`×8 | `vendor_string` | vendor string, in UTF-8
/// | 32   | field count | number of vendor string fields
/// | 32   | field₀ len | length of field₀, in bytes
/// | `field₀ len`×8 | `fields₀` | first field value, in UTF-8
/// | 32   | field₁ len | length of field₁, in bytes
/// | `field₁ len`×8 | `fields₁` | second field value, in UTF-8
/// | | | ⋮
///
/// # Example
/// ```
/// use bitstream_io::{BitReader, BitRead, BigEndian};
/// use flac_dump::metadata::VorbisComment;
///
/// let data: &[u8] = &[
///     0x20, 0x00, 0x00, 0x00,  // 32 byte vendor string
///     0x72, 0x65, 0x66, 0x65, 0x72, 0x65, 0x6e, 0x63,
///     0x65, 0x20, 0x6c, 0x69, 0x62, 0x46, 0x4c, 0x41,
///     0x43, 0x20, 0x31, 0x2e, 0x34, 0x2e, 0x33, 0x20,
///     0x32, 0x30, 0x32, 0x33, 0x30, 0x36, 0x32, 0x33,
///     0x02, 0x00, 0x00, 0x00,  // 2 fields
///     0x0d, 0x00, 0x00, 0x00,  // 13 byte field 1
///     0x54, 0x49, 0x54, 0x4c, 0x45, 0x3d, 0x54, 0x65,
///     0x73, 0x74, 0x69, 0x6e, 0x67,
///     0x10, 0x00, 0x00, 0x00,  // 16 byte field 2
///     0x41, 0x4c, 0x42, 0x55, 0x4d, 0x3d, 0x54, 0x65,
///     0x73, 0x74, 0x20, 0x41, 0x6c, 0x62, 0x75, 0x6d,
/// ];
///
/// let mut r = BitReader::endian(data, BigEndian);
/// let comment = r.parse_using::<VorbisComment>(71u8.into()).unwrap();
/// assert_eq!(
///     comment,
///     VorbisComment {
///         vendor_string: "reference libFLAC 1.4.3 20230623".to_string(),
///         fields: vec![
///              "TITLE=Testing".to_string(),
///              "ALBUM=Test Album".to_string(),
///         ],
///     },
/// );
/// assert_eq!(comment.field("album"), Some("Test Album"));
/// ```
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct VorbisComment {
    /// The vendor string
    pub vendor_string: String,
    /// The individual metadata comment strings
    pub fields: Vec<String>,
}

impl VorbisComment {
    /// Name of current work
    pub const TITLE: &str = "TITLE";

    /// Name of the artist generally responsible for the current work
    pub const ARTIST: &str = "ARTIST";

    /// Name of the collection the current work belongs to
    pub const ALBUM: &str = "ALBUM";

    /// Given a field name, returns first matching value, if any
    ///
    /// Fields are matched case-insensitively
    pub fn field(&self, field: &str) -> Option<&str> {
        self.field_values(field).next()
    }

    /// Given a field name, iterates over any matching values
    ///
    /// Fields are matched case-insensitively
    pub fn field_values(&self, field: &str) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|f| {
            f.split_once('=')
                .and_then(|(key, value)| key.eq_ignore_ascii_case(field).then_some(value))
        })
    }
}

impl FromBitStreamUsing for VorbisComment {
    type Context = BlockSize;
    type Error = Error;

    fn from_reader<R: BitRead + ?Sized>(r: &mut R, size: BlockSize) -> Result<Self, Self::Error> {
        fn read_string<R: BitRead + ?Sized>(r: &mut R, size: BlockSize) -> Result<String, Error> {
            Ok(String::from_utf8(read_prefixed(
                r,
                ByteOrder::LittleEndian,
                size,
            )?)?)
        }

        let vendor_string = read_string(r, size)?;

        // the count is untrusted, so no pre-allocation
        let mut fields = vec![];
        for _ in 0..r.read_field::<32>(ByteOrder::LittleEndian)? {
            fields.push(read_string(r, size)?);
        }

        Ok(Self {
            vendor_string,
            fields,
        })
    }
}

impl ToBitStream for VorbisComment {
    type Error = Error;

    fn to_writer<W: BitWrite + ?Sized>(&self, w: &mut W) -> Result<(), Self::Error> {
        fn write_string<W: BitWrite + ?Sized>(w: &mut W, s: &str) -> Result<(), Error> {
            w.write_as_from::<LittleEndian, u32>(
                s.len()
                    .try_into()
                    .map_err(|_| Error::ExcessiveStringLength)?,
            )?;
            w.write_bytes(s.as_bytes())?;
            Ok(())
        }

        write_string(w, &self.vendor_string)?;
        w.write_as_from::<LittleEndian, u32>(
            self.fields
                .len()
                .try_into()
                .map_err(|_| Error::ExcessiveVorbisEntries)?,
        )?;
        self.fields.iter().try_for_each(|s| write_string(w, s))
    }
}

/// Reads a 32-bit length prefix followed by that many bytes
///
/// Lengths which cannot fit in the enclosing block
/// are rejected before anything is allocated.
fn read_prefixed<R: BitRead + ?Sized>(
    r: &mut R,
    order: ByteOrder,
    block_size: BlockSize,
) -> Result<Vec<u8>, Error> {
    let len = r.read_field::<32>(order)?;
    if len > u64::from(block_size.get()) {
        return Err(Error::MetadataBlockOverrun);
    }
    Ok(r.read_to_vec(usize::try_from(len).map_err(|_| Error::MetadataBlockOverrun)?)?)
}
