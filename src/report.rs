// Copyright 2025 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! For turning metadata blocks into human-readable lines
//!
//! # Example
//! ```
//! use flac_dump::metadata::{write_blocks, Block, Padding};
//! use flac_dump::report::dump;
//! use flac_dump::sink::MemorySink;
//!
//! let mut flac = vec![];
//! write_blocks([Block::from(Padding { size: 4u8.into() })], &mut flac).unwrap();
//!
//! let mut lines: Vec<u8> = vec![];
//! assert_eq!(dump(flac.as_slice(), &mut lines, &mut MemorySink::default()).unwrap(), 1);
//! assert_eq!(
//!     String::from_utf8(lines).unwrap(),
//!     "Signature: fLaC\n\
//!      --------\n\
//!      Is last metadata block? Yes\n\
//!      Length (in bytes): 4\n\
//!      Block type: 1 (PADDING)\n\
//!      --------\n",
//! );
//! ```

use crate::Error;
use crate::metadata::{
    Block, BlockHeader, BlockReader, Picture, SeekTable, Streaminfo, VorbisComment, blocks,
};
use crate::sink::PayloadSink;
use std::path::Path;

/// Somewhere to send report lines
pub trait LineSink {
    /// Outputs a single line of text
    fn line(&mut self, args: std::fmt::Arguments) -> std::io::Result<()>;
}

impl<W: std::io::Write + ?Sized> LineSink for W {
    fn line(&mut self, args: std::fmt::Arguments) -> std::io::Result<()> {
        writeln!(self, "{args}")
    }
}

macro_rules! report {
    ($sink:expr, $($arg:tt)*) => {
        $sink.line(format_args!($($arg)*))
    };
}

const SEPARATOR: &str = "--------";

/// Reports every metadata block in the given stream
///
/// Picture data is handed to `payloads`,
/// and the location it returns is reported.
/// Returns the number of blocks reported.
///
/// # Errors
///
/// Returns the first error from decoding a block,
/// writing a line, or storing a payload.
/// Any lines already written remain written.
pub fn dump<R, L, P>(reader: R, lines: &mut L, payloads: &mut P) -> Result<usize, Error>
where
    R: std::io::Read,
    L: LineSink + ?Sized,
    P: PayloadSink + ?Sized,
{
    dump_blocks(BlockReader::new(reader), lines, payloads)
}

/// Reports every metadata block in the file at the given path
///
/// # Errors
///
/// As with [`dump`], along with any error opening the file.
pub fn dump_file<L, P>(path: impl AsRef<Path>, lines: &mut L, payloads: &mut P) -> Result<usize, Error>
where
    L: LineSink + ?Sized,
    P: PayloadSink + ?Sized,
{
    dump_blocks(blocks(path)?, lines, payloads)
}

fn dump_blocks<R, L, P>(
    mut reader: BlockReader<R>,
    lines: &mut L,
    payloads: &mut P,
) -> Result<usize, Error>
where
    R: std::io::Read,
    L: LineSink + ?Sized,
    P: PayloadSink + ?Sized,
{
    reader.read_tag()?;
    report!(lines, "Signature: fLaC")?;

    let mut count = 0;
    for result in reader {
        let (header, block) = result?;
        report!(lines, "{SEPARATOR}")?;
        dump_block(&header, &block, lines, payloads)?;
        count += 1;
    }

    report!(lines, "{SEPARATOR}")?;
    Ok(count)
}

fn dump_block<L, P>(
    header: &BlockHeader,
    block: &Block,
    lines: &mut L,
    payloads: &mut P,
) -> Result<(), Error>
where
    L: LineSink + ?Sized,
    P: PayloadSink + ?Sized,
{
    report!(
        lines,
        "Is last metadata block? {}",
        if header.last { "Yes" } else { "No" }
    )?;
    report!(lines, "Length (in bytes): {}", header.size)?;
    report!(
        lines,
        "Block type: {} ({})",
        header.block_type.code(),
        header.block_type
    )?;

    match block {
        Block::Streaminfo(streaminfo) => dump_streaminfo(streaminfo, lines)?,
        Block::Padding(_) => {}
        Block::SeekTable(seektable) => dump_seektable(seektable, lines)?,
        Block::VorbisComment(comment) => dump_vorbis_comment(comment, lines)?,
        Block::Picture(picture) => dump_picture(picture, lines, payloads)?,
    }

    Ok(())
}

fn dump_streaminfo<L: LineSink + ?Sized>(s: &Streaminfo, lines: &mut L) -> std::io::Result<()> {
    report!(lines, "Minimum block size (in samples): {}", s.minimum_block_size)?;
    report!(lines, "Maximum block size (in samples): {}", s.maximum_block_size)?;
    report!(
        lines,
        "Minimum frame size (in bytes) used in the stream: {}",
        s.minimum_frame_size
    )?;
    report!(
        lines,
        "Maximum frame size (in bytes) used in the stream: {}",
        s.maximum_frame_size
    )?;
    report!(lines, "Sample rate (in Hz): {}", s.sample_rate())?;
    report!(lines, "Number of channels: {}", s.channels())?;
    report!(lines, "Bits per sample: {}", s.bits_per_sample())?;
    report!(lines, "Total samples in stream: {}", s.total_samples())?;
    report!(
        lines,
        "MD5 signature of the un-encoded audio data: {}",
        Hex(&s.md5)
    )
}

fn dump_seektable<L: LineSink + ?Sized>(s: &SeekTable, lines: &mut L) -> std::io::Result<()> {
    for (i, point) in s.points.iter().enumerate() {
        report!(
            lines,
            "{i}) Sample number: {}, Stream offset: {}, Frame samples: {}{}",
            point.sample_offset,
            point.byte_offset,
            point.frame_samples,
            if point.is_placeholder() {
                " (placeholder)"
            } else {
                ""
            }
        )?;
    }

    match s.trailing_bytes {
        0 => Ok(()),
        trailing => report!(
            lines,
            "Trailing bytes not forming a seek point: {trailing}"
        ),
    }
}

fn dump_vorbis_comment<L: LineSink + ?Sized>(
    c: &VorbisComment,
    lines: &mut L,
) -> std::io::Result<()> {
    report!(lines, "Vendor: {}", c.vendor_string)?;
    c.fields
        .iter()
        .enumerate()
        .try_for_each(|(i, field)| report!(lines, "comment[{i}]=\"{field}\""))
}

fn dump_picture<L, P>(p: &Picture, lines: &mut L, payloads: &mut P) -> Result<(), Error>
where
    L: LineSink + ?Sized,
    P: PayloadSink + ?Sized,
{
    report!(
        lines,
        "The picture type according to the ID3v2 APIC frame: {} (\"{}\")",
        p.picture_type as u32,
        p.picture_type
    )?;
    report!(lines, "MIME Type: {}", p.media_type)?;
    report!(lines, "Description: \"{}\"", p.description)?;
    report!(lines, "Width (in pixels): {}", p.width)?;
    report!(lines, "Height (in pixels): {}", p.height)?;
    report!(lines, "Color depth (in bits-per-pixel): {}", p.color_depth)?;
    report!(lines, "Number of colors used: {}", p.colors_used)?;
    report!(lines, "Picture data (in bytes): {}", p.data.len())?;

    let location = payloads.store(p).map_err(Error::Io)?;
    report!(lines, "Picture extracted in: \"{location}\"")?;
    Ok(())
}

struct Hex<'b>(&'b [u8]);

impl std::fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}
