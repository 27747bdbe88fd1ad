// Copyright 2025 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A decoder for the metadata blocks at the start of a FLAC file
//!
//! A FLAC file begins with the `fLaC` tag, followed by one or
//! more metadata blocks, followed by the audio frames.
//! This crate reads the tag and the metadata blocks, and leaves
//! the audio frames untouched.
//!
//! The [`metadata`] module decodes blocks into typed values,
//! the [`report`] module turns them into human-readable lines,
//! and the [`sink`] module stores embedded PICTURE data.

#![warn(missing_docs)]

pub mod bits;
pub mod metadata;
pub mod report;
pub mod sink;

/// A FLAC metadata decoding error
#[derive(Debug)]
pub enum Error {
    /// A non-EOF I/O error from the stream or a sink
    Io(std::io::Error),
    /// The stream ended before a field or block was complete
    Truncated,
    /// A string field is not valid UTF-8
    Utf8(std::string::FromUtf8Error),
    /// The stream does not start with `fLaC`
    MissingFlacTag,
    /// A PICTURE block's type code is not one of the defined types
    InvalidPictureType(u32),
    /// A block's contents ended before its declared size
    InvalidMetadataBlockSize,
    /// A block's contents extend past its declared size
    MetadataBlockOverrun,
    /// A block type which is recognized but not decoded
    UnsupportedBlock(metadata::BlockType),
    /// A block is too large to fit in 24 bits
    ExcessiveBlockSize,
    /// A string is too large to fit in 32 bits
    ExcessiveStringLength,
    /// Too many VORBIS_COMMENT entries to fit in 32 bits
    ExcessiveVorbisEntries,
    /// A PICTURE's data is too large to fit in 32 bits
    ExcessivePictureSize,
}

/// The broad category of an [`Error`]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The stream's contents are malformed
    Format,
    /// The stream contains a block type this crate does not decode
    UnsupportedBlock,
    /// The stream ended early
    TruncatedStream,
    /// Some other I/O error occurred
    Io,
}

impl Error {
    /// Returns the category of this error
    ///
    /// All categories are fatal to the decode;
    /// this only distinguishes why it stopped.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Truncated => ErrorKind::TruncatedStream,
            Self::UnsupportedBlock(_) => ErrorKind::UnsupportedBlock,
            Self::Utf8(_)
            | Self::MissingFlacTag
            | Self::InvalidPictureType(_)
            | Self::InvalidMetadataBlockSize
            | Self::MetadataBlockOverrun
            | Self::ExcessiveBlockSize
            | Self::ExcessiveStringLength
            | Self::ExcessiveVorbisEntries
            | Self::ExcessivePictureSize => ErrorKind::Format,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::UnexpectedEof => Self::Truncated,
            _ => Self::Io(error),
        }
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(error: std::string::FromUtf8Error) -> Self {
        Self::Utf8(error)
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io(e) => e.fmt(f),
            Self::Truncated => "stream ended unexpectedly".fmt(f),
            Self::Utf8(e) => e.fmt(f),
            Self::MissingFlacTag => "not a FLAC stream (missing fLaC tag)".fmt(f),
            Self::InvalidPictureType(code) => write!(f, "picture type code not supported: {code}"),
            Self::InvalidMetadataBlockSize => "metadata block shorter than its size".fmt(f),
            Self::MetadataBlockOverrun => "metadata block data exceeds its size".fmt(f),
            Self::UnsupportedBlock(block_type) => write!(
                f,
                "unsupported metadata block type {} ({block_type})",
                block_type.code()
            ),
            Self::ExcessiveBlockSize => "metadata block too large".fmt(f),
            Self::ExcessiveStringLength => "string too large".fmt(f),
            Self::ExcessiveVorbisEntries => "too many VORBIS_COMMENT entries".fmt(f),
            Self::ExcessivePictureSize => "PICTURE data too large".fmt(f),
        }
    }
}
