// Copyright 2025 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::{BlockSize, read_prefixed};
use crate::Error;
use crate::bits::{ByteOrder, FieldRead};
use bitstream_io::{BitRead, BitWrite, FromBitStream, FromBitStreamUsing, ToBitStream};

/// A PICTURE metadata block
///
/// Picture data is usually a JPEG or PNG file.
///
/// | Bits | Field | Meaning |
/// |-----:|------:|---------|
/// | 32   | `picture_type` | type of picture, see [`PictureType`]
/// | 32   | media type len | length of `media_type`, in bytes
/// | `media type len`×8 | `media_type` | picture's MIME type
/// | 32   | description len | length of `description`, in bytes
/// | `description len`×8 | `description` | picture's description, in UTF-8
/// | 32   | `width` | width of picture, in pixels
/// | 32   | `height` | height of picture, in pixels
/// | 32   | `color_depth` | color depth of picture in bits-per-pixel
/// | 32   | `colors_used` | for indexed-color pictures, number of colors used
/// | 32   | data len | length of `data`, in bytes
/// | `data len`×8 | `data` | binary picture data
///
/// Unlike VORBIS_COMMENT, all of PICTURE's length fields are big-endian.
///
/// # Example
/// ```
/// use bitstream_io::{BitReader, BitRead, BigEndian};
/// use flac_dump::metadata::{Picture, PictureType};
///
/// let data: &[u8] = &[
///     0x00, 0x00, 0x00, 0x03,  // picture type
///     0x00, 0x00, 0x00, 0x09,  // media type len
///     0x69, 0x6d, 0x61, 0x67, 0x65, 0x2f, 0x70, 0x6e, 0x67,
///     0x00, 0x00, 0x00, 0x04,  // description len
///     0x66, 0x72, 0x6f, 0x6e,
///     0x00, 0x00, 0x00, 0x10,  // width
///     0x00, 0x00, 0x00, 0x08,  // height
///     0x00, 0x00, 0x00, 0x18,  // color depth
///     0x00, 0x00, 0x00, 0x00,  // colors used
///     0x00, 0x00, 0x00, 0x03,  // data len
///     0x89, 0x50, 0x4e,
/// ];
///
/// let mut r = BitReader::endian(data, BigEndian);
/// let picture = r.parse_using::<Picture>(60u8.into()).unwrap();
/// assert_eq!(picture.picture_type, PictureType::FrontCover);
/// assert_eq!(picture.picture_type.to_string(), "Cover (front)");
/// assert_eq!(picture.media_type, "image/png");
/// assert_eq!(picture.description, "fron");
/// assert_eq!((picture.width, picture.height), (16, 8));
/// assert_eq!(picture.data, [0x89, 0x50, 0x4e]);
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Picture {
    /// The picture type
    pub picture_type: PictureType,
    /// The media type string as specified by RFC2046
    pub media_type: String,
    /// The description of the picture
    pub description: String,
    /// The width of the picture in pixels
    pub width: u32,
    /// The height of the picture in pixels
    pub height: u32,
    /// The color depth of the picture in bits per pixel
    pub color_depth: u32,
    /// For indexed-color pictures, the number of colors used
    ///
    /// 0 for non-indexed pictures
    pub colors_used: u32,
    /// The binary picture data
    pub data: Vec<u8>,
}

impl Picture {
    /// A file extension suitable for our media type
    ///
    /// Falls back to `jpg` for unrecognized types.
    pub fn file_extension(&self) -> &'static str {
        match self.media_type.to_ascii_lowercase().as_str() {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            "image/tiff" => "tiff",
            _ => "jpg",
        }
    }
}

impl FromBitStreamUsing for Picture {
    type Context = BlockSize;
    type Error = Error;

    fn from_reader<R: BitRead + ?Sized>(r: &mut R, size: BlockSize) -> Result<Self, Error> {
        Ok(Self {
            picture_type: r.parse()?,
            media_type: String::from_utf8(read_prefixed(r, ByteOrder::BigEndian, size)?)?,
            description: String::from_utf8(read_prefixed(r, ByteOrder::BigEndian, size)?)?,
            width: r.read_field::<32>(ByteOrder::BigEndian)? as u32,
            height: r.read_field::<32>(ByteOrder::BigEndian)? as u32,
            color_depth: r.read_field::<32>(ByteOrder::BigEndian)? as u32,
            colors_used: r.read_field::<32>(ByteOrder::BigEndian)? as u32,
            data: read_prefixed(r, ByteOrder::BigEndian, size)?,
        })
    }
}

impl ToBitStream for Picture {
    type Error = Error;

    fn to_writer<W: BitWrite + ?Sized>(&self, w: &mut W) -> Result<(), Error> {
        fn prefixed_field<W: BitWrite + ?Sized>(
            w: &mut W,
            field: &[u8],
            error: Error,
        ) -> Result<(), Error> {
            w.write_from::<u32>(field.len().try_into().map_err(|_| error)?)?;
            w.write_bytes(field)?;
            Ok(())
        }

        w.build(&self.picture_type)?;
        prefixed_field(w, self.media_type.as_bytes(), Error::ExcessiveStringLength)?;
        prefixed_field(w, self.description.as_bytes(), Error::ExcessiveStringLength)?;
        w.write_from(self.width)?;
        w.write_from(self.height)?;
        w.write_from(self.color_depth)?;
        w.write_from(self.colors_used)?;
        prefixed_field(w, &self.data, Error::ExcessivePictureSize)
    }
}

/// Defined variants of PICTURE type
///
/// These are the same as ID3v2's APIC frame picture types.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PictureType {
    /// Other
    Other = 0,
    /// PNG file icon of 32x32 pixels
    Png32x32 = 1,
    /// General file icon
    GeneralFileIcon = 2,
    /// Front cover
    FrontCover = 3,
    /// Back cover
    BackCover = 4,
    /// Liner notes page
    LinerNotes = 5,
    /// Media label (e.g., CD, Vinyl or Cassette label)
    MediaLabel = 6,
    /// Lead artist, lead performer, or soloist
    LeadArtist = 7,
    /// Artist or performer
    Artist = 8,
    /// Conductor
    Conductor = 9,
    /// Band or orchestra
    Band = 10,
    /// Composer
    Composer = 11,
    /// Lyricist or text writer
    Lyricist = 12,
    /// Recording location
    RecordingLocation = 13,
    /// During recording
    DuringRecording = 14,
    /// During performance
    DuringPerformance = 15,
    /// Movie or video screen capture
    ScreenCapture = 16,
    /// A bright colored fish
    Fish = 17,
    /// Illustration
    Illustration = 18,
    /// Band or artist logotype
    BandLogo = 19,
    /// Publisher or studio logotype
    PublisherLogo = 20,
}

impl std::fmt::Display for PictureType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Other => "Other".fmt(f),
            Self::Png32x32 => "32x32 pixels 'file icon' (PNG only)".fmt(f),
            Self::GeneralFileIcon => "Other file icon".fmt(f),
            Self::FrontCover => "Cover (front)".fmt(f),
            Self::BackCover => "Cover (back)".fmt(f),
            Self::LinerNotes => "Leaflet page".fmt(f),
            Self::MediaLabel => "Media (e.g. label side of CD)".fmt(f),
            Self::LeadArtist => "Lead artist/lead performer/soloist".fmt(f),
            Self::Artist => "Artist/performer".fmt(f),
            Self::Conductor => "Conductor".fmt(f),
            Self::Band => "Band/Orchestra".fmt(f),
            Self::Composer => "Composer".fmt(f),
            Self::Lyricist => "Lyricist/text writer".fmt(f),
            Self::RecordingLocation => "Recording Location".fmt(f),
            Self::DuringRecording => "During recording".fmt(f),
            Self::DuringPerformance => "During performance".fmt(f),
            Self::ScreenCapture => "Movie/video screen capture".fmt(f),
            Self::Fish => "A bright coloured fish".fmt(f),
            Self::Illustration => "Illustration".fmt(f),
            Self::BandLogo => "Band/artist logotype".fmt(f),
            Self::PublisherLogo => "Publisher/Studio logotype".fmt(f),
        }
    }
}

impl TryFrom<u32> for PictureType {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self, Error> {
        match code {
            0 => Ok(Self::Other),
            1 => Ok(Self::Png32x32),
            2 => Ok(Self::GeneralFileIcon),
            3 => Ok(Self::FrontCover),
            4 => Ok(Self::BackCover),
            5 => Ok(Self::LinerNotes),
            6 => Ok(Self::MediaLabel),
            7 => Ok(Self::LeadArtist),
            8 => Ok(Self::Artist),
            9 => Ok(Self::Conductor),
            10 => Ok(Self::Band),
            11 => Ok(Self::Composer),
            12 => Ok(Self::Lyricist),
            13 => Ok(Self::RecordingLocation),
            14 => Ok(Self::DuringRecording),
            15 => Ok(Self::DuringPerformance),
            16 => Ok(Self::ScreenCapture),
            17 => Ok(Self::Fish),
            18 => Ok(Self::Illustration),
            19 => Ok(Self::BandLogo),
            20 => Ok(Self::PublisherLogo),
            code => Err(Error::InvalidPictureType(code)),
        }
    }
}

impl FromBitStream for PictureType {
    type Error = Error;

    fn from_reader<R: BitRead + ?Sized>(r: &mut R) -> Result<Self, Error> {
        Self::try_from(r.read_field::<32>(ByteOrder::BigEndian)? as u32)
    }
}

impl ToBitStream for PictureType {
    type Error = std::io::Error;

    fn to_writer<W: BitWrite + ?Sized>(&self, w: &mut W) -> Result<(), Self::Error> {
        w.write_from::<u32>(*self as u32)
    }
}
