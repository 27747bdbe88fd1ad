// Copyright 2025 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use flac_dump::ErrorKind;
use flac_dump::metadata::{
    Block, Padding, Picture, PictureType, SeekPoint, SeekTable, Streaminfo, VorbisComment,
    write_blocks,
};
use flac_dump::report::{LineSink, dump};
use flac_dump::sink::MemorySink;

fn flac(blocks: impl IntoIterator<Item = Block>) -> Vec<u8> {
    let mut flac = vec![];
    write_blocks(blocks, &mut flac).unwrap();
    flac
}

// collects lines individually rather than as one blob
#[derive(Default)]
struct Lines(Vec<String>);

impl LineSink for Lines {
    fn line(&mut self, args: std::fmt::Arguments) -> std::io::Result<()> {
        self.0.push(args.to_string());
        Ok(())
    }
}

fn dump_lines(
    flac: &[u8],
    payloads: &mut MemorySink,
) -> (Result<usize, flac_dump::Error>, Vec<String>) {
    let mut lines = Lines::default();
    let result = dump(flac, &mut lines, payloads);
    (result, lines.0)
}

#[test]
fn test_dump_streaminfo() {
    let (result, lines) = dump_lines(
        &flac([Block::from(Streaminfo {
            minimum_block_size: 4096,
            maximum_block_size: 4096,
            minimum_frame_size: 12,
            maximum_frame_size: 12,
            packed: (44100 << 44) | (15 << 36) | 50,
            md5: [
                0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
                0x0e, 0xff,
            ],
        })]),
        &mut MemorySink::default(),
    );

    assert_eq!(result.unwrap(), 1);
    assert_eq!(
        lines,
        [
            "Signature: fLaC",
            "--------",
            "Is last metadata block? Yes",
            "Length (in bytes): 34",
            "Block type: 0 (STREAMINFO)",
            "Minimum block size (in samples): 4096",
            "Maximum block size (in samples): 4096",
            "Minimum frame size (in bytes) used in the stream: 12",
            "Maximum frame size (in bytes) used in the stream: 12",
            "Sample rate (in Hz): 44100",
            "Number of channels: 1",
            "Bits per sample: 16",
            "Total samples in stream: 50",
            "MD5 signature of the un-encoded audio data: 000102030405060708090a0b0c0d0eff",
            "--------",
        ]
    );
}

#[test]
fn test_dump_seektable_and_comment() {
    let (result, lines) = dump_lines(
        &flac([
            Block::from(SeekTable {
                points: vec![
                    SeekPoint {
                        sample_offset: 0,
                        byte_offset: 0,
                        frame_samples: 4096,
                    },
                    SeekPoint {
                        sample_offset: SeekPoint::PLACEHOLDER,
                        byte_offset: 0,
                        frame_samples: 0,
                    },
                ],
                trailing_bytes: 3,
            }),
            Block::from(VorbisComment {
                vendor_string: "libFLAC".to_owned(),
                fields: vec!["TITLE=Testing".to_owned(), "ALBUM=Test Album".to_owned()],
            }),
        ]),
        &mut MemorySink::default(),
    );

    assert_eq!(result.unwrap(), 2);
    assert_eq!(
        lines,
        [
            "Signature: fLaC",
            "--------",
            "Is last metadata block? No",
            "Length (in bytes): 39",
            "Block type: 3 (SEEKTABLE)",
            "0) Sample number: 0, Stream offset: 0, Frame samples: 4096",
            "1) Sample number: 18446744073709551615, Stream offset: 0, Frame samples: 0 (placeholder)",
            "Trailing bytes not forming a seek point: 3",
            "--------",
            "Is last metadata block? Yes",
            "Length (in bytes): 52",
            "Block type: 4 (VORBIS_COMMENT)",
            "Vendor: libFLAC",
            "comment[0]=\"TITLE=Testing\"",
            "comment[1]=\"ALBUM=Test Album\"",
            "--------",
        ]
    );
}

#[test]
fn test_dump_picture() {
    let mut payloads = MemorySink::default();

    let (result, lines) = dump_lines(
        &flac([
            Block::from(Picture {
                picture_type: PictureType::FrontCover,
                media_type: "image/png".to_owned(),
                description: "front".to_owned(),
                width: 32,
                height: 32,
                color_depth: 8,
                colors_used: 16,
                data: vec![0x89, 0x50, 0x4e, 0x47],
            }),
            Block::from(Picture {
                picture_type: PictureType::Fish,
                media_type: "image/jpeg".to_owned(),
                description: String::new(),
                width: 1,
                height: 1,
                color_depth: 24,
                colors_used: 0,
                data: vec![0xff, 0xd8],
            }),
            Block::from(Padding { size: 8u8.into() }),
        ]),
        &mut payloads,
    );

    assert_eq!(result.unwrap(), 3);
    assert_eq!(payloads.pictures, [vec![0x89, 0x50, 0x4e, 0x47], vec![0xff, 0xd8]]);

    assert_eq!(
        &lines[2..15],
        [
            "Is last metadata block? No",
            "Length (in bytes): 50",
            "Block type: 6 (PICTURE)",
            "The picture type according to the ID3v2 APIC frame: 3 (\"Cover (front)\")",
            "MIME Type: image/png",
            "Description: \"front\"",
            "Width (in pixels): 32",
            "Height (in pixels): 32",
            "Color depth (in bits-per-pixel): 8",
            "Number of colors used: 16",
            "Picture data (in bytes): 4",
            "Picture extracted in: \"0\"",
            "--------",
        ]
    );

    assert!(lines.iter().any(|line| line.ends_with("17 (\"A bright coloured fish\")")));
    assert!(lines.contains(&"Picture extracted in: \"1\"".to_owned()));
    assert_eq!(lines.last().unwrap(), "--------");
}

#[test]
fn test_dump_into_writer() {
    let mut out: Vec<u8> = vec![];
    dump(
        flac([Block::from(VorbisComment::default())]).as_slice(),
        &mut out,
        &mut MemorySink::default(),
    )
    .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Signature: fLaC\n\
         --------\n\
         Is last metadata block? Yes\n\
         Length (in bytes): 8\n\
         Block type: 4 (VORBIS_COMMENT)\n\
         Vendor: \n\
         --------\n"
    );
}

#[test]
fn test_dump_errors() {
    // a bad tag reports nothing at all
    let (result, lines) = dump_lines(b"RIFF\0\0\0\0", &mut MemorySink::default());
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Format);
    assert!(lines.is_empty());

    // blocks before an unsupported one are still reported
    let mut data = flac([
        Block::from(Padding { size: 2u8.into() }),
        Block::from(Padding { size: 2u8.into() }),
    ]);
    data[10] = 0b1_0000101; // second block becomes a last CUESHEET

    let (result, lines) = dump_lines(&data, &mut MemorySink::default());
    assert_eq!(result.unwrap_err().kind(), ErrorKind::UnsupportedBlock);
    assert_eq!(
        lines,
        [
            "Signature: fLaC",
            "--------",
            "Is last metadata block? No",
            "Length (in bytes): 2",
            "Block type: 1 (PADDING)",
        ]
    );
}

#[test]
fn test_failing_line_sink() {
    struct Broken;

    impl LineSink for Broken {
        fn line(&mut self, _: std::fmt::Arguments) -> std::io::Result<()> {
            Err(std::io::Error::other("sink closed"))
        }
    }

    let err = dump(
        flac([Block::from(Padding { size: 2u8.into() })]).as_slice(),
        &mut Broken,
        &mut MemorySink::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.to_string(), "sink closed");
}
