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
    read_blocks, write_blocks,
};

fn sample_flac() -> Vec<u8> {
    let mut flac = vec![];
    write_blocks(
        [
            Block::from(Streaminfo {
                minimum_block_size: 4096,
                maximum_block_size: 4096,
                minimum_frame_size: 12,
                maximum_frame_size: 1723,
                packed: (48000 << 44) | (1 << 41) | (23 << 36) | 96000,
                md5: [0x5a; 16],
            }),
            Block::from(SeekTable {
                points: (0..4)
                    .map(|i| SeekPoint {
                        sample_offset: i * 4096,
                        byte_offset: i * 1000,
                        frame_samples: 4096,
                    })
                    .collect(),
                trailing_bytes: 0,
            }),
            Block::from(VorbisComment {
                vendor_string: "reference libFLAC 1.4.3 20230623".to_owned(),
                fields: vec![
                    "TITLE=Sine".to_owned(),
                    "ARTIST=Oscillator".to_owned(),
                    "ALBUM=Test Tones".to_owned(),
                ],
            }),
            Block::from(Picture {
                picture_type: PictureType::FrontCover,
                media_type: "image/png".to_owned(),
                description: "cover".to_owned(),
                width: 16,
                height: 16,
                color_depth: 24,
                colors_used: 0,
                data: (0..=255).collect(),
            }),
            Block::from(Padding {
                size: 64u8.into(),
            }),
        ],
        &mut flac,
    )
    .unwrap();
    flac
}

#[test]
fn test_truncation() {
    let flac = sample_flac();

    // ensure sample file is okay
    assert!(read_blocks(flac.as_slice()).all(|r| r.is_ok()));

    // every strict prefix of the metadata ends too early
    for _ in 0..200 {
        let len = fastrand::usize(0..flac.len());

        let err = read_blocks(&flac[0..len])
            .find_map(|r| r.err())
            .unwrap_or_else(|| panic!("prefix of {len} bytes decoded successfully"));

        assert_eq!(
            err.kind(),
            ErrorKind::TruncatedStream,
            "prefix of {len} bytes: {err}"
        );
    }
}

#[test]
fn test_bit_flips() {
    let flac = sample_flac();

    // flipping bits anywhere may or may not be noticed
    // (PADDING contents are never examined, for instance)
    // but must never panic or read past the metadata
    for _ in 0..500 {
        let mut flac = flac.clone();
        let idx = fastrand::usize(0..flac.len());
        flac[idx] ^= 1 << fastrand::u32(0..8);
        flac.extend_from_slice(b"audio");

        let mut reader = read_blocks(flac.as_slice());
        let results = reader.by_ref().collect::<Vec<_>>();

        if results.iter().all(|r| r.is_ok()) {
            assert!(reader.finished());
        } else {
            // iteration always stops at the first error
            assert!(results.last().unwrap().is_err());
            assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
        }
    }
}

#[test]
fn test_header_corruption() {
    let flac = sample_flac();

    // the tag is always checked
    for _ in 0..50 {
        let mut flac = flac.clone();
        flac[fastrand::usize(0..4)] ^= 1 << fastrand::u32(0..8);

        assert_eq!(
            read_blocks(flac.as_slice())
                .next()
                .unwrap()
                .unwrap_err()
                .kind(),
            ErrorKind::Format
        );
    }

    // any change to STREAMINFO's declared size is a framing error
    for _ in 0..50 {
        let mut flac = flac.clone();
        flac[7] ^= 1 << fastrand::u32(0..8);

        let err = read_blocks(flac.as_slice())
            .find_map(|r| r.err())
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Format, "{err}");
    }
}
