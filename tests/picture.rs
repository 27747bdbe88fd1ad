// Copyright 2025 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use flac_dump::metadata::{Block, Padding, Picture, PictureType, write_blocks};
use flac_dump::report::dump_file;
use flac_dump::sink::{MemorySink, PayloadSink, TempFileSink};

fn picture(media_type: &str, data: &[u8]) -> Picture {
    Picture {
        picture_type: PictureType::FrontCover,
        media_type: media_type.to_owned(),
        description: String::new(),
        width: 0,
        height: 0,
        color_depth: 0,
        colors_used: 0,
        data: Vec::from(data),
    }
}

#[test]
fn test_temp_file_sink() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = TempFileSink::in_dir(dir.path());

    fn test(sink: &mut TempFileSink, dir: &std::path::Path, media_type: &str, extension: &str) {
        let data = [0x01, 0x02, 0x03, 0x04];
        let stored = sink.store(&picture(media_type, &data)).unwrap();
        let path = stored.path();

        assert_eq!(path.parent().unwrap(), dir);
        assert_eq!(path.extension().unwrap(), extension);
        assert!(
            path.file_name()
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("flac-picture-")
        );
        assert_eq!(std::fs::read(path).unwrap(), data);
        assert_eq!(stored.to_string(), path.display().to_string());
    }

    test(&mut sink, dir.path(), "image/jpeg", "jpg");
    test(&mut sink, dir.path(), "image/png", "png");
    test(&mut sink, dir.path(), "image/gif", "gif");
    test(&mut sink, dir.path(), "application/octet-stream", "jpg");
}

#[test]
fn test_unique_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = TempFileSink::in_dir(dir.path());
    let picture = picture("image/png", b"same data");

    let first = sink.store(&picture).unwrap();
    let second = sink.store(&picture).unwrap();
    assert_ne!(first, second);

    // both remain after the sink is gone
    drop(sink);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_missing_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = TempFileSink::in_dir(dir.path().join("nonexistent"));

    assert!(sink.store(&picture("image/png", &[0])).is_err());
}

#[test]
fn test_memory_sink() {
    let mut sink = MemorySink::default();

    assert_eq!(sink.store(&picture("image/png", &[1])).unwrap(), 0);
    assert_eq!(sink.store(&picture("image/png", &[])).unwrap(), 1);
    assert_eq!(sink.store(&picture("image/jpeg", &[2, 3])).unwrap(), 2);
    assert_eq!(sink.pictures, [vec![1], vec![], vec![2, 3]]);
}

#[test]
fn test_dump_file() {
    let dir = tempfile::tempdir().unwrap();
    let flac_path = dir.path().join("cover.flac");
    let pictures = dir.path().join("pictures");
    std::fs::create_dir(&pictures).unwrap();

    let png = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

    let mut flac = vec![];
    write_blocks(
        [
            Block::from(picture("image/png", &png)),
            Block::from(Padding { size: 16u8.into() }),
        ],
        &mut flac,
    )
    .unwrap();
    std::fs::write(&flac_path, &flac).unwrap();

    let mut lines: Vec<u8> = vec![];
    let count = dump_file(&flac_path, &mut lines, &mut TempFileSink::in_dir(&pictures)).unwrap();
    assert_eq!(count, 2);

    let extracted = std::fs::read_dir(&pictures)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect::<Vec<_>>();
    assert_eq!(extracted.len(), 1);
    assert_eq!(std::fs::read(&extracted[0]).unwrap(), png);

    let report = String::from_utf8(lines).unwrap();
    assert!(report.contains(&format!(
        "Picture extracted in: \"{}\"",
        extracted[0].display()
    )));

    // a missing file is an I/O error rather than a decoding error
    assert_eq!(
        dump_file(
            dir.path().join("missing.flac"),
            &mut Vec::<u8>::new(),
            &mut MemorySink::default()
        )
        .unwrap_err()
        .kind(),
        flac_dump::ErrorKind::Io
    );
}
