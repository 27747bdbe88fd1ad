// Copyright 2025 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! For storing the binary data of PICTURE blocks
//!
//! Decoding a [`Picture`] has no side effects;
//! its data is only written somewhere once it's
//! handed to a [`PayloadSink`].

use crate::metadata::Picture;
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Somewhere to store picture payloads
pub trait PayloadSink {
    /// A reference to a stored payload, suitable for reporting
    type Location: std::fmt::Display;

    /// Stores picture's data and returns where it went
    ///
    /// # Errors
    ///
    /// Passes along any I/O error from acquiring
    /// or writing to the storage resource.
    fn store(&mut self, picture: &Picture) -> std::io::Result<Self::Location>;
}

impl<P: PayloadSink + ?Sized> PayloadSink for &mut P {
    type Location = P::Location;

    fn store(&mut self, picture: &Picture) -> std::io::Result<Self::Location> {
        (**self).store(picture)
    }
}

/// Writes each payload to its own uniquely-named file
///
/// Files are named `flac-picture-XXXX.ext` where `XXXX`
/// is random and `ext` comes from the picture's media type.
/// Files are kept after the sink is dropped.
///
/// # Example
/// ```
/// use flac_dump::metadata::{Picture, PictureType};
/// use flac_dump::sink::{PayloadSink, TempFileSink};
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut sink = TempFileSink::in_dir(dir.path());
///
/// let stored = sink
///     .store(&Picture {
///         picture_type: PictureType::FrontCover,
///         media_type: "image/png".to_owned(),
///         description: String::new(),
///         width: 1,
///         height: 1,
///         color_depth: 24,
///         colors_used: 0,
///         data: vec![1, 2, 3],
///     })
///     .unwrap();
///
/// let path = stored.into_path_buf();
/// assert!(path.starts_with(dir.path()));
/// assert_eq!(path.extension().unwrap(), "png");
/// assert_eq!(std::fs::read(&path).unwrap(), [1, 2, 3]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TempFileSink {
    dir: Option<PathBuf>,
}

impl TempFileSink {
    /// Writes payloads to the system's temporary directory
    pub fn new() -> Self {
        Self { dir: None }
    }

    /// Writes payloads to the given directory
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: Some(dir.as_ref().to_path_buf()),
        }
    }
}

impl PayloadSink for TempFileSink {
    type Location = StoredFile;

    fn store(&mut self, picture: &Picture) -> std::io::Result<StoredFile> {
        let suffix = format!(".{}", picture.file_extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix("flac-picture-").suffix(&suffix);

        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(&picture.data)?;
        file.flush()?;

        // dropping the handle closes the file but leaves it on disk
        let (_, path) = file.keep().map_err(|err| err.error)?;

        info!(
            "stored {} byte {} picture to {}",
            picture.data.len(),
            picture.media_type,
            path.display()
        );

        Ok(StoredFile(path))
    }
}

/// The path of a payload written by [`TempFileSink`]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StoredFile(PathBuf);

impl StoredFile {
    /// Our path on disk
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Converts us into an owned path
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for StoredFile {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for StoredFile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.display().fmt(f)
    }
}

/// Keeps each payload in memory
///
/// Locations are indexes into `pictures`.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Payloads in the order they were stored
    pub pictures: Vec<Vec<u8>>,
}

impl PayloadSink for MemorySink {
    type Location = usize;

    fn store(&mut self, picture: &Picture) -> std::io::Result<usize> {
        self.pictures.push(picture.data.clone());
        Ok(self.pictures.len() - 1)
    }
}
