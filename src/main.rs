// Copyright 2025 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use clap::Parser;
use flac_dump::report::dump_file;
use flac_dump::sink::TempFileSink;
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;

/// Dumps the metadata blocks of FLAC files
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// FLAC files to dump
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory to extract PICTURE data to
    /// (defaults to the system's temp directory)
    #[arg(short = 'x', long, value_name = "DIR")]
    extract_dir: Option<PathBuf>,

    /// Increase log verbosity (may be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG, if set, overrides our verbosity
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let mut sink = match &cli.extract_dir {
        Some(dir) => TempFileSink::in_dir(dir),
        None => TempFileSink::new(),
    };

    let mut stdout = std::io::stdout().lock();
    let mut failed = false;

    for path in &cli.files {
        if let Err(err) = dump_file(path, &mut stdout, &mut sink) {
            eprintln!("* {}: {err}", path.display());
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
