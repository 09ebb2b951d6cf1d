// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Collection of all timing files in a results directory.

use crate::parser::{self, TIMING_SUFFIX};
use amx_perf_core::ResultBatch;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// List the timing files of a directory, sorted by file name.
///
/// Only entries whose name ends in `.ssv` are returned. The order is the
/// byte-wise ascending order of file names, independent of how the
/// filesystem happens to list them. Names that are not valid UTF-8 are kept
/// so the parser can report them.
pub fn candidate_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut names: Vec<OsString> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name())
        .filter(|name| name.as_encoded_bytes().ends_with(TIMING_SUFFIX.as_bytes()))
        .collect();
    names.sort();

    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}

/// Parse every timing file in `dir` into a batch.
///
/// A missing or unreadable directory yields an empty batch. Files that fail
/// to parse are left out; the parser has already logged why.
pub fn collect(dir: &Path) -> ResultBatch {
    if !dir.exists() {
        warn!("Results directory '{}' not found!", dir.display());
        return ResultBatch::new();
    }

    let files = match candidate_files(dir) {
        Ok(files) => files,
        Err(err) => {
            warn!("Cannot list results directory '{}': {}", dir.display(), err);
            return ResultBatch::new();
        }
    };

    info!("Found {} {} files in {}/", files.len(), TIMING_SUFFIX, dir.display());

    let batch: ResultBatch = files
        .iter()
        .filter_map(|path| {
            debug!("Parsing {}", path.display());
            parser::parse(path)
        })
        .map(|parsed| parsed.record)
        .collect();

    info!("Successfully parsed {} result files", batch.len());
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn labels(batch: &ResultBatch) -> Vec<String> {
        batch.iter().map(|r| r.dims().label()).collect()
    }

    #[test]
    fn test_missing_directory_is_empty_batch() {
        let dir = TempDir::new().unwrap();
        let batch = collect(&dir.path().join("does-not-exist"));
        assert!(batch.is_empty());
    }

    #[test]
    fn test_file_instead_of_directory_is_empty_batch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results");
        fs::write(&path, "not a directory").unwrap();

        assert!(collect(&path).is_empty());
    }

    #[test]
    fn test_candidates_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in [
            "times_64x64x64.ssv",
            "notes.txt",
            "times_1024x1024x1024.ssv",
            "times_128x128x128.ssv",
            "times_128x128x128.ssv.bak",
        ] {
            fs::write(dir.path().join(name), "1.0\n").unwrap();
        }

        let names: Vec<String> = candidate_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        // Lexicographic, not numeric
        assert_eq!(
            names,
            vec![
                "times_1024x1024x1024.ssv",
                "times_128x128x128.ssv",
                "times_64x64x64.ssv",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_reach_the_parser() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"times_\xff4x4x4.ssv");
        if fs::write(dir.path().join(name), "1.0\n").is_err() {
            // Filesystem refuses non-UTF-8 names
            return;
        }
        fs::write(dir.path().join("times_2x2x2.ssv"), "1.0\n").unwrap();

        let files = candidate_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|p| p.file_name() == Some(name)));

        let batch = collect(dir.path());
        assert_eq!(labels(&batch), vec!["2x2x2"]);
    }

    #[test]
    fn test_collect_skips_unparseable_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("times_32x32x32.ssv"), "2.0\n4.0\n").unwrap();
        fs::write(dir.path().join("times_16x16x16.ssv"), "junk\n").unwrap();
        fs::write(dir.path().join("bogus.ssv"), "1.0\n").unwrap();
        fs::write(dir.path().join("times_8x8x8.ssv"), "0.5\n").unwrap();

        let batch = collect(dir.path());

        assert_eq!(labels(&batch), vec!["32x32x32", "8x8x8"]);
        assert!((batch.records()[0].avg_time_ms() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_collect_is_deterministic() {
        let dir = TempDir::new().unwrap();
        for (name, time) in [
            ("times_256x256x256.ssv", "5.0"),
            ("times_2x2x2.ssv", "0.1"),
            ("times_64x32x16.ssv", "0.7"),
        ] {
            fs::write(dir.path().join(name), time).unwrap();
        }

        let first = collect(dir.path());
        let second = collect(dir.path());

        assert_eq!(first, second);
        assert_eq!(labels(&first), vec!["256x256x256", "2x2x2", "64x32x16"]);
    }
}
