//! Batch re-encoding: many files, one configuration.
//!
//! Files are decoded and re-encoded in parallel on the rayon global pool
//! (sized from `[processing] max_threads`, see [`crate::config::effective_threads`]).
//! Each file's result depends only on its own bytes and the shared
//! parameters; results are reported in input order regardless of which
//! worker finished first. One failing file never aborts the others.

use crate::data_uri::DataUriError;
use crate::imaging::{ImagingError, RasterBackend, Reencoded, Reencoder, SizeDelta};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoded payload unreadable: {0}")]
    Payload(#[from] DataUriError),
}

/// Outcome for one input file.
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub outcome: Result<Reencoded, ImagingError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &Reencoded> {
        self.items.iter().filter_map(|i| i.outcome.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &ImagingError)> {
        self.items
            .iter()
            .filter_map(|i| i.outcome.as_ref().err().map(|e| (i.path.as_path(), e)))
    }

    /// Combined size change over the successful files.
    pub fn total_delta(&self) -> SizeDelta {
        self.succeeded().fold(SizeDelta::new(0, 0), |acc, r| {
            SizeDelta::new(acc.original + r.source_size, acc.encoded + r.result.byte_size)
        })
    }
}

/// Re-encode every path in parallel.
pub fn reencode_files<B: RasterBackend>(reencoder: &Reencoder<'_, B>, paths: &[PathBuf]) -> BatchReport {
    let items = paths
        .par_iter()
        .map(|path| {
            let outcome = reencoder.run_file(path);
            if let Err(err) = &outcome {
                log::warn!("{}: {err}", path.display());
            }
            BatchItem {
                path: path.clone(),
                outcome,
            }
        })
        .collect();
    BatchReport { items }
}

/// Write every successful result into `out_dir`.
///
/// Existing files are never replaced. Output names that would collide, with
/// each other (`a.png` and `a.webp` both becoming `a.jpg`) or with a file
/// already in `out_dir` (the source itself, when writing next to it), get a
/// numeric suffix: `a.jpg`, `a-2.jpg`.
pub fn write_outputs(report: &BatchReport, out_dir: &Path) -> Result<Vec<PathBuf>, WriteError> {
    fs::create_dir_all(out_dir)?;
    let mut used = existing_names(out_dir)?;
    let mut written = Vec::new();
    for item in report.succeeded() {
        let name = unique_name(&item.output_name, &mut used);
        let target = out_dir.join(&name);
        fs::write(&target, item.result.bytes()?)?;
        log::debug!("wrote {}", target.display());
        written.push(target);
    }
    Ok(written)
}

fn existing_names(dir: &Path) -> Result<HashSet<String>, std::io::Error> {
    let mut names = HashSet::new();
    for entry in fs::read_dir(dir)? {
        names.insert(entry?.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (name, String::new()),
    };
    (2..)
        .map(|n| format!("{stem}-{n}{ext}"))
        .find(|candidate| used.insert(candidate.clone()))
        .unwrap_or_else(|| name.to_string())
}
