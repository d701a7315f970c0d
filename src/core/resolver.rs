//! Line resolution
//!
//! Line-number addresses are collected per source file first, then every file
//! is read once, front to back, stopping at the highest requested line. Cost is
//! O(max requested line) per file no matter how many tags point into it.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::core::model::TagError;

/// Requested lines of one run, keyed by source file then line number
///
/// A slot stays `None` until its file is scanned, and afterwards if the file
/// is shorter than the requested line or could not be read.
#[derive(Debug, Default)]
pub struct PendingResolution {
    files: BTreeMap<PathBuf, BTreeMap<u32, Option<String>>>,
    scans: usize,
}

impl PendingResolution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `line` of `path` for resolution; duplicates collapse
    pub fn request(&mut self, path: &Path, line: u32) {
        self.files
            .entry(path.to_path_buf())
            .or_default()
            .entry(line)
            .or_insert(None);
    }

    /// Number of distinct files with pending lines
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of file scans performed so far
    pub fn scans(&self) -> usize {
        self.scans
    }

    /// Resolved content of `line` in `path`, if it was found
    pub fn get(&self, path: &Path, line: u32) -> Option<&str> {
        self.files.get(path)?.get(&line)?.as_deref()
    }

    /// Scan every file that still has unresolved lines, once each
    ///
    /// Files that cannot be opened or read are reported and left unresolved;
    /// the remaining files are still scanned.
    pub fn resolve_all(&mut self) -> Vec<TagError> {
        let mut failures = Vec::new();

        for (path, wanted) in self.files.iter_mut() {
            if wanted.values().all(Option::is_some) {
                continue;
            }

            self.scans += 1;
            match scan_file(path, wanted) {
                Ok(lines_read) => {
                    log::debug!(
                        "Scanned {} ({} lines read, {} requested)",
                        path.display(),
                        lines_read,
                        wanted.len()
                    );
                }
                Err(source) => failures.push(TagError::SourceUnavailable {
                    path: path.clone(),
                    source,
                }),
            }
        }

        failures
    }
}

/// Open `path`, fill `wanted` in a single forward pass, close it
fn scan_file(path: &Path, wanted: &mut BTreeMap<u32, Option<String>>) -> std::io::Result<u32> {
    let file = File::open(path)?;
    scan_lines(BufReader::new(file), wanted)
}

/// Walk `reader` line by line, capturing every requested line number
///
/// Returns the number of lines consumed. Stops after the highest requested
/// line, or at end of input if the file is shorter.
fn scan_lines<R: BufRead>(
    mut reader: R,
    wanted: &mut BTreeMap<u32, Option<String>>,
) -> std::io::Result<u32> {
    let mut targets = wanted.iter_mut().peekable();
    let mut buf = Vec::new();
    let mut line_no = 0u32;

    loop {
        let target = match targets.peek() {
            Some((line, _)) => **line,
            None => break,
        };

        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        if line_no == target {
            if let Some((_, slot)) = targets.next() {
                *slot = Some(String::from_utf8_lossy(&buf).trim_end().to_string());
            }
        }
    }

    Ok(line_no)
}
