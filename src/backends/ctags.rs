//! ctags integration
//!
//! Two entry points:
//! - `search`: exact-name lookup in an existing tag file
//! - `list`: every tag of one source file, via `ctags -f - --excmd=number`

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::Command;

use crate::core::model::{Layout, RawTagRecord, TagError};
use crate::core::paths::absolutize;
use crate::core::pipeline::{emit, PipelineConfig};
use crate::core::util::command_exists;

/// Ordering declared by the `!_TAG_FILE_SORTED` pseudo-tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortOrder {
    Unsorted,
    Sorted,
    FoldCase,
}

impl SortOrder {
    fn from_pseudo_tag(line: &str) -> Option<Self> {
        let value = line.strip_prefix("!_TAG_FILE_SORTED\t")?;
        match value.split('\t').next() {
            Some("1") => Some(SortOrder::Sorted),
            Some("2") => Some(SortOrder::FoldCase),
            _ => Some(SortOrder::Unsorted),
        }
    }

    /// True once `candidate` sorts after `name`, so no later line can match
    ///
    /// Case-folded files are ordered by ASCII upper case, which puts `_` and
    /// `[\]^` after the letters.
    fn is_past(&self, candidate: &str, name: &str) -> bool {
        match self {
            SortOrder::Unsorted => false,
            SortOrder::Sorted => candidate.as_bytes() > name.as_bytes(),
            SortOrder::FoldCase => candidate
                .bytes()
                .map(|b| b.to_ascii_uppercase())
                .gt(name.bytes().map(|b| b.to_ascii_uppercase())),
        }
    }
}

/// Check if ctags is available
pub fn is_ctags_available() -> bool {
    command_exists("ctags")
}

/// Find every tag named exactly `name` in `tag_file`, in file order
pub fn lookup(tag_file: &Path, name: &str) -> Result<Vec<RawTagRecord>, TagError> {
    let unreadable = |source: std::io::Error| TagError::IndexUnreadable {
        path: tag_file.to_path_buf(),
        source,
    };

    let file = File::open(tag_file).map_err(unreadable)?;
    lookup_in(BufReader::new(file), name).map_err(unreadable)
}

fn lookup_in<R: BufRead>(reader: R, name: &str) -> std::io::Result<Vec<RawTagRecord>> {
    let mut order = SortOrder::Unsorted;
    let mut records = Vec::new();

    for chunk in reader.split(b'\n') {
        let chunk = chunk?;
        let line = String::from_utf8_lossy(&chunk);

        if line.starts_with("!_") {
            if let Some(declared) = SortOrder::from_pseudo_tag(&line) {
                order = declared;
            }
            continue;
        }

        let tag_name = line.split('\t').next().unwrap_or("");
        if tag_name != name {
            if order.is_past(tag_name, name) {
                break;
            }
            continue;
        }

        match RawTagRecord::parse_line(&line) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping line in tag file: {}", e),
        }
    }

    Ok(records)
}

/// Run the search command
pub fn run_search(name: &str, tag_file: &Path, config: &PipelineConfig) -> Result<()> {
    let tag_file = absolutize(tag_file, &config.cwd);
    let index_dir = tag_file
        .parent()
        .unwrap_or(config.cwd.as_path())
        .to_path_buf();

    let records = lookup(&tag_file, name)?;
    log::debug!(
        "{} matches for {:?} in {}",
        records.len(),
        name,
        tag_file.display()
    );

    emit(
        records,
        config.context(Layout::Search, &index_dir),
        config.render,
    )
}

/// Parse `ctags -f -` output into raw records, keeping generator order
pub fn parse_listing(stdout: &str) -> Vec<RawTagRecord> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("!_"))
        .filter_map(|line| match RawTagRecord::parse_line(line) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping ctags output line: {}", e);
                None
            }
        })
        .collect()
}

/// Run ctags on a single file and collect its tags
pub fn list_file(file: &Path) -> Result<Vec<RawTagRecord>> {
    if !is_ctags_available() {
        return Err(TagError::ToolUnavailable {
            tool: "ctags".to_string(),
        }
        .into());
    }

    let output = Command::new("ctags")
        .arg("-f")
        .arg("-")
        .arg("--excmd=number")
        .arg(file)
        .output()
        .with_context(|| format!("Failed to run ctags on {}", file.display()))?;

    if !output.status.success() {
        bail!(
            "ctags failed on {}: {}",
            file.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(parse_listing(&String::from_utf8_lossy(&output.stdout)))
}

/// Run the list command
pub fn run_list(file: &Path, config: &PipelineConfig) -> Result<()> {
    let records = list_file(file)?;
    emit(
        records,
        config.context(Layout::Listing, &config.cwd),
        config.render,
    )
}
