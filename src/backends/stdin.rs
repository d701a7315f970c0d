//! Raw tag lines from stdin
//!
//! Lets any upstream query (`readtags`, `look`, `grep` over a tag file,
//! `global --result=grep`) feed the pipeline directly.

use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::Path;

use crate::backends::gtags::parse_grep_output;
use crate::core::model::{Layout, RawTagRecord};
use crate::core::paths::absolutize;
use crate::core::pipeline::{emit, PipelineConfig};

/// Parse raw lines for `layout`; malformed lines are logged and skipped
pub fn read_records<R: BufRead>(mut reader: R, layout: Layout) -> Result<Vec<RawTagRecord>> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .context("Failed to read tag lines from stdin")?;
    let input = String::from_utf8_lossy(&bytes);

    if layout == Layout::Location {
        return Ok(parse_grep_output(&input, ""));
    }

    Ok(input
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("!_"))
        .filter_map(|line| match RawTagRecord::parse_line(line) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping input line: {}", e);
                None
            }
        })
        .collect())
}

/// Run the render command
pub fn run_render(layout: Layout, base_dir: Option<&Path>, config: &PipelineConfig) -> Result<()> {
    let index_dir = match base_dir {
        Some(dir) => absolutize(dir, &config.cwd),
        None => config.cwd.clone(),
    };

    let stdin = std::io::stdin();
    let records = read_records(stdin.lock(), layout)?;

    emit(records, config.context(layout, &index_dir), config.render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_ctags_lines() {
        let input = "!_TAG_FILE_SORTED\t1\t//\nfoo\tbar.c\t42;\"\tf\n\nbroken line\nfoo\tbaz.c\t/^x$/;\"\tv\n";
        let records = read_records(Cursor::new(input), Layout::Search).unwrap();
        let files: Vec<_> = records.iter().map(|r| r.file_path.as_str()).collect();
        assert_eq!(files, vec!["bar.c", "baz.c"]);
    }

    #[test]
    fn test_read_location_lines() {
        let records = read_records(Cursor::new("a.c:3:int x;\n"), Layout::Location).unwrap();
        assert_eq!(records[0].address_field, "3");
        assert_eq!(records[0].trailing, "int x;");
    }
}
