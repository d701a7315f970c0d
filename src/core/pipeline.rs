//! Pipeline - raw records in, rendered lines out
//!
//! Every command funnels its raw records through `emit`, which runs the
//! collect stage to completion before the first line is written.

use anyhow::{Context, Result};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::core::builder::{BuildContext, RecordBuilder, RecordTable};
use crate::core::model::{Layout, RawTagRecord};
use crate::core::render::{Formatter, RenderConfig};

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub render: RenderConfig,
    pub max_path_width: usize,
    pub max_code_width: usize,
    /// Directory display paths are made relative to
    pub cwd: PathBuf,
}

impl PipelineConfig {
    /// Build context for an index whose paths are relative to `index_dir`
    pub fn context(&self, layout: Layout, index_dir: &Path) -> BuildContext {
        BuildContext::new(layout, index_dir, &self.cwd)
            .with_widths(self.max_path_width, self.max_code_width)
    }
}

/// Resolve `records` and freeze the table
pub fn collect(records: impl IntoIterator<Item = RawTagRecord>, ctx: BuildContext) -> RecordTable {
    let mut builder = RecordBuilder::new(ctx);
    builder.extend(records);
    builder.finish()
}

/// Render a frozen table to `writer`
///
/// A reader that goes away early (the picker exited) ends output quietly.
pub fn write<W: Write>(table: &RecordTable, config: RenderConfig, writer: W) -> Result<()> {
    match Formatter::for_table(table, config).write_table(table, writer) {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            log::debug!("Output closed early");
            Ok(())
        }
        other => other.context("Failed to write results"),
    }
}

/// Collect, then render to stdout
pub fn emit(
    records: impl IntoIterator<Item = RawTagRecord>,
    ctx: BuildContext,
    config: RenderConfig,
) -> Result<()> {
    let table = collect(records, ctx);

    log::info!(
        "{} records ({} skipped, {} lines unresolved, {} source files read)",
        table.records.len(),
        table.skipped,
        table.unresolved,
        table.scans
    );

    if table.is_empty() {
        log::info!("No matches");
        return Ok(());
    }

    let stdout = std::io::stdout();
    write(&table, config, BufWriter::new(stdout.lock()))
}
