//! Record building
//!
//! Two stages: `push` parses every raw record, queues line lookups and grows
//! the column extents; `finish` resolves all queued lines (one scan per file)
//! and freezes the extents. Nothing can be rendered before `finish` returns.

use std::path::PathBuf;

use crate::core::address::parse_address;
use crate::core::model::{Layout, RawTagRecord, ResolvedRecord, TagAddress};
use crate::core::paths::resolve_index_path;
use crate::core::resolver::PendingResolution;
use crate::core::util::display_width;

/// Default cap for the path column, in display columns
pub const DEFAULT_MAX_PATH_WIDTH: usize = 80;

/// Default cap for the code column, in display columns
pub const DEFAULT_MAX_CODE_WIDTH: usize = 60;

/// Where index paths are anchored and how wide columns may grow
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub layout: Layout,

    /// Directory index paths are relative to (the tag file's directory)
    pub index_dir: PathBuf,

    /// Directory display paths are relative to
    pub cwd: PathBuf,

    pub max_path_width: usize,

    pub max_code_width: usize,
}

impl BuildContext {
    pub fn new(layout: Layout, index_dir: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            layout,
            index_dir: index_dir.into(),
            cwd: cwd.into(),
            max_path_width: DEFAULT_MAX_PATH_WIDTH,
            max_code_width: DEFAULT_MAX_CODE_WIDTH,
        }
    }

    pub fn with_widths(mut self, max_path_width: usize, max_code_width: usize) -> Self {
        self.max_path_width = max_path_width.max(1);
        self.max_code_width = max_code_width.max(1);
        self
    }
}

/// Column widths over the whole result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extents {
    /// Path column (`path:line` in location layout), capped
    pub max_path_len: usize,
    /// Code column, capped
    pub max_code_len: usize,
    /// Kind column in search layout, tag name column in listing layout
    pub max_tag_len: usize,
}

/// The frozen output of a build
#[derive(Debug, Clone)]
pub struct RecordTable {
    pub layout: Layout,
    pub extents: Extents,
    pub records: Vec<ResolvedRecord>,
    /// Raw records dropped for a malformed address
    pub skipped: usize,
    /// Line-number addresses that could not be resolved
    pub unresolved: usize,
    /// File scans performed during resolution
    pub scans: usize,
}

impl RecordTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct Entry {
    raw: RawTagRecord,
    address: TagAddress,
    source: PathBuf,
    path: String,
}

/// Accumulates raw records in index order
pub struct RecordBuilder {
    ctx: BuildContext,
    entries: Vec<Entry>,
    pending: PendingResolution,
    extents: Extents,
    skipped: usize,
}

impl RecordBuilder {
    pub fn new(ctx: BuildContext) -> Self {
        Self {
            ctx,
            entries: Vec::new(),
            pending: PendingResolution::new(),
            extents: Extents::default(),
            skipped: 0,
        }
    }

    /// Add one raw record; malformed addresses are logged and skipped
    pub fn push(&mut self, raw: RawTagRecord) {
        let address = match parse_address(&raw.address_field) {
            Ok(address) => address,
            Err(e) => {
                log::warn!("Skipping tag {:?} in {}: {}", raw.tag_name, raw.file_path, e);
                self.skipped += 1;
                return;
            }
        };

        let (source, path) = resolve_index_path(&raw.file_path, &self.ctx.index_dir, &self.ctx.cwd);

        let path_len = match self.ctx.layout {
            Layout::Location => display_width(&path) + 1 + display_width(&raw.address_field),
            Layout::Search | Layout::Listing => display_width(&path),
        };
        self.extents.max_path_len = self
            .extents
            .max_path_len
            .max(path_len.min(self.ctx.max_path_width));

        let tag_len = match self.ctx.layout {
            Layout::Search => display_width(&raw.kind_and_comment().0),
            Layout::Listing => display_width(&raw.tag_name),
            Layout::Location => 0,
        };
        self.extents.max_tag_len = self.extents.max_tag_len.max(tag_len);

        if let (Layout::Search, TagAddress::LineNumber(line)) = (self.ctx.layout, &address) {
            self.pending.request(&source, *line);
        }

        self.entries.push(Entry {
            raw,
            address,
            source,
            path,
        });
    }

    pub fn extend(&mut self, raws: impl IntoIterator<Item = RawTagRecord>) {
        for raw in raws {
            self.push(raw);
        }
    }

    /// Resolve queued lines and freeze the extents
    pub fn finish(mut self) -> RecordTable {
        log::debug!(
            "Resolving {} records across {} source files",
            self.entries.len(),
            self.pending.file_count()
        );
        for failure in self.pending.resolve_all() {
            log::warn!("{}", failure);
        }

        let mut extents = self.extents;
        let mut unresolved = 0;
        let mut records = Vec::with_capacity(self.entries.len());

        for entry in self.entries {
            let line = match entry.address {
                TagAddress::LineNumber(n) => Some(n),
                TagAddress::Pattern(_) => None,
            };

            let code = match (self.ctx.layout, &entry.address) {
                (Layout::Location, _) => entry.raw.trailing.trim_end().to_string(),
                (_, TagAddress::Pattern(excerpt)) => excerpt.clone(),
                (Layout::Search, TagAddress::LineNumber(n)) => {
                    match self.pending.get(&entry.source, *n) {
                        Some(content) => content.to_string(),
                        None => {
                            log::warn!("Line {} not found in {}", n, entry.path);
                            unresolved += 1;
                            String::new()
                        }
                    }
                }
                (Layout::Listing, TagAddress::LineNumber(_)) => String::new(),
            };

            let (kind, comment) = match self.ctx.layout {
                Layout::Location => (String::new(), String::new()),
                Layout::Search | Layout::Listing => entry.raw.kind_and_comment(),
            };

            extents.max_code_len = extents
                .max_code_len
                .max(display_width(&code).min(self.ctx.max_code_width));

            records.push(ResolvedRecord {
                tag_name: entry.raw.tag_name,
                path: entry.path,
                address: entry.raw.address_field,
                line,
                code,
                kind,
                comment,
            });
        }

        log::debug!(
            "Built {} records ({} skipped, {} unresolved, {} file scans)",
            records.len(),
            self.skipped,
            unresolved,
            self.pending.scans()
        );

        RecordTable {
            layout: self.ctx.layout,
            extents,
            records,
            skipped: self.skipped,
            unresolved,
            scans: self.pending.scans(),
        }
    }
}
