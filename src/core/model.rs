//! Tag record model
//!
//! Every index backend (tag file lookup, single-file listing, gtags query, stdin)
//! maps its output to `RawTagRecord` before the pipeline runs. The builder turns
//! those into `ResolvedRecord`s, which are the only thing the formatter sees.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::address::split_address_field;

/// Errors raised by the tag pipeline and its collaborators
#[derive(Debug, Error)]
pub enum TagError {
    #[error("malformed tag address: {address:?}")]
    MalformedAddress { address: String },

    #[error("malformed tag record: {line:?}")]
    MalformedRecord { line: String },

    #[error("source file unavailable: {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("tag index unreadable: {}", path.display())]
    IndexUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} is not installed or not on PATH")]
    ToolUnavailable { tool: String },

    #[error("picked line has no address field: {context:?}")]
    MalformedContext { context: String },
}

/// One tag as stored in the index, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTagRecord {
    pub tag_name: String,

    /// File path as found in the index (relative to the index directory, or absolute)
    pub file_path: String,

    /// Address token exactly as stored (`42`, `/^int foo() {$/`)
    pub address_field: String,

    /// Everything after the `;"` marker (kind and comment), or the text column
    /// of a location-style index
    pub trailing: String,
}

impl RawTagRecord {
    pub fn new(
        tag_name: impl Into<String>,
        file_path: impl Into<String>,
        address_field: impl Into<String>,
        trailing: impl Into<String>,
    ) -> Self {
        Self {
            tag_name: tag_name.into(),
            file_path: file_path.into(),
            address_field: address_field.into(),
            trailing: trailing.into(),
        }
    }

    /// Parse a ctags line: `name<TAB>file<TAB>address;"<TAB>kind<TAB>comment`
    pub fn parse_line(line: &str) -> Result<Self, TagError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut fields = line.splitn(3, '\t');

        match (fields.next(), fields.next(), fields.next()) {
            (Some(name), Some(file), Some(rest)) if !name.is_empty() && !file.is_empty() => {
                let (address, trailing) = split_address_field(rest);
                Ok(Self::new(name, file, address, trailing))
            }
            _ => Err(TagError::MalformedRecord {
                line: line.to_string(),
            }),
        }
    }

    /// Split the trailing field into `(kind, comment)`
    ///
    /// The kind is the first tab-separated token (an extended `kind:` prefix is
    /// dropped); the comment is whatever follows it. Both may be empty.
    pub fn kind_and_comment(&self) -> (String, String) {
        let trailing = self.trailing.trim();
        let (kind, comment) = trailing.split_once('\t').unwrap_or((trailing, ""));
        let kind = kind.strip_prefix("kind:").unwrap_or(kind);
        (kind.to_string(), comment.trim().to_string())
    }
}

/// A decoded tag address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAddress {
    /// 1-based line number
    LineNumber(u32),
    /// Literal line content embedded in a search pattern, delimiters stripped
    Pattern(String),
}

/// Display shape of the rendered lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Exact-name search: aligned by path, shows the resolved code line
    #[default]
    Search,
    /// Whole-file listing: aligned by tag name
    Listing,
    /// `path:line` locations with text supplied by the index (gtags)
    Location,
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "search" => Ok(Layout::Search),
            "listing" | "list" => Ok(Layout::Listing),
            "location" | "gtags" => Ok(Layout::Location),
            _ => Err(format!("Unknown layout: {}", s)),
        }
    }
}

/// A record ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRecord {
    pub tag_name: String,

    /// Path relative to the current directory, using '/' as separator
    pub path: String,

    /// The untouched address token from the index
    pub address: String,

    /// Line number when the address is numeric
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Resolved source line, pattern excerpt, or index-supplied text
    pub code: String,

    pub kind: String,

    pub comment: String,
}
