//! Renderer module
//!
//! Renders a frozen `RecordTable` as picker lines or JSON Lines.
//!
//! A picker line is `path<D>address<D>display`. The display field is assembled
//! as plain segments first (padding and truncation included) and only then
//! decorated, so color never touches the delimiter or the prefix.

use colored::Colorize;
use std::io::Write;

use crate::core::builder::{Extents, RecordTable};
use crate::core::model::{Layout, ResolvedRecord};
use crate::core::util::{elide_left, pad_to, truncate_right, CONTINUATION_MARKER};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Picker,
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "picker" => Ok(OutputFormat::Picker),
            "jsonl" => Ok(OutputFormat::Jsonl),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Separator between the machine-readable fields of a picker line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Tab,
    Nul,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Tab => '\t',
            Delimiter::Nul => '\0',
        }
    }
}

impl std::str::FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tab" => Ok(Delimiter::Tab),
            "nul" | "null" | "zero" => Ok(Delimiter::Nul),
            _ => Err(format!("Unknown delimiter: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub delimiter: Delimiter,
    pub color: bool,
}

impl RenderConfig {
    pub fn new(format: OutputFormat, delimiter: Delimiter, color: bool) -> Self {
        Self {
            format,
            delimiter,
            color,
        }
    }

    /// Plain picker lines with tab delimiters
    #[allow(dead_code)]
    pub fn plain() -> Self {
        Self::default()
    }
}

/// Role of a display segment, mapped to a color when decorating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain,
    Kind,
    Path,
    Marker,
    Line,
    Bar,
    Comment,
}

struct Segment {
    style: Style,
    text: String,
}

impl Segment {
    fn new(style: Style, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    fn decorate(&self) -> String {
        if self.text.is_empty() {
            return String::new();
        }
        match self.style {
            Style::Plain => self.text.clone(),
            Style::Kind => self.text.magenta().bold().to_string(),
            Style::Path => self.text.blue().bold().to_string(),
            Style::Marker => self.text.cyan().bold().to_string(),
            Style::Line | Style::Comment => self.text.green().to_string(),
            Style::Bar => self.text.white().to_string(),
        }
    }
}

/// Renders records against frozen extents
pub struct Formatter {
    layout: Layout,
    extents: Extents,
    config: RenderConfig,
}

impl Formatter {
    pub fn new(layout: Layout, extents: Extents, config: RenderConfig) -> Self {
        Self {
            layout,
            extents,
            config,
        }
    }

    pub fn for_table(table: &RecordTable, config: RenderConfig) -> Self {
        Self::new(table.layout, table.extents, config)
    }

    /// The human-readable field of a picker line
    pub fn display(&self, record: &ResolvedRecord) -> String {
        let segments = match self.layout {
            Layout::Search => self.search_segments(record),
            Layout::Listing => self.listing_segments(record),
            Layout::Location => self.location_segments(record),
        };

        if self.config.color {
            segments.iter().map(Segment::decorate).collect()
        } else {
            segments.into_iter().map(|s| s.text).collect()
        }
    }

    /// A full picker line, without the trailing newline
    pub fn line(&self, record: &ResolvedRecord) -> String {
        let d = self.config.delimiter.as_char();
        format!("{}{d}{}{d}{}", record.path, record.address, self.display(record))
    }

    /// Write every record of the table, one per line
    pub fn write_table<W: Write>(&self, table: &RecordTable, mut writer: W) -> std::io::Result<()> {
        for record in &table.records {
            match self.config.format {
                OutputFormat::Picker => {
                    if self.config.delimiter == Delimiter::Tab && record.address.contains('\t') {
                        log::warn!(
                            "Address of {:?} in {} contains a tab; use --delimiter nul",
                            record.tag_name,
                            record.path
                        );
                    }
                    writeln!(writer, "{}", self.line(record))?;
                }
                OutputFormat::Jsonl => {
                    serde_json::to_writer(&mut writer, record)?;
                    writeln!(writer)?;
                }
            }
        }
        writer.flush()
    }

    /// Path column, left-elided and padded to `width`
    fn path_segments(&self, path: &str, width: usize, style: Style) -> Vec<Segment> {
        match elide_left(path, width) {
            Some(tail) => vec![
                Segment::new(Style::Marker, CONTINUATION_MARKER.to_string()),
                Segment::new(style, pad_to(&tail, width.saturating_sub(1))),
            ],
            None => vec![Segment::new(style, pad_to(path, width))],
        }
    }

    /// `[kind] path : code │ comment`
    fn search_segments(&self, record: &ResolvedRecord) -> Vec<Segment> {
        let mut segments = vec![
            Segment::new(
                Style::Kind,
                pad_to(&format!("[{}]", record.kind), self.extents.max_tag_len + 2),
            ),
            Segment::new(Style::Plain, " "),
        ];
        segments.extend(self.path_segments(&record.path, self.extents.max_path_len, Style::Path));
        segments.push(Segment::new(Style::Plain, " : "));

        if record.comment.is_empty() {
            segments.push(Segment::new(Style::Plain, record.code.clone()));
        } else {
            let width = self.extents.max_code_len;
            segments.push(Segment::new(
                Style::Plain,
                pad_to(&truncate_right(&record.code, width), width),
            ));
            segments.push(Segment::new(Style::Bar, " │ "));
            segments.push(Segment::new(Style::Comment, record.comment.clone()));
        }

        segments
    }

    /// `name |kind| comment`
    fn listing_segments(&self, record: &ResolvedRecord) -> Vec<Segment> {
        vec![
            Segment::new(
                Style::Plain,
                pad_to(&record.tag_name, self.extents.max_tag_len),
            ),
            Segment::new(Style::Plain, " "),
            Segment::new(Style::Bar, "|"),
            Segment::new(Style::Kind, record.kind.clone()),
            Segment::new(Style::Bar, "|"),
            Segment::new(Style::Plain, " "),
            Segment::new(Style::Comment, record.comment.clone()),
        ]
    }

    /// `path:line | text`
    fn location_segments(&self, record: &ResolvedRecord) -> Vec<Segment> {
        let width = self.extents.max_path_len;
        let location = format!("{}:{}", record.path, record.address);

        let (marker, kept, kept_width) = match elide_left(&location, width) {
            Some(tail) => (true, tail, width.saturating_sub(1)),
            None => (false, location, width),
        };
        let kept = pad_to(&kept, kept_width);

        let mut segments = Vec::new();
        if marker {
            segments.push(Segment::new(
                Style::Marker,
                CONTINUATION_MARKER.to_string(),
            ));
        }

        let suffix = format!(":{}", record.address);
        match kept.trim_end().strip_suffix(&suffix) {
            Some(path) => {
                let line_col = &kept[path.len() + 1..];
                segments.push(Segment::new(Style::Path, path));
                segments.push(Segment::new(Style::Plain, ":"));
                segments.push(Segment::new(Style::Line, line_col));
            }
            None => segments.push(Segment::new(Style::Line, kept.clone())),
        }

        segments.push(Segment::new(Style::Plain, " "));
        segments.push(Segment::new(Style::Bar, "|"));
        segments.push(Segment::new(Style::Plain, " "));
        segments.push(Segment::new(Style::Plain, record.code.clone()));
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::util::display_width;

    fn record(path: &str, address: &str, code: &str, kind: &str, comment: &str) -> ResolvedRecord {
        ResolvedRecord {
            tag_name: "foo".to_string(),
            path: path.to_string(),
            address: address.to_string(),
            line: address.parse().ok(),
            code: code.to_string(),
            kind: kind.to_string(),
            comment: comment.to_string(),
        }
    }

    fn extents(path: usize, code: usize, tag: usize) -> Extents {
        Extents {
            max_path_len: path,
            max_code_len: code,
            max_tag_len: tag,
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("picker".parse::<OutputFormat>().unwrap(), OutputFormat::Picker);
        assert_eq!("JSONL".parse::<OutputFormat>().unwrap(), OutputFormat::Jsonl);
        assert!("md".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_delimiter_parse() {
        assert_eq!("tab".parse::<Delimiter>().unwrap(), Delimiter::Tab);
        assert_eq!("NUL".parse::<Delimiter>().unwrap(), Delimiter::Nul);
        assert!("comma".parse::<Delimiter>().is_err());
    }

    #[test]
    fn test_search_display_plain() {
        let f = Formatter::new(Layout::Search, extents(6, 11, 1), RenderConfig::plain());
        let r = record("bar.c", "42", "int foo() {", "f", "some comment");
        assert_eq!(f.display(&r), "[f] bar.c  : int foo() { │ some comment");
    }

    #[test]
    fn test_search_display_without_comment() {
        let f = Formatter::new(Layout::Search, extents(5, 30, 1), RenderConfig::plain());
        let r = record("bar.c", "/^int foo() {$/", "int foo() {", "f", "");
        assert_eq!(f.display(&r), "[f] bar.c : int foo() {");
    }

    #[test]
    fn test_search_kind_column_aligned() {
        let f = Formatter::new(Layout::Search, extents(3, 1, 6), RenderConfig::plain());
        let short = f.display(&record("a.c", "1", "x", "f", ""));
        let long = f.display(&record("b.c", "2", "y", "member", ""));
        assert_eq!(short.find("a.c"), long.find("b.c"));
    }

    #[test]
    fn test_long_path_elided_from_left() {
        let path = "a/very/long/deeply/nested/path/that/exceeds/the/eighty/column/budget/for/sure/file.c";
        let f = Formatter::new(Layout::Search, extents(80, 1, 1), RenderConfig::plain());
        let display = f.display(&record(path, "3", "x", "f", ""));

        let column = &display["[f] ".len()..display.find(" : ").unwrap()];
        assert!(column.starts_with('<'));
        assert!(column.ends_with("file.c"));
        assert_eq!(display_width(column), 80);
    }

    #[test]
    fn test_machine_prefix_round_trip() {
        for delimiter in [Delimiter::Tab, Delimiter::Nul] {
            let config = RenderConfig::new(OutputFormat::Picker, delimiter, true);
            let f = Formatter::new(Layout::Search, extents(10, 20, 1), config);
            let r = record("src/a b.c", "/^int foo() {$/", "int foo() {", "f", "c");

            let line = f.line(&r);
            let fields: Vec<&str> = line.splitn(3, delimiter.as_char()).collect();
            assert_eq!(fields[0], "src/a b.c");
            assert_eq!(fields[1], "/^int foo() {$/");
        }
    }

    #[test]
    fn test_color_wraps_fields() {
        colored::control::set_override(true);
        let config = RenderConfig::new(OutputFormat::Picker, Delimiter::Tab, true);
        let f = Formatter::new(Layout::Search, extents(5, 11, 1), config);
        let r = record("bar.c", "42", "int foo() {", "f", "some comment");

        let display = f.display(&r);
        assert!(display.contains('\u{1b}'));
        assert!(display.contains("bar.c"));
        assert!(!display.contains('\t'));

        let line = f.line(&r);
        assert!(line.starts_with("bar.c\t42\t"));
    }

    #[test]
    fn test_long_code_truncated_only_with_comment() {
        let f = Formatter::new(Layout::Search, extents(3, 8, 1), RenderConfig::plain());
        let with_comment = f.display(&record("a.c", "1", "a rather long line", "f", "c"));
        assert!(with_comment.contains("a rathe… │ c"));

        let without = f.display(&record("a.c", "1", "a rather long line", "f", ""));
        assert!(without.ends_with("a rather long line"));
    }

    #[test]
    fn test_listing_display() {
        let f = Formatter::new(Layout::Listing, extents(4, 0, 6), RenderConfig::plain());
        let mut r = record("m.c", "3", "", "f", "signature:(void)");
        r.tag_name = "main".to_string();
        assert_eq!(f.display(&r), "main   |f| signature:(void)");
    }

    #[test]
    fn test_location_display() {
        let f = Formatter::new(Layout::Location, extents(10, 0, 0), RenderConfig::plain());
        let r = record("src/a.c", "12", "int foo(void)", "", "");
        assert_eq!(f.display(&r), "src/a.c:12 | int foo(void)");

        let r = record("a.c", "7", "x", "", "");
        assert_eq!(f.display(&r), "a.c:7      | x");
    }

    #[test]
    fn test_location_display_elided() {
        let f = Formatter::new(Layout::Location, extents(10, 0, 0), RenderConfig::plain());
        let r = record("deep/dir/file.c", "120", "x", "", "");
        assert_eq!(f.display(&r), "<ile.c:120 | x");
    }

    #[test]
    fn test_write_table_jsonl() {
        let table = RecordTable {
            layout: Layout::Search,
            extents: extents(5, 11, 1),
            records: vec![record("bar.c", "42", "int foo() {", "f", "")],
            skipped: 0,
            unresolved: 0,
            scans: 1,
        };
        let config = RenderConfig::new(OutputFormat::Jsonl, Delimiter::Tab, false);
        let mut buf = Vec::new();
        Formatter::for_table(&table, config)
            .write_table(&table, &mut buf)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["path"], "bar.c");
        assert_eq!(value["line"], 42);
        assert_eq!(value["code"], "int foo() {");
    }

    #[test]
    fn test_write_table_picker() {
        let table = RecordTable {
            layout: Layout::Search,
            extents: extents(5, 1, 1),
            records: vec![
                record("bar.c", "42", "x", "f", ""),
                record("baz.c", "7", "y", "v", ""),
            ],
            skipped: 0,
            unresolved: 0,
            scans: 1,
        };
        let config = RenderConfig::new(OutputFormat::Picker, Delimiter::Nul, false);
        let mut buf = Vec::new();
        Formatter::for_table(&table, config)
            .write_table(&table, &mut buf)
            .unwrap();

        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "bar.c\u{0}42\u{0}[f] bar.c : x");
    }
}
