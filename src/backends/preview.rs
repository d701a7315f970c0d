//! Editor preview bridge
//!
//! A picker hands back one rendered line. It is split into the
//! `(path, address, display)` triple and forwarded to a running Neovim as a
//! single `--remote-expr` call:
//!
//! ```text
//! neoview#run("<preview_fn>", "<path>\t<address>\t<display>")
//! ```
//!
//! Process arguments cannot hold NUL, so a NUL-delimited line has to arrive on
//! stdin (`CONTEXT` omitted or `-`).

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::process::Command;

use crate::core::model::TagError;
use crate::core::render::Delimiter;
use crate::core::util::command_exists;

/// Editor function that receives the preview request
pub const PREVIEW_ENTRY_POINT: &str = "neoview#run";

/// The location a picked line points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTriple {
    pub path: String,
    /// Raw address token (line number or pattern)
    pub address: String,
    /// Display text, may be empty
    pub display: String,
}

impl PreviewTriple {
    /// Split a picked line on `delimiter`
    pub fn parse(context: &str, delimiter: Delimiter) -> Result<Self, TagError> {
        let context = context.trim_end_matches(['\r', '\n']);
        let mut fields = context.splitn(3, delimiter.as_char());

        match (fields.next(), fields.next(), fields.next()) {
            (Some(path), Some(address), display) if !path.is_empty() && !address.is_empty() => {
                Ok(Self {
                    path: path.to_string(),
                    address: address.to_string(),
                    display: display.unwrap_or("").to_string(),
                })
            }
            _ => Err(TagError::MalformedContext {
                context: context.to_string(),
            }),
        }
    }

    /// Tab-joined context; editor strings cannot carry NUL
    pub fn context(&self) -> String {
        format!("{}\t{}\t{}", self.path, self.address, self.display)
    }

    /// The expression evaluated in the editor
    pub fn remote_expr(&self, preview_fn: &str) -> String {
        format!(
            "{}({}, {})",
            PREVIEW_ENTRY_POINT,
            vim_string(preview_fn),
            vim_string(&self.context())
        )
    }
}

/// Quote `s` as a double-quoted Vim string literal
pub fn vim_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{1b}' => out.push_str("\\e"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Read one picked line from `reader`, up to the first newline
pub fn read_context<R: Read>(mut reader: R) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .context("Failed to read picked line from stdin")?;
    let input = String::from_utf8_lossy(&bytes);
    Ok(input.lines().next().unwrap_or("").to_string())
}

/// Run the preview command; `None` or `-` reads the context from stdin
pub fn run_preview(
    preview_fn: &str,
    context: Option<&str>,
    server: Option<&str>,
    delimiter: Delimiter,
    dry_run: bool,
) -> Result<()> {
    let context = match context {
        Some(arg) if arg != "-" => arg.to_string(),
        _ => read_context(std::io::stdin().lock())?,
    };
    let triple = PreviewTriple::parse(&context, delimiter)?;
    let expr = triple.remote_expr(preview_fn);
    log::debug!("Preview {}:{} via {}", triple.path, triple.address, preview_fn);

    if dry_run {
        println!("{}", expr);
        return Ok(());
    }

    let server = match server {
        Some(addr) if !addr.is_empty() => addr,
        _ => bail!("No editor server address: pass --server or set NVIM_LISTEN_ADDRESS"),
    };

    if !command_exists("nvim") {
        return Err(TagError::ToolUnavailable {
            tool: "nvim".to_string(),
        }
        .into());
    }

    let output = Command::new("nvim")
        .arg("--server")
        .arg(server)
        .arg("--remote-expr")
        .arg(&expr)
        .output()
        .context("Failed to run nvim")?;

    if !output.status.success() {
        bail!(
            "Editor at {} rejected preview request: {}",
            server,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_tab_line() {
        let triple =
            PreviewTriple::parse("src/bar.c\t42\t[f] src/bar.c : int foo() {\n", Delimiter::Tab)
                .unwrap();
        assert_eq!(triple.path, "src/bar.c");
        assert_eq!(triple.address, "42");
        assert_eq!(triple.display, "[f] src/bar.c : int foo() {");
    }

    #[test]
    fn test_parse_nul_line_keeps_tabs_in_address() {
        let triple =
            PreviewTriple::parse("a.c\0/^\tint x;$/\0display", Delimiter::Nul).unwrap();
        assert_eq!(triple.address, "/^\tint x;$/");
        assert_eq!(triple.display, "display");
    }

    #[test]
    fn test_parse_without_display() {
        let triple = PreviewTriple::parse("a.c\t7", Delimiter::Tab).unwrap();
        assert_eq!(triple.display, "");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            PreviewTriple::parse("just a path", Delimiter::Tab),
            Err(TagError::MalformedContext { .. })
        ));
        assert!(PreviewTriple::parse("\t12\tx", Delimiter::Tab).is_err());
    }

    #[test]
    fn test_vim_string_escapes() {
        assert_eq!(vim_string("plain"), "\"plain\"");
        assert_eq!(vim_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(vim_string("x\ty\u{1b}[0m"), "\"x\\ty\\e[0m\"");
    }

    #[test]
    fn test_remote_expr() {
        let triple = PreviewTriple {
            path: "bar.c".to_string(),
            address: "42".to_string(),
            display: "[f] bar.c : int foo() {".to_string(),
        };
        assert_eq!(
            triple.remote_expr("neoview#tags#preview"),
            "neoview#run(\"neoview#tags#preview\", \"bar.c\\t42\\t[f] bar.c : int foo() {\")"
        );
    }

    #[test]
    fn test_read_context_keeps_nul_fields() {
        let input = b"a.c\0/^\tint x;$/\0shown\nignored\n".to_vec();
        let line = read_context(Cursor::new(input)).unwrap();
        let triple = PreviewTriple::parse(&line, Delimiter::Nul).unwrap();
        assert_eq!(triple.path, "a.c");
        assert_eq!(triple.address, "/^\tint x;$/");
        assert_eq!(triple.display, "shown");
    }

    #[test]
    fn test_nul_context_is_tab_joined() {
        let triple = PreviewTriple::parse("a.c\05\0x", Delimiter::Nul).unwrap();
        assert_eq!(triple.context(), "a.c\t5\tx");
    }
}
