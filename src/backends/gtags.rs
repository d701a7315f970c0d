//! GNU global integration
//!
//! Runs `global --result=grep` (or `pglobal -n N` for a parallel search) and
//! converts `file:line:text` results into raw records. The text column already
//! holds the source line, so these records never touch the source files.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::model::{Layout, RawTagRecord, TagError};
use crate::core::paths::absolutize;
use crate::core::pipeline::{emit, PipelineConfig};
use crate::core::util::command_exists;

/// A query against a gtags database
#[derive(Debug, Clone)]
pub struct GtagsQuery {
    /// Directory holding GTAGS/GRTAGS/GPATH
    pub dbpath: PathBuf,

    /// Parallel instances; 0 runs plain `global`
    pub jobs: usize,

    /// Arguments passed through to global
    pub args: Vec<String>,
}

impl GtagsQuery {
    pub fn new(dbpath: impl Into<PathBuf>, jobs: usize, args: Vec<String>) -> Self {
        Self {
            dbpath: dbpath.into(),
            jobs,
            args,
        }
    }

    pub fn program(&self) -> &'static str {
        if self.jobs == 0 {
            "global"
        } else {
            "pglobal"
        }
    }

    /// The searched symbol: the last argument that is not a flag
    pub fn tag_name(&self) -> &str {
        self.args
            .iter()
            .rev()
            .find(|a| !a.starts_with('-'))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Build the command; the database path is made absolute against `cwd`
    pub fn command(&self, cwd: &Path) -> Command {
        let dbpath = absolutize(&self.dbpath, cwd);
        let mut cmd = Command::new(self.program());

        if self.jobs == 0 {
            cmd.env("GTAGSROOT", cwd).env("GTAGSDBPATH", &dbpath);
        } else {
            cmd.arg("-n").arg(self.jobs.to_string()).arg(&dbpath);
        }

        cmd.arg("--result=grep").args(&self.args);
        cmd
    }
}

/// Parse `--result=grep` output (`file:line:text`)
pub fn parse_grep_output(stdout: &str, tag_name: &str) -> Vec<RawTagRecord> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut parts = line.splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(file), Some(number), text) if !file.is_empty() => Some(RawTagRecord::new(
                    tag_name,
                    file,
                    number,
                    text.unwrap_or(""),
                )),
                _ => {
                    log::warn!("Skipping global output line: {:?}", line);
                    None
                }
            }
        })
        .collect()
}

/// Run the query and collect its results
pub fn query(query: &GtagsQuery, cwd: &Path) -> Result<Vec<RawTagRecord>> {
    let program = query.program();
    if !command_exists(program) {
        return Err(TagError::ToolUnavailable {
            tool: program.to_string(),
        }
        .into());
    }

    let output = query
        .command(cwd)
        .output()
        .with_context(|| format!("Failed to run {}", program))?;

    if !output.status.success() {
        bail!(
            "{} failed ({}): {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(parse_grep_output(
        &String::from_utf8_lossy(&output.stdout),
        query.tag_name(),
    ))
}

/// Run the gtags command
pub fn run_gtags(gtags: &GtagsQuery, config: &PipelineConfig) -> Result<()> {
    let records = query(gtags, &config.cwd)?;
    emit(
        records,
        config.context(Layout::Location, &config.cwd),
        config.render,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_parse_grep_output() {
        let out = "src/a.c:12:int foo(void)\nsrc/b.c:7:    foo();\n";
        let records = parse_grep_output(out, "foo");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], RawTagRecord::new("foo", "src/a.c", "12", "int foo(void)"));
        assert_eq!(records[1].trailing, "    foo();");
    }

    #[test]
    fn test_parse_grep_output_keeps_colons_in_text() {
        let records = parse_grep_output("a.cpp:3:ns::foo() {", "foo");
        assert_eq!(records[0].trailing, "ns::foo() {");
    }

    #[test]
    fn test_parse_grep_output_skips_garbage() {
        let records = parse_grep_output("no separators here\n\na.c:1:x\n", "x");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_path, "a.c");
    }

    #[test]
    fn test_plain_global_command() {
        let q = GtagsQuery::new("db", 0, vec!["-d".to_string(), "foo".to_string()]);
        let cmd = q.command(Path::new("/work"));

        assert_eq!(cmd.get_program(), OsStr::new("global"));
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["--result=grep", "-d", "foo"]);

        let envs: Vec<_> = cmd.get_envs().collect();
        assert!(envs.contains(&(OsStr::new("GTAGSROOT"), Some(OsStr::new("/work")))));
        assert!(envs.contains(&(OsStr::new("GTAGSDBPATH"), Some(OsStr::new("/work/db")))));
    }

    #[test]
    fn test_parallel_command() {
        let q = GtagsQuery::new("/db", 4, vec!["foo".to_string()]);
        let cmd = q.command(Path::new("/work"));

        assert_eq!(cmd.get_program(), OsStr::new("pglobal"));
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["-n", "4", "/db", "--result=grep", "foo"]);
    }

    #[test]
    fn test_tag_name() {
        let q = GtagsQuery::new("db", 0, vec!["-r".to_string(), "foo".to_string(), "-i".to_string()]);
        assert_eq!(q.tag_name(), "foo");
        assert_eq!(GtagsQuery::new("db", 0, vec![]).tag_name(), "");
    }
}
