//! Doctor - Dependency checking

use anyhow::Result;
use colored::Colorize;

use crate::core::util::command_exists;

/// Dependency status
#[derive(Debug, Clone)]
pub struct DependencyStatus {
    pub name: String,
    pub available: bool,
    pub required: bool,
    pub used_by: &'static str,
    pub notes: Option<String>,
}

impl DependencyStatus {
    fn probe(name: &str, required: bool, used_by: &'static str, notes: &str) -> Self {
        Self {
            name: name.to_string(),
            available: command_exists(name),
            required,
            used_by,
            notes: Some(notes.to_string()),
        }
    }

    /// One report line, e.g. `✓ ctags (required, list) - found`
    pub fn report_line(&self, color: bool) -> String {
        let status = match (self.available, color) {
            (true, true) => "✓".green().to_string(),
            (false, true) => "✗".red().to_string(),
            (true, false) => "✓".to_string(),
            (false, false) => "✗".to_string(),
        };
        let required = if self.required {
            "required"
        } else {
            "optional"
        };

        let mut line = format!(
            "{} {} ({}, {}) - {}",
            status,
            self.name,
            required,
            self.used_by,
            if self.available { "found" } else { "not found" }
        );

        if !self.available {
            if let Some(notes) = &self.notes {
                line.push_str(&format!("\n  Note: {}", notes));
            }
        }

        line
    }
}

/// Check all dependencies
pub fn check_dependencies() -> Vec<DependencyStatus> {
    vec![
        DependencyStatus::probe(
            "ctags",
            true,
            "list",
            "Install universal-ctags: brew install universal-ctags / apt install universal-ctags",
        ),
        DependencyStatus::probe(
            "global",
            false,
            "gtags",
            "Install GNU global: brew install global / apt install global",
        ),
        DependencyStatus::probe(
            "pglobal",
            false,
            "gtags -n",
            "pglobal is only needed for parallel gtags searches",
        ),
        DependencyStatus::probe(
            "nvim",
            false,
            "preview",
            "Install Neovim 0.9+ for --server/--remote-expr support",
        ),
    ]
}

/// Run the doctor command
pub fn run_doctor(color: bool) -> Result<()> {
    let deps = check_dependencies();

    for dep in &deps {
        println!("{}", dep.report_line(color));
    }

    if deps.iter().any(|d| d.required && !d.available) {
        log::warn!("Some required dependencies are missing");
    }

    Ok(())
}
