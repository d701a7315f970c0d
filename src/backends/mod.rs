//! Backends module - Index queries and editor integration
//!
//! Provides:
//! - ctags: exact lookup in tag files, single-file listing via ctags
//! - gtags: GNU global / pglobal queries
//! - stdin: raw tag lines piped in from any upstream query
//! - preview: forwarding a picked location to a running editor
//! - doctor: Dependency checking

pub mod ctags;
pub mod doctor;
pub mod gtags;
pub mod preview;
pub mod stdin;
