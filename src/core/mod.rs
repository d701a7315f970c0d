//! Core module - Tag records and the resolve/render pipeline
//!
//! This module provides:
//! - Tag record model and error taxonomy
//! - Address parsing (line numbers and search patterns)
//! - Batched line resolution, one scan per source file
//! - Record building with global column extents
//! - Rendering to picker lines or JSON Lines
//! - Path normalization utilities

pub mod address;
pub mod builder;
pub mod model;
pub mod paths;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod util;
