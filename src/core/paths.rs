//! Path normalization utilities
//!
//! Tag files store paths relative to their own directory; the picker wants them
//! relative to the current directory. Both steps are purely lexical so the result
//! never depends on which other files exist or were visited first.

use std::path::{Component, Path, PathBuf};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Remove `.` and resolve `..` components without touching the filesystem
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    out.iter().collect()
}

/// Make `path` absolute against `cwd` and normalize it
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&cwd.join(path))
    }
}

/// Express `path` relative to `base`, adding `..` where needed
///
/// Both paths are expected to be absolute. Paths on different roots are
/// returned unchanged.
pub fn relative_to(path: &Path, base: &Path) -> String {
    let path = normalize_lexically(path);
    let base = normalize_lexically(base);

    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return normalize_path(&path);
    }

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &path_parts[common..] {
        rel.push(part.as_os_str());
    }

    if rel.as_os_str().is_empty() {
        return ".".to_string();
    }

    normalize_path(&rel)
}

/// Resolve an index path against the index directory and express it relative to `cwd`
///
/// Returns `(source_path, display_path)`: the absolute path to open and the
/// relative path to show.
pub fn resolve_index_path(file_path: &str, index_dir: &Path, cwd: &Path) -> (PathBuf, String) {
    let source = absolutize(&index_dir.join(file_path), cwd);
    let display = relative_to(&source, cwd);
    (source, display)
}
