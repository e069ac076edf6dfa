//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The session core never depends on terminal crates
//! - Async code does not block on `std::fs` or `std::thread::sleep`
//! - Library code propagates errors instead of panicking
//!
//! These tests are designed to catch violations early in the development cycle.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Workspace root (two levels above this crate)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Every `.rs` file under `dir`, relative to the workspace root
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    WalkDir::new(workspace_root().join(dir))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "rs"))
        .collect()
}

/// Source text before the first `#[cfg(test)]`
pub fn production_source(path: &Path) -> String {
    let source = fs::read_to_string(path).unwrap_or_default();
    match source.find("#[cfg(test)]") {
        Some(idx) => source[..idx].to_string(),
        None => source,
    }
}

/// Lines of `source` containing `needle`, skipping comments
pub fn offending_lines(source: &str, needle: &str) -> Vec<(usize, String)> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim_start();
            !trimmed.starts_with("//") && line.contains(needle)
        })
        .map(|(i, line)| (i + 1, line.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_source_stops_at_tests() {
        let dir = std::env::temp_dir().join("arch-enforcement-probe.rs");
        fs::write(&dir, "fn a() {}\n#[cfg(test)]\nmod tests { fn b() { x.unwrap(); } }\n").unwrap();
        let source = production_source(&dir);
        assert!(source.contains("fn a()"));
        assert!(!source.contains("unwrap"));
        let _ = fs::remove_file(&dir);
    }

    #[test]
    fn test_offending_lines_skip_comments() {
        let source = "// x.unwrap()\nlet y = x.unwrap();\n";
        let hits = offending_lines(source, ".unwrap()");
        assert_eq!(hits, vec![(2, "let y = x.unwrap();".to_string())]);
    }
}
