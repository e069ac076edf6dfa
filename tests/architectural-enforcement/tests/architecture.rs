//! Workspace-wide architecture rules

use std::fs;

use architectural_enforcement::{offending_lines, production_source, rust_files, workspace_root};

// ============================================================================
// Core stays UI-agnostic
// ============================================================================

#[test]
fn core_has_no_terminal_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("conductor/core/Cargo.toml")).unwrap();
    for forbidden in ["ratatui", "crossterm"] {
        assert!(
            !manifest.contains(forbidden),
            "companion-core must not depend on {forbidden}"
        );
    }

    for path in rust_files("conductor/core/src") {
        let source = fs::read_to_string(&path).unwrap();
        assert!(
            !source.contains("use ratatui") && !source.contains("use crossterm"),
            "{} imports a terminal crate",
            path.display()
        );
    }
}

// ============================================================================
// Async code doesn't block
// ============================================================================

#[test]
fn async_modules_avoid_blocking_io() {
    let mut violations = Vec::new();
    for dir in ["conductor/core/src", "tui/src"] {
        for path in rust_files(dir) {
            // Entry points may do blocking setup before the UI starts
            if path.ends_with("main.rs") || path.components().any(|c| c.as_os_str() == "bin") {
                continue;
            }
            let source = production_source(&path);
            if !source.contains("async fn") {
                continue;
            }
            for needle in ["std::fs::", "std::thread::sleep"] {
                for (line, text) in offending_lines(&source, needle) {
                    violations.push(format!("{}:{line}: {text}", path.display()));
                }
            }
        }
    }
    assert!(violations.is_empty(), "blocking calls in async modules:\n{}", violations.join("\n"));
}

// ============================================================================
// Library code propagates errors
// ============================================================================

#[test]
fn core_library_does_not_panic_on_errors() {
    let mut violations = Vec::new();
    for path in rust_files("conductor/core/src") {
        // Binaries report through anyhow at the top level
        if path.components().any(|c| c.as_os_str() == "bin") {
            continue;
        }
        let source = production_source(&path);
        for needle in [".unwrap()", ".expect(", "println!"] {
            for (line, text) in offending_lines(&source, needle) {
                violations.push(format!("{}:{line}: {text}", path.display()));
            }
        }
    }
    assert!(violations.is_empty(), "panicking or printing library code:\n{}", violations.join("\n"));
}
