//! File system walker for discovering source files to scan
//!
//! This module provides directory traversal with support for:
//! - .gitignore and .codeintelignore rules
//! - Custom ignore patterns from configuration
//! - Language filtering
//! - Hidden file handling
//! - Optional exclusion of test files

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Settings;
use crate::config::IGNORE_FILE;
use crate::parsing::Language;

/// Walks directories to find source files to scan
#[derive(Debug, Clone)]
pub struct FileWalker {
    settings: Arc<Settings>,
}

impl FileWalker {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Walk a directory (or a single file) and yield every source file of an
    /// enabled language together with that language.
    pub fn walk(&self, root: &Path) -> Box<dyn Iterator<Item = (PathBuf, Language)>> {
        if root.is_file() {
            let single = self
                .settings
                .language_for(root)
                .map(|language| (root.to_path_buf(), language));
            return Box::new(single.into_iter());
        }

        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(self.settings.scan.follow_links)
            .max_depth(None)
            .require_git(false)
            .add_custom_ignore_filename(IGNORE_FILE);

        let mut override_builder = OverrideBuilder::new(root);
        for pattern in &self.settings.scan.ignore_patterns {
            if let Err(e) = override_builder.add(&format!("!{pattern}")) {
                tracing::warn!(target: "scan", "Invalid ignore pattern '{pattern}': {e}");
            }
        }
        match override_builder.build() {
            Ok(overrides) => {
                builder.overrides(overrides);
            }
            Err(e) => tracing::warn!(target: "scan", "Ignoring configured patterns: {e}"),
        }

        let settings = Arc::clone(&self.settings);
        let include_tests = settings.scan.include_tests;
        let root = root.to_path_buf();

        Box::new(
            builder
                .build()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::debug!(target: "scan", "Skipping unreadable entry: {e}");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
                .filter_map(move |entry| {
                    let path = entry.path();

                    let hidden = path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with('.'));
                    if hidden {
                        return None;
                    }

                    let language = settings.language_for(path)?;
                    let relative = path.strip_prefix(&root).unwrap_or(path);
                    if !include_tests && is_test_file(relative) {
                        return None;
                    }
                    Some((path.to_path_buf(), language))
                }),
        )
    }
}

/// Test sources by naming convention: `tests/`, `test/`, `__tests__/`
/// directories, `test_*.py`, `*_test.py`, `*_test.go`, `*.test.js`,
/// `*.spec.ts` and friends.
pub fn is_test_file(path: &Path) -> bool {
    let in_test_dir = path
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| c.as_os_str().to_str())
        .any(|c| matches!(c, "test" | "tests" | "__tests__" | "spec"));
    if in_test_dir {
        return true;
    }

    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    stem.starts_with("test_")
        || stem.ends_with("_test")
        || stem.ends_with(".test")
        || stem.ends_with(".spec")
}
