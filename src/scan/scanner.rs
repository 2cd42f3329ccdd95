//! Parallel endpoint extraction over the files found by [`FileWalker`].

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{FileWalker, ScanError, ScanResult};
use crate::Settings;
use crate::parsing::{DiscoveredEndpoint, ExtractorFactory, Language, ParseError};

#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Sorted by file, line, column
    pub endpoints: Vec<DiscoveredEndpoint>,
    pub files_scanned: usize,
    pub files_skipped: usize,
}

enum FileResult {
    Extracted(Vec<DiscoveredEndpoint>),
    Skipped,
}

pub struct EndpointScanner {
    settings: Arc<Settings>,
    walker: FileWalker,
    factory: ExtractorFactory,
}

impl EndpointScanner {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            walker: FileWalker::new(Arc::clone(&settings)),
            factory: ExtractorFactory::new(Arc::clone(&settings)),
            settings,
        }
    }

    pub fn scan(&self, root: &Path) -> ScanResult<ScanOutcome> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }

        let files: Vec<(PathBuf, Language)> = self.walker.walk(root).collect();
        tracing::debug!(
            target: "scan",
            "Found {} candidate files under {}",
            files.len(),
            root.display()
        );

        let threads = self.settings.scan.parallel_threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        let max_file_size = self.settings.scan.max_file_size;

        let results: Vec<Result<FileResult, ParseError>> = pool.install(|| {
            files
                .par_iter()
                .map_init(
                    || self.factory.extractor_set(),
                    |extractors, (path, language)| {
                        let Some(code) = read_source(path, max_file_size) else {
                            return Ok(FileResult::Skipped);
                        };
                        let found = extractors.extract(*language, &code, path)?;
                        tracing::debug!(
                            target: "scan",
                            "{}: {} endpoint(s)",
                            path.display(),
                            found.len()
                        );
                        Ok(FileResult::Extracted(found))
                    },
                )
                .collect()
        });

        let mut outcome = ScanOutcome::default();
        for result in results {
            match result? {
                FileResult::Extracted(found) => {
                    outcome.files_scanned += 1;
                    outcome.endpoints.extend(found);
                }
                FileResult::Skipped => outcome.files_skipped += 1,
            }
        }

        outcome.endpoints.sort_by(|a, b| {
            (&a.location.file, a.location.line, a.location.column)
                .cmp(&(&b.location.file, b.location.line, b.location.column))
        });

        tracing::info!(
            target: "scan",
            "Scanned {} files ({} skipped), found {} endpoints",
            outcome.files_scanned,
            outcome.files_skipped,
            outcome.endpoints.len()
        );
        Ok(outcome)
    }
}

/// File contents, or `None` when the file is too large, unreadable or not UTF-8.
fn read_source(path: &Path, max_file_size: u64) -> Option<String> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > max_file_size => {
            tracing::debug!(
                target: "scan",
                "Skipping {} ({} bytes exceeds max_file_size)",
                path.display(),
                meta.len()
            );
            return None;
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(target: "scan", "Cannot stat {}: {e}", path.display());
            return None;
        }
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(target: "scan", "Cannot read {}: {e}", path.display());
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(code) => Some(code),
        Err(_) => {
            tracing::debug!(target: "scan", "Skipping non UTF-8 file {}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scanner(configure: impl FnOnce(&mut Settings)) -> EndpointScanner {
        let mut settings = Settings::default();
        settings.scan.parallel_threads = 2;
        configure(&mut settings);
        EndpointScanner::new(Arc::new(settings))
    }

    #[test]
    fn test_scan_mixed_languages() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(
            root.join("app.py"),
            "@app.route('/users')\ndef users():\n    pass\n",
        )
        .unwrap();
        fs::write(
            root.join("server.js"),
            "app.post('/users', (req, res) => res.send('ok'));\n",
        )
        .unwrap();

        let outcome = scanner(|_| {}).scan(root).unwrap();
        assert_eq!(outcome.files_scanned, 2);
        assert_eq!(outcome.files_skipped, 0);

        let summary: Vec<String> = outcome.endpoints.iter().map(|e| e.to_string()).collect();
        assert_eq!(summary, vec!["GET /users", "POST /users"]);
    }

    #[test]
    fn test_sorted_by_location() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(
            root.join("b.py"),
            "@app.get('/b2')\ndef b2(): pass\n@app.get('/b1')\ndef b1(): pass\n",
        )
        .unwrap();
        fs::write(root.join("a.py"), "\n\n@app.get('/a')\ndef a(): pass\n").unwrap();

        let outcome = scanner(|_| {}).scan(root).unwrap();
        let paths: Vec<&str> = outcome.endpoints.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b2", "/b1"]);
    }

    #[test]
    fn test_large_and_binary_files_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("big.py"), "@app.get('/big')\ndef big(): pass\n".repeat(10)).unwrap();
        fs::write(root.join("binary.py"), [0xff, 0xfe, 0x00, 0x41]).unwrap();
        fs::write(root.join("ok.py"), "@app.get('/ok')\ndef ok(): pass\n").unwrap();

        let outcome = scanner(|s| s.scan.max_file_size = 64).scan(root).unwrap();
        assert_eq!(outcome.files_scanned, 1);
        assert_eq!(outcome.files_skipped, 2);
        assert_eq!(outcome.endpoints.len(), 1);
        assert_eq!(outcome.endpoints[0].path, "/ok");
    }

    #[test]
    fn test_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = scanner(|_| {}).scan(&missing);
        assert!(matches!(result, Err(ScanError::PathNotFound(p)) if p == missing));
    }
}
