//! Scan coordinator
//!
//! Drives a full run: discover report files, register a file row for each,
//! fan the gated read/parse/extract work out as tasks, aggregate
//! completions and failures, and hand the populated tables back for
//! export. Emission is suppressed when any file fails; a directory listing
//! failure aborts the run before any file is scheduled.

use crate::admission::AdmissionController;
use crate::config::ScanConfig;
use crate::error::{FileError, FileFailure, ScanError};
use crate::extract;
use crate::progress::PercentTracker;
use crate::tables::Tables;
use crate::walker::walk;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Summary of a completed scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub files_scanned: usize,
    pub rows_emitted: usize,
    pub duration: Duration,
}

/// A completed scan: the populated tables plus the run summary
#[derive(Debug)]
pub struct ScanOutcome {
    pub tables: Tables,
    pub report: ScanReport,
}

/// Progress callback: (percent, completed, total)
type ProgressFn = dyn Fn(u8, usize, usize) + Send + Sync;

/// Coordinates one scan run
pub struct ScanCoordinator {
    config: Arc<ScanConfig>,
    admission: Arc<AdmissionController>,
}

impl ScanCoordinator {
    pub fn new(config: ScanConfig) -> Self {
        let admission = Arc::new(AdmissionController::new(config.max_in_flight));
        Self {
            config: Arc::new(config),
            admission,
        }
    }

    /// Run the scan without progress callbacks.
    pub async fn run(&self) -> crate::error::Result<ScanOutcome> {
        self.run_inner(None).await
    }

    /// Run the scan, invoking `on_progress` whenever the completed
    /// percentage crosses an integer boundary.
    pub async fn run_with_progress<F>(&self, on_progress: F) -> crate::error::Result<ScanOutcome>
    where
        F: Fn(u8, usize, usize) + Send + Sync + 'static,
    {
        self.run_inner(Some(Arc::new(on_progress))).await
    }

    async fn run_inner(
        &self,
        on_progress: Option<Arc<ProgressFn>>,
    ) -> crate::error::Result<ScanOutcome> {
        let started = Instant::now();

        info!(
            root = %self.config.root_dir.display(),
            extension = %self.config.extension,
            max_in_flight = self.admission.ceiling(),
            "Starting report scan"
        );

        let mut paths = walk(&self.config.root_dir, &self.config.extension).await?;

        // Sorted discovery keeps file ids stable across runs even though
        // parse completion order is not.
        paths.sort();
        let total = paths.len();
        info!(files = total, "Discovery complete");

        let tables = Arc::new(Mutex::new(Tables::new()));
        let progress = Arc::new(PercentTracker::new(total));
        let mut scans: JoinSet<Option<FileFailure>> = JoinSet::new();

        for abs_path in paths {
            // The file row must exist before its read is scheduled so every
            // child row references an already-registered file.
            let file_id = {
                let (dir, name) = split_relative(&self.config.root_dir, &abs_path);
                let mut tables = tables.lock().expect("tables lock poisoned");
                tables.register_file(dir, name, abs_path.clone())
            };

            let admission = Arc::clone(&self.admission);
            let tables = Arc::clone(&tables);
            let progress = Arc::clone(&progress);
            let on_progress = on_progress.clone();

            scans.spawn(async move {
                let result = scan_file(file_id, &abs_path, &admission, &tables).await;

                if let Some(percent) = progress.complete_one() {
                    debug!(percent, "Scan progress");
                    if let Some(callback) = &on_progress {
                        callback(percent, progress.completed(), progress.total());
                    }
                }

                match result {
                    Ok(()) => None,
                    Err(error) => {
                        warn!(file = %abs_path.display(), %error, "File failed");
                        Some(FileFailure { file_id, error })
                    }
                }
            });
        }

        // Every scheduled file resolves to success or a recorded failure;
        // a failure never aborts in-flight siblings.
        let mut failures = Vec::new();
        while let Some(joined) = scans.join_next().await {
            match joined {
                Ok(None) => {}
                Ok(Some(failure)) => failures.push(failure),
                Err(join_error) => failures.push(FileFailure {
                    file_id: 0,
                    error: FileError::TaskPanicked {
                        path: PathBuf::new(),
                        message: join_error.to_string(),
                    },
                }),
            }
        }

        if !failures.is_empty() {
            return Err(ScanError::Files { failures });
        }

        let mut tables = Arc::try_unwrap(tables)
            .expect("scan tasks still hold the tables")
            .into_inner()
            .expect("tables lock poisoned");

        if self.config.stable_ids {
            tables.renumber_stable();
        }

        let report = ScanReport {
            files_scanned: total,
            rows_emitted: tables.row_count(),
            duration: started.elapsed(),
        };

        info!(
            files = report.files_scanned,
            rows = report.rows_emitted,
            duration_ms = report.duration.as_millis() as u64,
            "Scan complete"
        );

        Ok(ScanOutcome { tables, report })
    }
}

/// Read, parse, and extract one file. The admission controller gates the
/// read; extraction runs to completion once the content is in memory.
async fn scan_file(
    file_id: u64,
    path: &Path,
    admission: &AdmissionController,
    tables: &Mutex<Tables>,
) -> Result<(), FileError> {
    let text = admission
        .admit(fs::read_to_string(path))
        .await
        .map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    // Older report files carry a DOCTYPE declaration.
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(&text, options).map_err(|source| {
        FileError::Malformed {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let mut tables = tables.lock().expect("tables lock poisoned");
    extract::extract_all(&doc, file_id, &mut tables);

    Ok(())
}

/// Split an absolute path into (directory, filename) relative to the scan
/// root.
fn split_relative(root: &Path, abs_path: &Path) -> (String, String) {
    let relative = abs_path.strip_prefix(root).unwrap_or(abs_path);
    let dir = relative
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let name = relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (dir, name)
}
