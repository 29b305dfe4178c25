//! Recursive directory walk
//!
//! Enumerates a directory tree, matching files by extension. Each
//! subdirectory is walked as its own task; a level completes when every
//! entry has been classified and every child walk has been joined, in
//! whatever order they finish. The first directory that cannot be listed
//! fails the whole walk: the error propagates immediately, in-progress
//! sibling tasks are aborted, and partial results are discarded.

use crate::error::{WalkError, WalkResult};
use std::ffi::OsStr;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinSet;
use tracing::debug;

/// Walk `root` recursively, returning the paths of all files whose
/// extension matches `extension` (compared case-insensitively, without the
/// leading dot). Result order carries no guarantee.
pub async fn walk(root: &Path, extension: &str) -> WalkResult<Vec<PathBuf>> {
    let extension = Arc::new(extension.trim_start_matches('.').to_string());
    let matched = walk_dir(root.to_path_buf(), extension).await?;
    debug!(files = matched.len(), root = %root.display(), "walk complete");
    Ok(matched)
}

/// Boxed for async recursion.
fn walk_dir(
    dir: PathBuf,
    extension: Arc<String>,
) -> Pin<Box<dyn Future<Output = WalkResult<Vec<PathBuf>>> + Send>> {
    Box::pin(async move {
        let mut entries = fs::read_dir(&dir).await.map_err(|source| {
            WalkError::DirectoryRead {
                path: dir.clone(),
                source,
            }
        })?;

        let mut matched = Vec::new();
        let mut subdirs: JoinSet<WalkResult<Vec<PathBuf>>> = JoinSet::new();

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(WalkError::DirectoryRead {
                        path: dir.clone(),
                        source,
                    });
                }
            };

            // A failed type probe degrades to the extension test, the same
            // as any other non-directory entry.
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);

            if is_dir {
                subdirs.spawn(walk_dir(entry.path(), Arc::clone(&extension)));
            } else if matches_extension(&entry.path(), &extension) {
                matched.push(entry.path());
            }
        }

        // Child levels complete in any order. The first error wins: the
        // JoinSet drop aborts the remaining siblings and their partial
        // results never surface.
        while let Some(joined) = subdirs.join_next().await {
            let child = joined.map_err(|e| WalkError::TaskPanicked {
                message: e.to_string(),
            })??;
            matched.extend(child);
        }

        Ok(matched)
    })
}

fn matches_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
