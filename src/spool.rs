//! Append-only spool files used as the durable fallback for delivery.
//!
//! A spool file is never read, rotated, or compacted here; a separate
//! reconciliation job drains it. Growth is unbounded on purpose.

use std::path::Path;

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::RelayError;

/// Append one entry to the spool file at `path`, creating parent directories
/// on first use.
///
/// Entries are framed one per line: a trailing newline is added when the
/// payload does not already end with one, and the payload bytes themselves
/// are written verbatim in a single write call. A failed append is the one
/// failure the relay cannot recover from locally, so it surfaces as
/// [`RelayError::Spool`].
pub async fn append(path: &Path, text: &str) -> Result<(), RelayError> {
    let io = |source| RelayError::Spool {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(io)?;
    }

    let mut entry = String::with_capacity(text.len() + 1);
    entry.push_str(text);
    if !entry.ends_with('\n') {
        entry.push('\n');
    }

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .await
        .map_err(io)?;
    file.write_all(entry.as_bytes()).await.map_err(io)?;
    file.flush().await.map_err(io)?;

    Ok(())
}
