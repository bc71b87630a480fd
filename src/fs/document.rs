use std::{io::ErrorKind, path::Path};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TrackerError};

use super::operations::{sibling_with_suffix, write_atomically};

/// Reads a whole JSON document. A missing file is not an error and yields `None`.
pub async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    debug!("Reading {path:?}");
    let contents = match tokio::fs::read(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TrackerError::persistence(path, e)),
    };
    serde_json::from_slice(&contents)
        .map(Some)
        .map_err(|source| TrackerError::Format {
            path: path.to_path_buf(),
            source,
        })
}

/// Serializes the document and atomically replaces `path` with it.
pub async fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let contents = serde_json::to_vec_pretty(document).map_err(|source| TrackerError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomically(path, &contents)
        .await
        .map_err(|e| TrackerError::persistence(path, e))?;
    debug!("Wrote {} bytes to {path:?}", contents.len());
    Ok(())
}

/// Moves an unreadable document out of the way so the next write can't destroy it.
pub async fn quarantine(path: &Path) -> Result<()> {
    let target = sibling_with_suffix(path, ".corrupt");
    tokio::fs::rename(path, &target)
        .await
        .map_err(|e| TrackerError::persistence(path, e))?;
    warn!("Moved unreadable {path:?} to {target:?}");
    Ok(())
}
