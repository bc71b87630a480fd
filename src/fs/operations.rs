use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use tokio::{fs, io::AsyncWriteExt};

/// Replaces `path` with `contents` without ever leaving a half-written file behind.
/// Data goes to a sibling temporary file first, is synced, and then renamed over the target, so a
/// crash at any point leaves either the previous or the new document.
pub async fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), std::io::Error> {
    let temporary = sibling_with_suffix(path, ".tmp");

    let result = async {
        let mut file = fs::File::create(&temporary).await?;
        file.write_all(contents).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temporary, path).await
    }
    .await;

    if result.is_err() {
        // The target is untouched, only the leftover needs cleaning.
        let _ = fs::remove_file(&temporary).await;
    }
    result
}

/// `ledger.json` + `.corrupt` -> `ledger.json.corrupt`
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
