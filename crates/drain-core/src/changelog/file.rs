// # File Changelog
//
// Whole-document persistence for the changelog.
//
// ## File Format
//
// ```json
// {
//   "changes": [
//     {
//       "provider": "gcloud",
//       "action": "-",
//       "zone": "my-zone",
//       "record": "www.example.com.",
//       "recordType": "A",
//       "value": "1.2.3.4"
//     }
//   ]
// }
// ```
//
// The document is written once at the end of a drain run (write-then-rename
// for atomicity) and read once at the start of an undrain run.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::changelog::ChangeSet;

/// File-backed changelog
///
/// A crashed or interrupted drain run never leaves a half-written document
/// behind: the new content lands in a temporary file first and replaces the
/// target via rename.
#[derive(Debug, Clone)]
pub struct FileChangeLog {
    path: PathBuf,
}

impl FileChangeLog {
    /// Create a changelog handle for the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the changelog document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole changelog document
    pub async fn load(&self) -> Result<ChangeSet, Error> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::changelog(format!(
                "failed to read changelog {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            Error::changelog(format!(
                "failed to parse changelog {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Write the whole changelog document atomically
    pub async fn write(&self, changes: &ChangeSet) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::changelog(format!(
                        "failed to create changelog directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let json = serde_json::to_string(changes)
            .map_err(|e| Error::changelog(format!("failed to serialize changelog: {}", e)))?;

        // Write to a temporary file first, then rename over the target
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::changelog(format!(
                    "failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::changelog(format!(
                    "failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::changelog(format!(
                    "failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::changelog(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            "changelog written to {}: {} entries",
            self.path.display(),
            changes.len()
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}
