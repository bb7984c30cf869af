//! Temporary files owned by a single request
//!
//! An [`Artifact`] removes its file when dropped, so every exit path of a
//! request cleans up after itself without explicit remove calls.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const NAME_PREFIX: &str = "codexec-";

/// Suffix given to compiled executables
pub const BINARY_EXTENSION: &str = "exe";

/// A file on disk owned exclusively by the current request
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    removed: bool,
}

impl Artifact {
    /// Create a new file at `path` holding exactly `content`.
    ///
    /// Fails if the file already exists, so a name can never be shared
    /// between requests.
    #[instrument(skip(content))]
    pub async fn create(path: PathBuf, content: &[u8]) -> io::Result<Self> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        // Owned from here on: a failed write still removes the file
        let artifact = Self::reserve(path);
        file.write_all(content).await?;
        file.flush().await?;

        debug!(path = %artifact.path.display(), len = content.len(), "created artifact");
        Ok(artifact)
    }

    /// Take ownership of `path` before anything exists there, e.g. the
    /// output of a compiler that may or may not produce it
    pub fn reserve(path: PathBuf) -> Self {
        Self {
            path,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the file is currently on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove the file now. Removing an absent file is not an error.
    pub async fn remove(mut self) -> io::Result<()> {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        // Drop cannot await; a single unlink blocks the worker only briefly
        match remove_if_exists(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed artifact"),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove artifact"
            ),
        }
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        result => result,
    }
}

/// A fresh file name `codexec-<uuid>.<extension>`
pub fn unique_name(extension: &str) -> String {
    format!("{NAME_PREFIX}{}.{extension}", Uuid::new_v4().simple())
}

/// Path of the executable built from `source`: same base name, `.exe` suffix
pub fn binary_path(source: &Path) -> PathBuf {
    source.with_extension(BINARY_EXTENSION)
}
