//! Source materialization
//!
//! Writes the submitted source to a fresh, uniquely named file.

use std::path::Path;

use tracing::{debug, instrument};

use crate::artifact::{Artifact, unique_name};
use crate::config::Toolchain;
use crate::runner::ExecError;

/// Write `source` to a new file in `dir` with the toolchain's extension.
///
/// The directory is created if missing. The returned artifact owns the file.
#[instrument(skip(toolchain, source), fields(extension = %toolchain.extension))]
pub async fn materialize(
    dir: &Path,
    toolchain: &Toolchain,
    source: &[u8],
) -> Result<Artifact, ExecError> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(unique_name(toolchain.extension.as_str()));
    let artifact = Artifact::create(path, source).await?;

    debug!(path = %artifact.path().display(), "materialized source");
    Ok(artifact)
}
