use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use shared::container::ContainerDescriptor;

/// Container listing kept on disk by the runtime side, in the
/// Docker Engine `GET /containers/json` format.
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current listing. A missing file means no containers are running.
    pub async fn list_containers(&self) -> Result<Vec<ContainerDescriptor>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Snapshot {} not found", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read snapshot: {}", self.path.display())
                });
            }
        };

        let containers: Vec<ContainerDescriptor> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse snapshot: {}", self.path.display()))?;

        Ok(containers)
    }
}
