use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::artifact::{Artifact, ArtifactUrl};
use crate::models::error::CaptureError;
use crate::storage::metadata;
use crate::traits::artifact_host::ArtifactHost;

/// Artifact host for native environments.
///
/// Preview references are in-memory `blob:` style handles mapped to the
/// artifact id; downloads are written into `output_directory` with a JSON
/// metadata sidecar next to them.
#[derive(Debug)]
pub struct FileArtifactHost {
    output_directory: PathBuf,
    live: HashMap<ArtifactUrl, String>,
}

impl FileArtifactHost {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            output_directory: output_directory.into(),
            live: HashMap::new(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Number of published references not yet revoked.
    pub fn live_references(&self) -> usize {
        self.live.len()
    }

    /// The artifact id a live reference points at.
    pub fn resolve(&self, url: &ArtifactUrl) -> Option<&str> {
        self.live.get(url).map(String::as_str)
    }
}

impl ArtifactHost for FileArtifactHost {
    fn publish(&mut self, artifact: &Artifact) -> Result<ArtifactUrl, CaptureError> {
        let url = ArtifactUrl::new(format!("blob:screen-recorder/{}", uuid::Uuid::new_v4()));
        self.live.insert(url.clone(), artifact.id().to_string());
        Ok(url)
    }

    fn revoke(&mut self, url: &ArtifactUrl) {
        if self.live.remove(url).is_none() {
            log::debug!("revoking unknown reference {}", url);
        }
    }

    fn save(&mut self, artifact: &Artifact, file_name: &str) -> Result<String, CaptureError> {
        fs::create_dir_all(&self.output_directory)
            .map_err(|e| CaptureError::StorageError(format!("failed to create directory: {}", e)))?;

        let path = self.output_directory.join(file_name);
        fs::write(&path, artifact.bytes())
            .map_err(|e| CaptureError::StorageError(format!("failed to write recording: {}", e)))?;
        metadata::write_metadata(&artifact.metadata(file_name), &path)?;

        Ok(path.to_string_lossy().to_string())
    }
}
