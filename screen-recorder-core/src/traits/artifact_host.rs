use crate::models::artifact::{Artifact, ArtifactUrl};
use crate::models::error::CaptureError;

/// Where finished recordings live: preview references and downloads.
pub trait ArtifactHost {
    /// Create a locally resolvable reference for previewing `artifact`.
    fn publish(&mut self, artifact: &Artifact) -> Result<ArtifactUrl, CaptureError>;

    /// Release a reference created by `publish`.
    fn revoke(&mut self, url: &ArtifactUrl);

    /// Save `artifact` under `file_name`. Returns where it went.
    fn save(&mut self, artifact: &Artifact, file_name: &str) -> Result<String, CaptureError>;
}
