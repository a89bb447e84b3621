use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::processing::mime;

/// A locally resolvable reference to an artifact (an object URL in a
/// browser, an in-memory handle elsewhere).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactUrl(String);

impl ArtifactUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The finalized recording: every chunk concatenated in arrival order.
///
/// Immutable once built. The preview reference is attached by the session
/// manager right after the host publishes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    id: String,
    bytes: Vec<u8>,
    mime_type: String,
    created_at: DateTime<Utc>,
    duration_secs: u64,
    chunk_count: usize,
    checksum: String,
    preview: Option<ArtifactUrl>,
}

impl Artifact {
    pub fn new(
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        created_at: DateTime<Utc>,
        duration_secs: u64,
        chunk_count: usize,
    ) -> Self {
        let checksum = sha256_hex(&bytes);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            bytes,
            mime_type: mime_type.into(),
            created_at,
            duration_secs,
            chunk_count,
            checksum,
            preview: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn preview(&self) -> Option<&ArtifactUrl> {
        self.preview.as_ref()
    }

    pub(crate) fn set_preview(&mut self, url: ArtifactUrl) {
        self.preview = Some(url);
    }

    pub(crate) fn take_preview(&mut self) -> Option<ArtifactUrl> {
        self.preview.take()
    }

    /// `<prefix>-<unix-timestamp-ms>.<extension>`
    pub fn file_name(&self, prefix: &str) -> String {
        format!(
            "{}-{}.{}",
            prefix,
            self.created_at.timestamp_millis(),
            mime::extension_for(&self.mime_type)
        )
    }

    pub fn metadata(&self, file_name: &str) -> RecordingMetadata {
        RecordingMetadata {
            id: self.id.clone(),
            file_name: file_name.to_string(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.bytes.len() as u64,
            chunk_count: self.chunk_count,
            duration_secs: self.duration_secs,
            checksum: self.checksum.clone(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

/// Metadata stored alongside a saved recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub chunk_count: usize,
    pub duration_secs: u64,
    pub checksum: String,
    pub created_at: String,
}

fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn file_name_uses_timestamp_and_extension() {
        let artifact = Artifact::new(vec![1, 2, 3], "video/webm;codecs=vp9,opus", at(1_700_000_000_123), 3, 1);
        assert_eq!(
            artifact.file_name("screen-recording"),
            "screen-recording-1700000000123.webm"
        );

        let mp4 = Artifact::new(vec![1], "video/mp4", at(42), 0, 1);
        assert_eq!(mp4.file_name("screen-recording"), "screen-recording-42.mp4");
    }

    #[test]
    fn checksum_is_sha256_of_bytes() {
        let artifact = Artifact::new(b"abc".to_vec(), "video/webm", at(0), 0, 1);
        assert_eq!(
            artifact.checksum(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn metadata_reflects_artifact() {
        let artifact = Artifact::new(vec![0; 500], "video/webm", at(1_000), 12, 3);
        let meta = artifact.metadata("screen-recording-1000.webm");

        assert_eq!(meta.id, artifact.id());
        assert_eq!(meta.size_bytes, 500);
        assert_eq!(meta.chunk_count, 3);
        assert_eq!(meta.duration_secs, 12);
        assert_eq!(meta.file_name, "screen-recording-1000.webm");
    }

    #[test]
    fn ids_are_unique() {
        let a = Artifact::new(vec![1], "video/webm", at(0), 0, 1);
        let b = Artifact::new(vec![1], "video/webm", at(0), 0, 1);
        assert_ne!(a.id(), b.id());
    }
}
