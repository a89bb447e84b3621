use std::fs;
use std::path::{Path, PathBuf};

use crate::models::artifact::RecordingMetadata;
use crate::models::error::CaptureError;

/// Path of the JSON sidecar for a saved recording: `{recording_path}.metadata.json`.
pub fn metadata_path(recording_path: &Path) -> PathBuf {
    let mut name = recording_path.as_os_str().to_owned();
    name.push(".metadata.json");
    PathBuf::from(name)
}

/// Write recording metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &RecordingMetadata, recording_path: &Path) -> Result<(), CaptureError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(metadata_path(recording_path), json)
        .map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read recording metadata from a JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, CaptureError> {
    let json = fs::read_to_string(metadata_path(recording_path))
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    let metadata: RecordingMetadata = serde_json::from_str(&json)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))?;
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_appends_suffix() {
        let path = Path::new("/tmp/screen-recording-1.webm");
        assert_eq!(
            metadata_path(path),
            PathBuf::from("/tmp/screen-recording-1.webm.metadata.json")
        );
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let recording = dir.path().join("screen-recording-5.webm");
        let metadata = RecordingMetadata {
            id: "abc".into(),
            file_name: "screen-recording-5.webm".into(),
            mime_type: "video/webm".into(),
            size_bytes: 10,
            chunk_count: 2,
            duration_secs: 3,
            checksum: "00".into(),
            created_at: "1970-01-01T00:00:00.005+00:00".into(),
        };

        write_metadata(&metadata, &recording).unwrap();
        assert_eq!(read_metadata(&recording).unwrap(), metadata);
    }

    #[test]
    fn missing_sidecar_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_metadata(&dir.path().join("nope.webm")).unwrap_err();
        assert!(matches!(err, CaptureError::StorageError(_)));
    }
}
