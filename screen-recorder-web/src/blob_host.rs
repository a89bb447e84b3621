//! Artifact hosting with `Blob`s and object URLs.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use screen_recorder_core::{Artifact, ArtifactHost, ArtifactUrl, CaptureError};

use crate::support;

/// Publishes artifacts as `blob:` URLs and saves them by clicking a
/// temporary `<a download>` element.
#[derive(Debug, Default)]
pub struct BlobArtifactHost {
    live: Vec<ArtifactUrl>,
}

impl BlobArtifactHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object URLs published and not yet revoked.
    pub fn live_references(&self) -> &[ArtifactUrl] {
        &self.live
    }
}

fn to_blob(artifact: &Artifact) -> Result<Blob, CaptureError> {
    let bytes = Uint8Array::from(artifact.bytes());
    let parts = Array::of1(&bytes);
    let properties = BlobPropertyBag::new();
    properties.set_type(artifact.mime_type());
    Blob::new_with_u8_array_sequence_and_options(&parts, &properties).map_err(|e| support::to_storage_error(&e))
}

fn trigger_download(href: &str, file_name: &str) -> Result<(), CaptureError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| CaptureError::StorageError("no document to attach the download to".into()))?;
    let body = document
        .body()
        .ok_or_else(|| CaptureError::StorageError("document has no body".into()))?;

    let anchor = document
        .create_element("a")
        .map_err(|e| support::to_storage_error(&e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| CaptureError::StorageError("created element is not an anchor".into()))?;
    anchor.set_href(href);
    anchor.set_download(file_name);

    body.append_child(&anchor).map_err(|e| support::to_storage_error(&e))?;
    anchor.click();
    body.remove_child(&anchor).map_err(|e| support::to_storage_error(&e))?;
    Ok(())
}

impl ArtifactHost for BlobArtifactHost {
    fn publish(&mut self, artifact: &Artifact) -> Result<ArtifactUrl, CaptureError> {
        let blob = to_blob(artifact)?;
        let url = Url::create_object_url_with_blob(&blob).map_err(|e| support::to_storage_error(&e))?;
        let url = ArtifactUrl::new(url);
        self.live.push(url.clone());
        Ok(url)
    }

    fn revoke(&mut self, url: &ArtifactUrl) {
        if let Err(e) = Url::revoke_object_url(url.as_str()) {
            log::warn!("failed to revoke {}: {}", url, support::describe(&e));
        }
        self.live.retain(|live| live != url);
    }

    fn save(&mut self, artifact: &Artifact, file_name: &str) -> Result<String, CaptureError> {
        match artifact.preview() {
            Some(url) => trigger_download(url.as_str(), file_name)?,
            None => {
                let blob = to_blob(artifact)?;
                let url = Url::create_object_url_with_blob(&blob).map_err(|e| support::to_storage_error(&e))?;
                let result = trigger_download(&url, file_name);
                if let Err(e) = Url::revoke_object_url(&url) {
                    log::warn!("failed to revoke temporary download url: {}", support::describe(&e));
                }
                result?;
            }
        }
        log::info!("download triggered for {} ({} bytes)", file_name, artifact.len());
        Ok(file_name.to_string())
    }
}
