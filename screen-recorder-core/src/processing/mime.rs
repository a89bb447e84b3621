/// Pick the first container type the encoder supports.
///
/// Returns `None` when nothing in the list is supported; the caller then
/// lets the platform choose its default.
pub fn select_container<F>(preferences: &[String], is_supported: F) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    preferences
        .iter()
        .find(|candidate| is_supported(candidate))
        .cloned()
}

/// File extension for a container type, ignoring codec parameters.
pub fn extension_for(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "video/mp4" | "audio/mp4" => "mp4",
        "video/x-matroska" | "video/matroska" => "mkv",
        "video/quicktime" => "mov",
        "video/ogg" | "audio/ogg" => "ogg",
        "audio/webm" | "video/webm" => "webm",
        _ => "webm",
    }
}
