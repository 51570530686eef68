use std::path::Path;

const FALLBACK_MIME: &str = "image/jpeg";

/// Infer an image MIME type from the file extension.
///
/// Unknown or missing extensions fall back to `image/jpeg`; the bytes are
/// never inspected.
pub fn image_mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        other => {
            tracing::warn!(
                "Unrecognized image extension {:?} for {}, falling back to {}",
                other,
                path.display(),
                FALLBACK_MIME
            );
            FALLBACK_MIME
        }
    }
}
