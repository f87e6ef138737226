//! MIME handling for binary messages.
//!
//! Used when the platform supplies no file name: the stored extension is
//! inferred from the declared content type.

/// Extension (without dot) for a declared content type.
///
/// Fixed convention: `audio/mp4` maps to `m4a` (the container the platform
/// actually sends for voice notes), every other audio type to `mp3`.
pub fn infer_extension(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "audio/mp4" | "audio/x-m4a" => "m4a",
        t if t.starts_with("image/") => "jpg",
        t if t.starts_with("video/") => "mp4",
        t if t.starts_with("audio/") => "mp3",
        _ => "bin",
    }
}

/// Fallback MIME type for a message kind when the platform reports none.
pub fn default_mime_for_kind(kind: &str) -> &'static str {
    match kind {
        "image" => "image/jpeg",
        "video" => "video/mp4",
        "audio" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_mp4_maps_to_m4a() {
        assert_eq!(infer_extension("audio/mp4"), "m4a");
    }

    #[test]
    fn image_jpeg_maps_to_jpg() {
        assert_eq!(infer_extension("image/jpeg"), "jpg");
    }

    #[test]
    fn parameters_are_ignored() {
        assert_eq!(infer_extension("image/png; charset=binary"), "jpg");
    }

    #[test]
    fn unknown_type_falls_back_to_bin() {
        assert_eq!(infer_extension("application/pdf"), "bin");
    }

    #[test]
    fn kind_defaults() {
        assert_eq!(default_mime_for_kind("image"), "image/jpeg");
        assert_eq!(default_mime_for_kind("audio"), "audio/mp4");
        assert_eq!(default_mime_for_kind("file"), "application/octet-stream");
    }
}
