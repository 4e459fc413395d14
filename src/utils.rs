use crate::entities::RemoteFileEntry;
use byte_unit::{Byte, UnitType};

/// File extensions the sync client will download, matched case-insensitively
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 8] = [
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".heic", ".heif",
];

/// Characters that are invalid in filenames on common filesystems
const INVALID_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

impl RemoteFileEntry {
    /// Whether the entry's filename carries a supported image extension
    #[must_use]
    pub fn is_image_file(&self) -> bool {
        has_supported_extension(&self.name)
    }

    /// Human-readable file size, empty when the listing carried no size metadata
    #[must_use]
    pub fn format_size(&self) -> String {
        self.additional
            .as_ref()
            .and_then(|additional| additional.size)
            .map(|size| {
                format!(
                    "{:#.2}",
                    Byte::from(size).get_appropriate_unit(UnitType::Decimal)
                )
            })
            .unwrap_or_default()
    }
}

/// Checks whether a filename ends in one of the supported image extensions
#[must_use]
pub fn has_supported_extension(filename: &str) -> bool {
    let lowered = filename.to_lowercase();
    SUPPORTED_IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lowered.ends_with(ext))
}

/// Checks whether content is an image by inspecting its magic bytes
#[must_use]
pub fn is_image(content: &[u8]) -> bool {
    if content.len() < 4 {
        return false;
    }

    // JPEG: FF D8 FF
    if content.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return true;
    }
    // PNG: 89 50 4E 47
    if content.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return true;
    }
    // GIF: 47 49 46 38
    if content.starts_with(b"GIF8") {
        return true;
    }
    // BMP: 42 4D
    if content.starts_with(b"BM") {
        return true;
    }
    // WEBP: RIFF container with a WEBP fourcc in the header
    if content.starts_with(b"RIFF")
        && content[..content.len().min(12)]
            .windows(4)
            .any(|window| window == b"WEBP")
    {
        return true;
    }

    false
}

/// Replaces characters that are invalid in local filenames with underscores.
///
/// Not applied automatically by the download path; callers that sync shares
/// with untrusted filenames must sanitize before building local paths.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if INVALID_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    // Note this useful idiom: importing names from outer (for mod tests) scope.
    use super::*;
    use crate::entities::FileAdditional;

    impl RemoteFileEntry {
        fn create_test_entry(name: &str) -> RemoteFileEntry {
            RemoteFileEntry {
                name: String::from(name),
                path: format!("/{name}"),
                isdir: false,
                additional: Some(FileAdditional {
                    size: Some(1_234_567),
                    ..Default::default()
                }),
            }
        }
    }

    #[test]
    fn test_is_image_jpeg() {
        assert!(is_image(b"\xff\xd8\xff\xe0\x00\x10JFIF"));
    }

    #[test]
    fn test_is_image_png() {
        assert!(is_image(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn test_is_image_gif() {
        assert!(is_image(b"GIF89a"));
    }

    #[test]
    fn test_is_image_bmp() {
        assert!(is_image(b"BM\x8a\x02"));
    }

    #[test]
    fn test_is_image_webp() {
        assert!(is_image(b"RIFF\x24\x00\x00\x00WEBPVP8 "));
    }

    #[test]
    fn test_is_image_rejects_riff_without_webp() {
        // WAVE is a RIFF container too, but not an image
        assert!(!is_image(b"RIFF\x24\x00\x00\x00WAVEfmt "));
    }

    #[test]
    fn test_is_image_rejects_other_content() {
        assert!(!is_image(b"not an image"));
        assert!(!is_image(b"<html><body>error</body></html>"));
    }

    #[test]
    fn test_is_image_rejects_short_content() {
        assert!(!is_image(b""));
        assert!(!is_image(b"BM\x8a"));
    }

    #[test]
    fn test_has_supported_extension() {
        assert!(has_supported_extension("photo.jpg"));
        assert!(has_supported_extension("photo.JPG"));
        assert!(has_supported_extension("photo.HeIc"));
        assert!(!has_supported_extension("notes.txt"));
        assert!(!has_supported_extension("archive.jpg.zip"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!("test_file_.jpg", sanitize_filename("test<file>.jpg"));
        assert_eq!("a_b_c_d_e_f_g_h_i", sanitize_filename("a<b>c:d\"e/f\\g|h?i"));
        assert_eq!("normal_file.jpg", sanitize_filename("normal_file.jpg"));
    }

    #[test]
    fn test_format_size() {
        let entry = RemoteFileEntry::create_test_entry("photo.jpg");
        assert_eq!("1.23 MB", entry.format_size());
    }

    #[test]
    fn test_format_size_without_metadata() {
        let mut entry = RemoteFileEntry::create_test_entry("photo.jpg");
        entry.additional = None;
        assert_eq!("", entry.format_size());
    }
}
