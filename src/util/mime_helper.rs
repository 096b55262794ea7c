// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

/// Detect MIME type using content-based detection (infer) with fallback to
/// extension-based (mime_guess)
pub fn detect_mime_type(file_path: &Path, file_content: &[u8]) -> String {
    if let Some(mime_type) = infer::get(file_content) {
        return mime_type.mime_type().to_string();
    }

    let mime_guess = mime_guess::from_path(file_path);
    if let Some(mime_type) = mime_guess.first() {
        return mime_type.to_string();
    }

    "application/octet-stream".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_extension_for_text() {
        let mime = detect_mime_type(Path::new("style.css"), b"body { color: red; }");
        assert_eq!(mime, "text/css");
    }

    #[test]
    fn detects_png_from_content() {
        let png_magic = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0];
        let mime = detect_mime_type(Path::new("image.bin"), &png_magic);
        assert_eq!(mime, "image/png");
    }

    #[test]
    fn defaults_to_octet_stream() {
        let mime = detect_mime_type(Path::new("unknown"), b"");
        assert_eq!(mime, "application/octet-stream");
    }
}
