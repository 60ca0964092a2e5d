//! Attachment encoding and classification.
//!
//! Every file entering the simulator (chat uploads, voice notes, knowledge
//! files) is carried as a base64 payload plus its original MIME type, so it
//! can be inlined into generation requests and previewed via a data URL.

use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Attachment category derived from a MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Pdf,
    Audio,
}

impl AttachmentKind {
    /// Classify a MIME type by substring match.
    ///
    /// Checked in order: "pdf" wins over "audio"; anything unrecognized is
    /// treated as an image.
    pub fn from_mime(mime: &str) -> Self {
        if mime.contains("pdf") {
            Self::Pdf
        } else if mime.contains("audio") {
            Self::Audio
        } else {
            Self::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Audio => "audio",
        }
    }
}

impl std::fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file encoded for transmission: base64 payload plus MIME type.
#[derive(Debug, Clone)]
pub struct EncodedFile {
    pub base64: String,
    pub mime_type: String,
    pub kind: AttachmentKind,
}

impl EncodedFile {
    pub fn from_bytes(data: &[u8], mime_type: &str) -> Self {
        Self {
            base64: base64::engine::general_purpose::STANDARD.encode(data),
            mime_type: mime_type.to_string(),
            kind: AttachmentKind::from_mime(mime_type),
        }
    }

    /// Rebuild the original bytes from the base64 payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, String> {
        decode_base64(&self.base64)
    }

    /// Inline data URL usable as a local preview reference.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Decode a base64 payload back into raw bytes.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, String> {
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| format!("Failed to decode base64: {e}"))
}

/// Guess a MIME type from a file extension.
///
/// Used when ingesting files from disk, where no browser-style type tag is
/// available. Unknown extensions fall back to a generic binary type (and so
/// classify as images).
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") | Some("opus") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_classify_pdf() {
        assert_eq!(AttachmentKind::from_mime("application/pdf"), AttachmentKind::Pdf);
        assert_eq!(AttachmentKind::from_mime("x-pdf-ish"), AttachmentKind::Pdf);
    }

    #[test]
    fn test_classify_audio() {
        assert_eq!(AttachmentKind::from_mime("audio/mpeg"), AttachmentKind::Audio);
        assert_eq!(AttachmentKind::from_mime("audio/webm"), AttachmentKind::Audio);
    }

    #[test]
    fn test_classify_defaults_to_image() {
        assert_eq!(AttachmentKind::from_mime("image/png"), AttachmentKind::Image);
        assert_eq!(AttachmentKind::from_mime("text/plain"), AttachmentKind::Image);
        assert_eq!(AttachmentKind::from_mime(""), AttachmentKind::Image);
    }

    #[test]
    fn test_pdf_wins_over_audio() {
        // A MIME containing both substrings must classify as pdf.
        assert_eq!(AttachmentKind::from_mime("audio/pdf"), AttachmentKind::Pdf);
        assert_eq!(AttachmentKind::from_mime("pdf+audio"), AttachmentKind::Pdf);
    }

    #[test]
    fn test_base64_round_trip() {
        let data = vec![0u8, 1, 2, 255, 128, 42];
        let encoded = EncodedFile::from_bytes(&data, "image/png");
        assert_eq!(encoded.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_round_trip_empty() {
        let encoded = EncodedFile::from_bytes(&[], "image/png");
        assert_eq!(encoded.to_bytes().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_base64("not@valid@base64!").is_err());
    }

    #[test]
    fn test_data_url() {
        let encoded = EncodedFile::from_bytes(b"hi", "text/plain");
        assert_eq!(encoded.data_url(), format!("data:text/plain;base64,{}", encoded.base64));
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(&PathBuf::from("photo.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(&PathBuf::from("doc.pdf")), "application/pdf");
        assert_eq!(mime_for_path(&PathBuf::from("note.ogg")), "audio/ogg");
        assert_eq!(mime_for_path(&PathBuf::from("unknown.xyz")), "application/octet-stream");
        assert_eq!(mime_for_path(&PathBuf::from("noextension")), "application/octet-stream");
    }
}
