//! File format registry
//!
//! Maps media files to a [`FileFormat`] either by extension or by sniffing
//! the leading bytes. The format decides which namespaces may be written
//! back (see [`crate::files::policy`]).

use crate::core::error::MetaResult;
use std::fmt;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

/// Broad family of a media format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Rendered still image
    Image,
    /// Camera RAW image
    Raw,
    /// Video container
    Video,
}

/// Media file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FileFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// TIFF image
    Tiff,
    /// HEIC/HEIF image
    Heic,
    /// GIF image
    Gif,
    /// WebP image
    Webp,
    /// Adobe Digital Negative
    Dng,
    /// Canon RAW (TIFF based)
    Cr2,
    /// Canon RAW (ISO base media)
    Cr3,
    /// Nikon RAW
    Nef,
    /// Sony RAW
    Arw,
    /// Olympus RAW
    Orf,
    /// Fujifilm RAW
    Raf,
    /// Panasonic RAW
    Rw2,
    /// QuickTime movie
    Mov,
    /// MPEG-4 video
    Mp4,
    /// iTunes MPEG-4 video
    M4v,
}

impl FileFormat {
    /// Every known format
    pub const ALL: [FileFormat; 17] = [
        FileFormat::Jpeg,
        FileFormat::Png,
        FileFormat::Tiff,
        FileFormat::Heic,
        FileFormat::Gif,
        FileFormat::Webp,
        FileFormat::Dng,
        FileFormat::Cr2,
        FileFormat::Cr3,
        FileFormat::Nef,
        FileFormat::Arw,
        FileFormat::Orf,
        FileFormat::Raf,
        FileFormat::Rw2,
        FileFormat::Mov,
        FileFormat::Mp4,
        FileFormat::M4v,
    ];

    /// Lowercase identifier used in diagnostics and errors
    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Jpeg => "jpeg",
            FileFormat::Png => "png",
            FileFormat::Tiff => "tiff",
            FileFormat::Heic => "heic",
            FileFormat::Gif => "gif",
            FileFormat::Webp => "webp",
            FileFormat::Dng => "dng",
            FileFormat::Cr2 => "cr2",
            FileFormat::Cr3 => "cr3",
            FileFormat::Nef => "nef",
            FileFormat::Arw => "arw",
            FileFormat::Orf => "orf",
            FileFormat::Raf => "raf",
            FileFormat::Rw2 => "rw2",
            FileFormat::Mov => "mov",
            FileFormat::Mp4 => "mp4",
            FileFormat::M4v => "m4v",
        }
    }

    /// File extensions for this format (lowercase, without the dot)
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileFormat::Jpeg => &["jpg", "jpeg", "jpe"],
            FileFormat::Png => &["png"],
            FileFormat::Tiff => &["tif", "tiff"],
            FileFormat::Heic => &["heic", "heif", "hif"],
            FileFormat::Gif => &["gif"],
            FileFormat::Webp => &["webp"],
            FileFormat::Dng => &["dng"],
            FileFormat::Cr2 => &["cr2"],
            FileFormat::Cr3 => &["cr3"],
            FileFormat::Nef => &["nef"],
            FileFormat::Arw => &["arw"],
            FileFormat::Orf => &["orf"],
            FileFormat::Raf => &["raf"],
            FileFormat::Rw2 => &["rw2"],
            FileFormat::Mov => &["mov", "qt"],
            FileFormat::Mp4 => &["mp4"],
            FileFormat::M4v => &["m4v"],
        }
    }

    /// Image, RAW or video
    pub fn kind(&self) -> FormatKind {
        match self {
            FileFormat::Jpeg
            | FileFormat::Png
            | FileFormat::Tiff
            | FileFormat::Heic
            | FileFormat::Gif
            | FileFormat::Webp => FormatKind::Image,
            FileFormat::Dng
            | FileFormat::Cr2
            | FileFormat::Cr3
            | FileFormat::Nef
            | FileFormat::Arw
            | FileFormat::Orf
            | FileFormat::Raf
            | FileFormat::Rw2 => FormatKind::Raw,
            FileFormat::Mov | FileFormat::Mp4 | FileFormat::M4v => FormatKind::Video,
        }
    }

    /// Check if this is a camera RAW format
    pub fn is_raw(&self) -> bool {
        self.kind() == FormatKind::Raw
    }

    /// Check if this is a video container
    pub fn is_video(&self) -> bool {
        self.kind() == FormatKind::Video
    }

    /// Identify a format from the first bytes of a file
    ///
    /// TIFF-based RAW formats other than CR2 share the plain TIFF signature
    /// and are reported as [`FileFormat::Tiff`]; use the extension when the
    /// distinction matters.
    pub fn sniff(header: &[u8]) -> Option<FileFormat> {
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(FileFormat::Jpeg);
        }
        if header.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(FileFormat::Png);
        }
        if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
            return Some(FileFormat::Gif);
        }
        if header.starts_with(b"FUJIFILMCCD-RAW") {
            return Some(FileFormat::Raf);
        }
        if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP" {
            return Some(FileFormat::Webp);
        }
        if header.starts_with(b"II*\0") || header.starts_with(b"MM\0*") {
            if header.len() >= 10 && &header[8..10] == b"CR" {
                return Some(FileFormat::Cr2);
            }
            return Some(FileFormat::Tiff);
        }
        if header.starts_with(b"IIRO") || header.starts_with(b"IIRS") {
            return Some(FileFormat::Orf);
        }
        if header.starts_with(b"IIU\0") {
            return Some(FileFormat::Rw2);
        }
        if header.len() >= 12 && &header[4..8] == b"ftyp" {
            return Some(match &header[8..12] {
                b"heic" | b"heix" | b"heim" | b"heis" | b"hevc" | b"mif1" | b"msf1" => {
                    FileFormat::Heic
                }
                b"crx " => FileFormat::Cr3,
                b"qt  " => FileFormat::Mov,
                b"M4V " | b"M4VH" | b"M4VP" => FileFormat::M4v,
                _ => FileFormat::Mp4,
            });
        }
        None
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FileFormat {
    type Err = crate::core::error::MetaError;

    /// Accepts a format name or any of its extensions, case-insensitively
    fn from_str(s: &str) -> MetaResult<Self> {
        let lower = s.trim_start_matches('.').to_lowercase();
        FileFormat::ALL
            .into_iter()
            .find(|f| f.name() == lower || f.extensions().contains(&lower.as_str()))
            .ok_or_else(|| {
                crate::core::error::MetaError::BadParam(format!("Unknown file format: {}", s))
            })
    }
}

/// Number of leading bytes read for format detection
const SNIFF_LEN: usize = 16;

/// Registry of recognised formats
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    formats: Vec<FileFormat>,
}

impl FormatRegistry {
    /// Create a registry with every known format
    pub fn new() -> Self {
        Self {
            formats: FileFormat::ALL.to_vec(),
        }
    }

    /// Create a registry that recognises nothing
    pub fn empty() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Register a format
    pub fn register(&mut self, format: FileFormat) {
        if !self.formats.contains(&format) {
            self.formats.push(format);
        }
    }

    /// Find a format by file extension (e.g. "jpg", "CR2")
    pub fn find_by_extension(&self, extension: &str) -> Option<FileFormat> {
        let ext_lower = extension.trim_start_matches('.').to_lowercase();
        self.formats
            .iter()
            .copied()
            .find(|f| f.extensions().iter().any(|e| *e == ext_lower))
    }

    /// Find a format from a path's extension
    pub fn find_by_path(&self, path: impl AsRef<Path>) -> Option<FileFormat> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.find_by_extension(ext))
    }

    /// Find a format by sniffing the stream
    ///
    /// The stream position is restored before returning.
    pub fn find_by_detection<R: Read + Seek>(&self, reader: &mut R) -> MetaResult<Option<FileFormat>> {
        let saved_pos = reader.stream_position()?;

        let mut header = Vec::with_capacity(SNIFF_LEN);
        reader.by_ref().take(SNIFF_LEN as u64).read_to_end(&mut header)?;
        reader.seek(SeekFrom::Start(saved_pos))?;

        Ok(FileFormat::sniff(&header).filter(|f| self.formats.contains(f)))
    }

    /// Registered formats
    pub fn formats(&self) -> &[FileFormat] {
        &self.formats
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared registry holding every known format
pub fn default_registry() -> &'static FormatRegistry {
    static REGISTRY: OnceLock<FormatRegistry> = OnceLock::new();
    REGISTRY.get_or_init(FormatRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_find_by_extension() {
        let registry = FormatRegistry::new();
        assert_eq!(registry.find_by_extension("jpg"), Some(FileFormat::Jpeg));
        assert_eq!(registry.find_by_extension("JPEG"), Some(FileFormat::Jpeg));
        assert_eq!(registry.find_by_extension(".tif"), Some(FileFormat::Tiff));
        assert_eq!(registry.find_by_extension("CR2"), Some(FileFormat::Cr2));
        assert_eq!(registry.find_by_extension("m4v"), Some(FileFormat::M4v));
        assert_eq!(registry.find_by_extension("xyz"), None);
        assert_eq!(FormatRegistry::empty().find_by_extension("jpg"), None);
    }

    #[test]
    fn test_find_by_path() {
        let registry = default_registry();
        assert_eq!(registry.find_by_path("/tmp/IMG_0001.HEIC"), Some(FileFormat::Heic));
        assert_eq!(registry.find_by_path("clip.mov"), Some(FileFormat::Mov));
        assert_eq!(registry.find_by_path("README"), None);
    }

    #[test]
    fn test_kinds() {
        assert!(FileFormat::Nef.is_raw());
        assert!(FileFormat::Mp4.is_video());
        assert_eq!(FileFormat::Png.kind(), FormatKind::Image);
        assert!(!FileFormat::Jpeg.is_raw());
    }

    #[test]
    fn test_sniff() {
        assert_eq!(FileFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(FileFormat::Jpeg));
        assert_eq!(FileFormat::sniff(b"GIF89a\0\0"), Some(FileFormat::Gif));
        assert_eq!(FileFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(FileFormat::Webp));
        assert_eq!(FileFormat::sniff(b"II*\0\x10\0\0\0CR\x02\0"), Some(FileFormat::Cr2));
        assert_eq!(FileFormat::sniff(b"MM\0*\0\0\0\x08"), Some(FileFormat::Tiff));
        assert_eq!(FileFormat::sniff(b"\0\0\0\x18ftypheic"), Some(FileFormat::Heic));
        assert_eq!(FileFormat::sniff(b"\0\0\0\x14ftypqt  "), Some(FileFormat::Mov));
        assert_eq!(FileFormat::sniff(b"\0\0\0\x18ftypisom"), Some(FileFormat::Mp4));
        assert_eq!(FileFormat::sniff(b"plain text"), None);
    }

    #[test]
    fn test_find_by_detection_restores_position() {
        let mut reader = Cursor::new(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec());
        let format = default_registry().find_by_detection(&mut reader).unwrap();
        assert_eq!(format, Some(FileFormat::Png));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("tiff".parse::<FileFormat>().unwrap(), FileFormat::Tiff);
        assert_eq!("JPG".parse::<FileFormat>().unwrap(), FileFormat::Jpeg);
        assert!("bmp".parse::<FileFormat>().is_err());
    }
}
