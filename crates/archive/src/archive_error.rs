// ---------------------------------------------------------------------------
// ArchiveError: typed errors for archive encode/decode and file I/O
// ---------------------------------------------------------------------------

use std::fmt;

#[derive(Debug)]
pub enum ArchiveError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// The encoded analysis does not fit the header's 32-bit size field.
    Encode(String),
    /// Bitcode decoding failed (corrupt or incompatible payload).
    Decode(String),
    /// The file does not start with the archive magic bytes.
    BadMagic,
    /// Fewer bytes than a complete header.
    Truncated { len: usize },
    /// Archive format is newer than this build supports.
    VersionMismatch { expected_max: u32, found: u32 },
    /// Payload checksum does not match the header.
    ChecksumMismatch { expected: u32, computed: u32 },
    /// LZ4 decompression failed or produced the wrong size.
    Decompress(String),
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Io(e) => write!(f, "I/O error: {e}"),
            ArchiveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            ArchiveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            ArchiveError::BadMagic => write!(f, "Not an analysis archive (bad magic bytes)"),
            ArchiveError::Truncated { len } => write!(
                f,
                "Archive is too short ({len} bytes, need at least {} for header)",
                crate::file_header::HEADER_SIZE
            ),
            ArchiveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: archive is v{found}, but this build only supports up to v{expected_max}"
            ),
            ArchiveError::ChecksumMismatch { expected, computed } => write!(
                f,
                "Archive is corrupted: checksum mismatch (expected {expected:#010X}, got {computed:#010X})"
            ),
            ArchiveError::Decompress(msg) => write!(f, "Decompression error: {msg}"),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(e: std::io::Error) -> Self {
        ArchiveError::Io(e)
    }
}

impl From<bitcode::Error> for ArchiveError {
    fn from(e: bitcode::Error) -> Self {
        ArchiveError::Decode(e.to_string())
    }
}

impl From<lz4_flex::block::DecompressError> for ArchiveError {
    fn from(e: lz4_flex::block::DecompressError) -> Self {
        ArchiveError::Decompress(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_io() {
        let err = ArchiveError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("I/O error"), "got: {msg}");
        assert!(msg.contains("file not found"), "got: {msg}");
    }

    #[test]
    fn test_display_version_mismatch() {
        let err = ArchiveError::VersionMismatch {
            expected_max: 1,
            found: 7,
        };
        let msg = format!("{err}");
        assert!(msg.contains("v7"), "got: {msg}");
        assert!(msg.contains("v1"), "got: {msg}");
    }

    #[test]
    fn test_display_checksum() {
        let err = ArchiveError::ChecksumMismatch {
            expected: 0xDEAD_BEEF,
            computed: 0x0000_0001,
        };
        let msg = format!("{err}");
        assert!(msg.contains("0xDEADBEEF"), "got: {msg}");
        assert!(msg.contains("corrupted"), "got: {msg}");
    }

    #[test]
    fn test_display_truncated() {
        let msg = format!("{}", ArchiveError::Truncated { len: 5 });
        assert!(msg.contains("5 bytes"), "got: {msg}");
        assert!(msg.contains("28"), "got: {msg}");
    }

    #[test]
    fn test_source_only_for_io() {
        let io = ArchiveError::Io(std::io::Error::new(std::io::ErrorKind::Other, "x"));
        assert!(std::error::Error::source(&io).is_some());
        assert!(std::error::Error::source(&ArchiveError::BadMagic).is_none());
    }
}
