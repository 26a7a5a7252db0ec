// ---------------------------------------------------------------------------
// file_header – Archive header with magic bytes, version, flags and checksum
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "LVAL"
//   [4..8]   Format version (u32)
//   [8..12]  Flags (u32: bit 0 = LZ4-compressed payload)
//   [12..20] Timestamp (Unix epoch seconds, u64)
//   [20..24] Uncompressed payload size (u32)
//   [24..28] xxHash32 checksum of the stored payload (everything after the header)

use xxhash_rust::xxh32::xxh32;

use crate::archive_error::ArchiveError;

pub const MAGIC: [u8; 4] = *b"LVAL";

pub const HEADER_SIZE: usize = 28;

/// Bump when the header layout or the payload schema changes.
pub const ARCHIVE_FORMAT_VERSION: u32 = 1;

pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub timestamp: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    /// Header for `payload` as stored on disk, stamped with the current time.
    pub fn new(payload: &[u8], uncompressed_size: u32, flags: u32) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            format_version: ARCHIVE_FORMAT_VERSION,
            flags,
            timestamp,
            uncompressed_size,
            checksum: xxh32(payload, XXHASH_SEED),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.format_version.to_le_bytes());
        out[8..12].copy_from_slice(&self.flags.to_le_bytes());
        out[12..20].copy_from_slice(&self.timestamp.to_le_bytes());
        out[20..24].copy_from_slice(&self.uncompressed_size.to_le_bytes());
        out[24..28].copy_from_slice(&self.checksum.to_le_bytes());
        out
    }
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Prepends a header to an already-encoded payload.
pub fn wrap_with_header(payload: &[u8], uncompressed_size: u32, flags: u32) -> Vec<u8> {
    let header = FileHeader::new(payload, uncompressed_size, flags);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(payload);
    out
}

/// Parses and validates the header, returning it with the payload slice.
///
/// # Errors
///
/// - `BadMagic` if the file does not start with `"LVAL"`
/// - `Truncated` if the magic is present but the header is incomplete
/// - `VersionMismatch` for archives from a newer build
/// - `ChecksumMismatch` if the payload was modified or damaged
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), ArchiveError> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
        return Err(ArchiveError::BadMagic);
    }
    if bytes.len() < HEADER_SIZE {
        return Err(ArchiveError::Truncated { len: bytes.len() });
    }

    let format_version = le_u32(bytes, 4);
    if format_version > ARCHIVE_FORMAT_VERSION {
        return Err(ArchiveError::VersionMismatch {
            expected_max: ARCHIVE_FORMAT_VERSION,
            found: format_version,
        });
    }

    let header = FileHeader {
        format_version,
        flags: le_u32(bytes, 8),
        timestamp: u64::from_le_bytes([
            bytes[12], bytes[13], bytes[14], bytes[15], bytes[16], bytes[17], bytes[18], bytes[19],
        ]),
        uncompressed_size: le_u32(bytes, 20),
        checksum: le_u32(bytes, 24),
    };

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(ArchiveError::ChecksumMismatch {
            expected: header.checksum,
            computed,
        });
    }

    Ok((header, payload))
}
