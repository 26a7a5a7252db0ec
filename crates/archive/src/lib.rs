//! Immutable binary archives of finished analyses.
//!
//! An archive is a 28-byte header followed by an LZ4-compressed bitcode
//! encoding of one [`AnalysisResult`]. Archives are written once and never
//! edited; re-running a site produces a new archive.

use std::path::Path;

use bevy::log::info;
use valuation::AnalysisResult;

pub mod archive_codec;
pub mod archive_error;
pub mod atomic_write;
pub mod file_header;

pub use archive_codec::{decode_analysis, decode_archive, encode_analysis};
pub use archive_error::ArchiveError;
pub use file_header::FileHeader;

/// Encodes `result` and writes it atomically to `path`.
pub fn write_archive(path: &Path, result: &AnalysisResult) -> Result<usize, ArchiveError> {
    let bytes = encode_analysis(result)?;
    atomic_write::atomic_write(path, &bytes)?;
    info!(
        "Archived analysis ({} bytes, score {}) to {}",
        bytes.len(),
        result.composite_score,
        path.display()
    );
    Ok(bytes.len())
}

pub fn read_archive(path: &Path) -> Result<(FileHeader, AnalysisResult), ArchiveError> {
    let bytes = std::fs::read(path)?;
    decode_archive(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation::rate_tables::RateTables;
    use valuation::run_analysis;
    use valuation::test_harness::reference_request;

    #[test]
    fn test_write_then_read() {
        let dir = std::env::temp_dir().join("landval_archive_roundtrip");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("reference.lval");

        let result = run_analysis(&reference_request(), &RateTables::default()).unwrap();
        let written = write_archive(&path, &result).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, written);

        let (header, back) = read_archive(&path).unwrap();
        assert!(header.timestamp > 0);
        assert_eq!(back, result);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("landval_archive_missing/nope.lval");
        assert!(matches!(read_archive(&path), Err(ArchiveError::Io(_))));
    }
}
