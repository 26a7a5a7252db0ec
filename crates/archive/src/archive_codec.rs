// ---------------------------------------------------------------------------
// archive_codec – AnalysisResult <-> archive bytes
// ---------------------------------------------------------------------------
//
// Encode: bitcode -> LZ4 (size-prepended) -> 28-byte header
// Decode: header check -> LZ4 decompress -> size check -> bitcode

use valuation::AnalysisResult;

use crate::archive_error::ArchiveError;
use crate::file_header::{unwrap_header, wrap_with_header, FileHeader, FLAG_COMPRESSED};

fn payload_size(raw: &[u8]) -> Result<u32, ArchiveError> {
    u32::try_from(raw.len()).map_err(|_| {
        ArchiveError::Encode(format!(
            "encoded analysis is {} bytes, larger than the 4 GiB archive limit",
            raw.len()
        ))
    })
}

/// Encodes `result` as a compressed archive.
pub fn encode_analysis(result: &AnalysisResult) -> Result<Vec<u8>, ArchiveError> {
    let raw = bitcode::encode(result);
    let size = payload_size(&raw)?;
    let compressed = lz4_flex::compress_prepend_size(&raw);
    Ok(wrap_with_header(&compressed, size, FLAG_COMPRESSED))
}

/// Encodes `result` without compression; smaller to build, larger on disk.
pub fn encode_analysis_uncompressed(result: &AnalysisResult) -> Result<Vec<u8>, ArchiveError> {
    let raw = bitcode::encode(result);
    let size = payload_size(&raw)?;
    Ok(wrap_with_header(&raw, size, 0))
}

/// Decodes an archive, returning its header alongside the analysis.
pub fn decode_archive(bytes: &[u8]) -> Result<(FileHeader, AnalysisResult), ArchiveError> {
    let (header, payload) = unwrap_header(bytes)?;
    let raw = if header.is_compressed() {
        lz4_flex::decompress_size_prepended(payload)?
    } else {
        payload.to_vec()
    };
    if raw.len() != header.uncompressed_size as usize {
        return Err(ArchiveError::Decompress(format!(
            "payload is {} bytes, header says {}",
            raw.len(),
            header.uncompressed_size
        )));
    }
    let result = bitcode::decode::<AnalysisResult>(&raw)?;
    Ok((header, result))
}

pub fn decode_analysis(bytes: &[u8]) -> Result<AnalysisResult, ArchiveError> {
    decode_archive(bytes).map(|(_, result)| result)
}
