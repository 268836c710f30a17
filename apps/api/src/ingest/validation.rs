use crate::ingest::models::DocumentFormat;
use crate::ingest::IngestError;

/// Resolves the document format from a file name's extension.
///
/// The extension is the text after the last `.`; names without one are rejected.
pub fn validate_extension(file_name: &str) -> Result<DocumentFormat, IngestError> {
    let extension = file_name
        .trim()
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default();

    DocumentFormat::from_extension(extension).ok_or_else(|| IngestError::InvalidFormat {
        extension: extension.to_ascii_lowercase(),
    })
}

/// Rejects uploads strictly larger than `limit`. A file of exactly `limit` bytes is accepted.
pub fn validate_size(size: usize, limit: usize) -> Result<(), IngestError> {
    if size > limit {
        return Err(IngestError::TooLarge { size, limit });
    }
    Ok(())
}

/// Cheap synchronous upload check. Runs before any byte of content is inspected.
/// Extension is checked first, then size.
pub fn validate_upload(
    file_name: &str,
    size: usize,
    limit: usize,
) -> Result<DocumentFormat, IngestError> {
    let format = validate_extension(file_name)?;
    validate_size(size, limit)?;
    Ok(format)
}
