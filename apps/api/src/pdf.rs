//! PDF text extraction and content hashing for uploaded CVs.

use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

/// Extracts the text of every page. Parsing is CPU-bound, so it runs on the blocking pool.
pub async fn extract_text(bytes: Bytes) -> Result<String, AppError> {
    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?;

    debug!("Extracted {} chars from {} byte PDF", text.len(), size);
    Ok(text)
}

/// Content hash identifying a document across sessions (blake3, lowercase hex).
pub fn file_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn is_pdf(file_name: &str, content_type: Option<&str>) -> bool {
    let by_extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    by_extension || content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_hash_is_stable_hex() {
        let a = file_hash(b"%PDF-1.4 same bytes");
        let b = file_hash(b"%PDF-1.4 same bytes");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_file_hash_differs_for_different_bytes() {
        assert_ne!(file_hash(b"cv one"), file_hash(b"cv two"));
    }

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf("Resume.PDF", None));
        assert!(is_pdf("upload", Some("application/pdf")));
        assert!(!is_pdf("resume.docx", Some("application/octet-stream")));
        assert!(!is_pdf("pdf", None));
    }

    #[tokio::test]
    async fn test_extract_text_rejects_garbage() {
        let err = extract_text(Bytes::from_static(b"definitely not a pdf")).await.unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }
}
