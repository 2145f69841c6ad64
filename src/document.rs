use crate::error::{DatasheetError, Result};
use std::path::Path;
use tokio::fs;

const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MIME: &str = "application/pdf";

/// Raw bytes of a file the user handed over, plus naming hints.
///
/// Only lives for the duration of one upload; the session keeps the derived
/// text, never the bytes.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                DatasheetError::IoError(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("'{}' does not name a file", path.display()),
                ))
            })?
            .to_string();

        let bytes = fs::read(path).await?;
        Ok(Self::from_bytes(file_name, bytes))
    }

    pub fn looks_like_pdf(&self) -> bool {
        self.content_type == PDF_MIME || self.bytes.starts_with(PDF_MAGIC)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Text held by a session after an upload: either usable content or the
/// reason it could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedText {
    Ready(String),
    Failed { reason: String },
}

impl ExtractedText {
    pub fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(text) => Self::Ready(text),
            Err(DatasheetError::Extraction { reason }) => Self::Failed { reason },
            Err(other) => Self::Failed {
                reason: other.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_type_guessed_from_name() {
        let doc = UploadedDocument::from_bytes("motor.PDF", vec![1, 2, 3]);
        assert_eq!(doc.content_type, "application/pdf");
        assert!(doc.looks_like_pdf());

        let doc = UploadedDocument::from_bytes("notes.txt", b"hello".to_vec());
        assert_eq!(doc.content_type, "text/plain");
        assert!(!doc.looks_like_pdf());
    }

    #[test]
    fn test_magic_header_counts_as_pdf() {
        let doc = UploadedDocument::from_bytes("download", b"%PDF-1.7\n...".to_vec());
        assert_eq!(doc.content_type, "application/octet-stream");
        assert!(doc.looks_like_pdf());
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sheet.pdf");
        std::fs::write(&path, b"%PDF-1.5 body").unwrap();

        let doc = UploadedDocument::from_path(&path).await.unwrap();
        assert_eq!(doc.file_name, "sheet.pdf");
        assert_eq!(doc.len(), 13);

        let missing = UploadedDocument::from_path(&dir.path().join("absent.pdf")).await;
        assert!(matches!(missing, Err(DatasheetError::IoError(_))));
    }

    #[test]
    fn test_extracted_text_from_result() {
        let ready = ExtractedText::from_result(Ok("rated power: 5kw".into()));
        assert_eq!(ready, ExtractedText::Ready("rated power: 5kw".into()));
        assert!(ready.is_ready());

        let failed = ExtractedText::from_result(Err(DatasheetError::extraction("bad xref")));
        assert_eq!(
            failed,
            ExtractedText::Failed {
                reason: "bad xref".into()
            }
        );
        assert!(!failed.is_ready());
    }
}
