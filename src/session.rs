//! Sequences the two user actions of a datasheet session.
//!
//! A session starts [`SessionState::Idle`]. Every upload moves it to
//! [`SessionState::Extracted`], replacing whatever text was held before, even
//! when extraction fails. Questions are only forwarded to the model while the
//! held text is usable; otherwise the caller gets a precondition error and the
//! model is never contacted.

use crate::document::{ExtractedText, UploadedDocument};
use crate::error::{DatasheetError, Result};
use crate::extraction::TextExtractor;
use crate::prompt::build_request;
use crate::service::AnswerService;
use log::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Extracted {
        file_name: String,
        text: ExtractedText,
    },
}

/// What a successful upload produced, for the presenter to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub file_name: String,
    pub characters: usize,
}

pub struct Session<E, S> {
    extractor: E,
    service: S,
    state: SessionState,
}

impl<E, S> Session<E, S>
where
    E: TextExtractor,
    S: AnswerService,
{
    pub fn new(extractor: E, service: S) -> Self {
        Self {
            extractor,
            service,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(&self.state, SessionState::Extracted { text, .. } if text.is_ready())
    }

    pub fn document_name(&self) -> Option<&str> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Extracted { file_name, .. } => Some(file_name),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Extracts the document and holds the result, success or failure.
    ///
    /// The uploaded bytes are dropped once extraction finishes.
    pub fn on_file_uploaded(&mut self, doc: UploadedDocument) -> Result<UploadSummary> {
        info!("Received '{}' ({} bytes)", doc.file_name, doc.len());
        if doc.is_empty() {
            warn!("'{}' is an empty file", doc.file_name);
        } else if !doc.looks_like_pdf() {
            warn!(
                "'{}' does not look like a PDF (content type {})",
                doc.file_name, doc.content_type
            );
        }

        let UploadedDocument {
            file_name, bytes, ..
        } = doc;
        let text = ExtractedText::from_result(self.extractor.extract(&bytes));
        drop(bytes);

        let outcome = match &text {
            ExtractedText::Ready(content) => {
                let characters = content.chars().count();
                info!("Extracted {} characters from '{}'", characters, file_name);
                Ok(UploadSummary {
                    file_name: file_name.clone(),
                    characters,
                })
            }
            ExtractedText::Failed { reason } => {
                warn!("Extraction failed for '{}': {}", file_name, reason);
                Err(DatasheetError::Extraction {
                    reason: reason.clone(),
                })
            }
        };

        self.state = SessionState::Extracted { file_name, text };
        debug!("Session state: Extracted");
        outcome
    }

    /// Answers a question about the held document.
    pub async fn on_submit(&self, question: &str) -> Result<String> {
        let text = match &self.state {
            SessionState::Idle => return Err(DatasheetError::NoDocumentUploaded),
            SessionState::Extracted {
                text: ExtractedText::Failed { reason },
                ..
            } => {
                return Err(DatasheetError::DocumentUnavailable {
                    reason: reason.clone(),
                })
            }
            SessionState::Extracted {
                text: ExtractedText::Ready(text),
                ..
            } => text,
        };

        let request = build_request(text, question);
        debug!(
            "Built request with {} chars of content",
            request.content.len()
        );
        self.service.ask(&request).await
    }

    /// Forgets the held document.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        debug!("Session state: Idle");
    }
}
