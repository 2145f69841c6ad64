use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasheetError {
    #[error("Error processing PDF: {reason}")]
    Extraction { reason: String },

    #[error("Answer service failed: {reason}")]
    Service { reason: String },

    #[error("API key was rejected by the answer service (status {status}): {details}")]
    CredentialRejected { status: u16, details: String },

    #[error("No API key found: set one of {}", .variables.join(" or "))]
    MissingCredential { variables: Vec<String> },

    #[error("Invalid configuration value for {key}: {reason}")]
    Config { key: String, reason: String },

    #[error("No file uploaded: open a datasheet PDF before asking a question")]
    NoDocumentUploaded,

    #[error("The current datasheet could not be read ({reason}); upload another file before asking")]
    DocumentUnavailable { reason: String },

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DatasheetError {
    /// True for errors caused by the order of user actions rather than a failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NoDocumentUploaded | Self::DocumentUnavailable { .. } | Self::EmptyQuestion
        )
    }

    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service { .. } | Self::CredentialRejected { .. })
    }

    pub(crate) fn extraction(reason: impl Into<String>) -> Self {
        Self::Extraction {
            reason: reason.into(),
        }
    }

    pub(crate) fn service(reason: impl Into<String>) -> Self {
        Self::Service {
            reason: reason.into(),
        }
    }
}

// The request URL carries the API key, so it is stripped before the error is kept.
#[cfg(feature = "gemini")]
impl From<reqwest::Error> for DatasheetError {
    fn from(err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("could not connect: {}", err.without_url())
        } else if err.is_decode() {
            format!("malformed response: {}", err.without_url())
        } else {
            err.without_url().to_string()
        };
        Self::Service { reason }
    }
}

pub type Result<T> = std::result::Result<T, DatasheetError>;
