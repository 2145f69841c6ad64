//! # Datasheet QA
//!
//! Ask free-form questions about a motor datasheet PDF. The text of the PDF is
//! extracted locally and sent, together with the question, to a hosted Gemini
//! model whose answer is shown to the user.
//!
//! ## Flow
//!
//! - **Upload**: [`Session::on_file_uploaded`] extracts the PDF text once and
//!   holds it (or the reason extraction failed) for the rest of the session.
//! - **Submit**: [`Session::on_submit`] lower-cases the held text and the
//!   question, attaches the fixed persona instruction and makes one call to the
//!   [`AnswerService`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use datasheet_qa::*;
//! use datasheet_qa::llm::GeminiClient;
//!
//! let settings = Settings::from_env()?;
//! let client = GeminiClient::new(&settings)?;
//! let mut session = Session::new(PdfTextExtractor::new(), client);
//!
//! let doc = UploadedDocument::from_path("motor.pdf".as_ref()).await?;
//! session.on_file_uploaded(doc)?;
//! let answer = session.on_submit("What is the rated torque?").await?;
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod extraction;
pub mod presenter;
pub mod prompt;
pub mod service;
pub mod session;

#[cfg(feature = "gemini")]
pub mod llm;

pub use config::Settings;
pub use document::{ExtractedText, UploadedDocument};
pub use error::{DatasheetError, Result};
pub use extraction::{PdfTextExtractor, TextExtractor};
pub use presenter::{run_command, Command, Presenter};
pub use prompt::{build_request, AnswerRequest, PERSONA_INSTRUCTION, QUERY_DELIMITER};
pub use service::AnswerService;
pub use session::{Session, SessionState, UploadSummary};
