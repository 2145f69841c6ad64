//! Terminal-facing side of a session: what the user types and what they see.

use crate::document::UploadedDocument;
use crate::error::{DatasheetError, Result};
use crate::extraction::TextExtractor;
use crate::service::AnswerService;
use crate::session::Session;
use std::path::PathBuf;

pub const HELP_TEXT: &str = "\
Commands:
  :open <path>   load a motor datasheet PDF (alias :o)
  :clear         forget the loaded datasheet
  :help          show this help
  :quit          leave (also :exit, quit, exit)
Anything else is sent as a question about the loaded datasheet.";

/// Renders session output. Errors arrive typed so each kind can be worded on its own.
pub trait Presenter {
    fn status(&mut self, message: &str);
    fn success(&mut self, message: &str);
    fn answer(&mut self, text: &str);
    fn error(&mut self, error: &DatasheetError);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Ask(String),
    Clear,
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return Some(Self::Quit);
        }

        let Some(rest) = line.strip_prefix(':') else {
            return Some(Self::Ask(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name {
            "open" | "o" if arg.is_empty() => Self::Invalid(":open needs a file path".to_string()),
            "open" | "o" => Self::Open(PathBuf::from(arg)),
            "clear" => Self::Clear,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => Self::Invalid(format!("unknown command ':{}' (try :help)", other)),
        };
        Some(command)
    }
}

/// Loads a file into the session, refusing anything that is not a PDF.
pub async fn open_document<E, S, P>(
    session: &mut Session<E, S>,
    presenter: &mut P,
    path: PathBuf,
) -> Result<()>
where
    E: TextExtractor,
    S: AnswerService,
    P: Presenter,
{
    let doc = UploadedDocument::from_path(&path).await?;
    if !doc.looks_like_pdf() {
        return Err(DatasheetError::Extraction {
            reason: format!("'{}' is not a PDF file", doc.file_name),
        });
    }

    let summary = session.on_file_uploaded(doc)?;
    if summary.characters == 0 {
        presenter.status(&format!(
            "'{}' contains no extractable text; answers will have nothing to work from.",
            summary.file_name
        ));
    }
    presenter.success("Motor datasheet text extracted successfully!");
    Ok(())
}

pub async fn ask_question<E, S, P>(session: &Session<E, S>, presenter: &mut P, question: &str) -> Result<()>
where
    E: TextExtractor,
    S: AnswerService,
    P: Presenter,
{
    if question.trim().is_empty() {
        return Err(DatasheetError::EmptyQuestion);
    }
    let answer = session.on_submit(question).await?;
    presenter.answer(&answer);
    Ok(())
}

/// Loads `path`, asks one question and reports the outcome through `presenter`.
///
/// Returns `false` when any step failed; the failure has already been shown.
pub async fn answer_once<E, S, P>(
    session: &mut Session<E, S>,
    presenter: &mut P,
    path: PathBuf,
    question: &str,
) -> bool
where
    E: TextExtractor,
    S: AnswerService,
    P: Presenter,
{
    let outcome = match open_document(session, presenter, path).await {
        Ok(()) => ask_question(session, presenter, question).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => true,
        Err(e) => {
            presenter.error(&e);
            false
        }
    }
}

/// Runs one command to completion. Returns `false` once the user asked to leave.
pub async fn run_command<E, S, P>(session: &mut Session<E, S>, presenter: &mut P, command: Command) -> bool
where
    E: TextExtractor,
    S: AnswerService,
    P: Presenter,
{
    let outcome = match command {
        Command::Quit => return false,
        Command::Help => {
            presenter.status(HELP_TEXT);
            Ok(())
        }
        Command::Clear => {
            session.reset();
            presenter.status("Datasheet cleared.");
            Ok(())
        }
        Command::Invalid(message) => {
            presenter.status(&message);
            Ok(())
        }
        Command::Open(path) => open_document(session, presenter, path).await,
        Command::Ask(question) => ask_question(session, presenter, &question).await,
    };

    if let Err(e) = outcome {
        presenter.error(&e);
    }
    true
}
