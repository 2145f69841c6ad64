use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use datasheet_qa::llm::GeminiClient;
use datasheet_qa::presenter::answer_once;
use datasheet_qa::{run_command, Command, DatasheetError, PdfTextExtractor, Presenter, Session, Settings};

#[derive(Parser)]
#[command(name = "datasheet-qa")]
#[command(about = "Motor Datasheet Analyzer: ask questions about a datasheet PDF")]
#[command(version)]
struct Cli {
    /// Datasheet PDF to load before the first question
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Ask a single question about --file and exit
    #[arg(short, long, requires = "file")]
    question: Option<String>,

    /// Gemini model to use (overrides DATASHEET_QA_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Request timeout in seconds (overrides DATASHEET_QA_TIMEOUT_SECS)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,
}

struct Terminal;

impl Presenter for Terminal {
    fn status(&mut self, message: &str) {
        println!("{}", message);
    }

    fn success(&mut self, message: &str) {
        println!("✅ {}", message);
    }

    fn answer(&mut self, text: &str) {
        println!("\nThe Response is:\n\n{}\n", text);
        println!("------------------------------------------------------------------");
    }

    fn error(&mut self, error: &DatasheetError) {
        if error.is_precondition() {
            eprintln!("⚠️  {}", error);
        } else {
            eprintln!("❌ {}", error);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if let Some(model) = cli.model {
        settings = settings.with_model(model);
    }
    if let Some(secs) = cli.timeout {
        settings = settings.with_timeout(Duration::from_secs(secs));
    }

    let client = GeminiClient::new(&settings)?;
    let mut session = Session::new(PdfTextExtractor::new(), client);
    let mut terminal = Terminal;

    if let (Some(path), Some(question)) = (cli.file.clone(), cli.question) {
        if !answer_once(&mut session, &mut terminal, path, &question).await {
            std::process::exit(1);
        }
        return Ok(());
    }

    println!("Motor Datasheet Analyzer (using {})", session.service().model());
    println!("Type :help for commands.\n");

    if let Some(path) = cli.file {
        run_command(&mut session, &mut terminal, Command::Open(path)).await;
    }

    loop {
        match session.document_name() {
            Some(name) => print!("[{}] > ", name),
            None => print!("> "),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let Some(command) = Command::parse(&input) else {
            continue;
        };

        if matches!(command, Command::Ask(_)) {
            println!("\nThinking...");
        }

        if !run_command(&mut session, &mut terminal, command).await {
            break;
        }
    }

    Ok(())
}
