use crate::config::Settings;
use crate::error::{DatasheetError, Result};
use crate::llm::types::*;
use crate::prompt::AnswerRequest;
use crate::service::AnswerService;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) async fn generate_content(&self, payload: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let res = self.client.post(&url).json(payload).send().await?;
        let status = res.status();
        debug!("Gemini responded with status {}", status);

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(classify_failure(status.as_u16(), &err_text));
        }

        let body: GenerateContentResponse = res.json().await?;
        first_completion_text(body)
    }
}

#[async_trait]
impl AnswerService for GeminiClient {
    async fn ask(&self, request: &AnswerRequest) -> Result<String> {
        info!(
            "Asking {} ({} chars of content)",
            self.model,
            request.content.len()
        );
        let payload = build_payload(request);
        self.generate_content(&payload).await
    }
}

pub fn build_payload(request: &AnswerRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(request.content.clone())],
        system_instruction: Some(Content::system(request.instruction.clone())),
        generation_config: GenerationConfig {
            response_mime_type: "text/plain".to_string(),
            candidate_count: Some(1),
        },
    }
}

/// Joins every text part of the first candidate into one answer.
pub fn first_completion_text(body: GenerateContentResponse) -> Result<String> {
    let candidate = match body.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            let blocked = body
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason);
            return Err(match blocked {
                Some(reason) => DatasheetError::service(format!("prompt blocked: {}", reason)),
                None => DatasheetError::service("No candidates returned"),
            });
        }
    };

    let content = candidate.content.ok_or_else(|| {
        DatasheetError::service(match &candidate.finish_reason {
            Some(reason) => format!("Candidate has no content (finish reason: {})", reason),
            None => "Candidate has no content".to_string(),
        })
    })?;

    let texts: Vec<String> = content
        .parts
        .into_iter()
        .filter_map(|part| match part {
            Part::Text { text } => Some(text),
            Part::Other(_) => None,
        })
        .collect();

    if texts.is_empty() {
        return Err(DatasheetError::service("Model returned non-text content"));
    }
    Ok(texts.concat())
}

/// Maps a non-2xx response onto the error the user should see.
pub fn classify_failure(status: u16, body: &str) -> DatasheetError {
    let details = serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| {
            if parsed.error.status.is_empty() {
                parsed.error.message
            } else {
                format!("{}: {}", parsed.error.status, parsed.error.message)
            }
        })
        .unwrap_or_else(|_| body.trim().to_string());

    let key_rejected =
        matches!(status, 401 | 403) || (status == 400 && body.contains("API_KEY_INVALID"));

    if key_rejected {
        DatasheetError::CredentialRejected { status, details }
    } else {
        DatasheetError::service(format!("Gemini API Error (status {}): {}", status, details))
    }
}
