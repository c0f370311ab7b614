use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::CompletionClient;
use crate::domain::{DomainError, Message};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Fixed instruction preamble sent as the system entry of every request,
/// establishing the assistant's persona and behavioral constraints.
const SYSTEM_PROMPT: &str = "\
Você é um assistente espiritual fundamentado na codificação espírita de \
Allan Kardec.

Regras:
1. Responda no idioma em que o usuário escrever.
2. Fundamente as respostas nas obras da codificação: O Livro dos \
Espíritos, O Evangelho Segundo o Espiritismo e as demais.
3. Acolha quem pergunta com compaixão; nunca julgue.
4. Não faça previsões, diagnósticos ou promessas de cura.
5. Quando a conversa fugir do tema espiritual, conduza-a de volta com \
gentileza.";

/// Fixed text substituted when a successful response carries no reply
/// content. Treated as a soft failure, never raised.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "Recebi sua mensagem, mas não \
consegui formular uma resposta agora. Pode reformular sua pergunta?";

/// OpenAI Chat Completions API request payload.
#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Minimal subset of the Chat Completions response we care about.
#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// HTTP client for OpenAI-compatible chat-completion endpoints.
///
/// Implements [`CompletionClient`] so the rest of the crate stays decoupled
/// from transport and serialization details. Each call issues exactly one
/// POST with the fixed persona preamble first and the full history after
/// it, every entry carrying its text verbatim in original order.
///
/// **API key**: a static bearer credential read from `OPENAI_API_KEY` at
/// construction time, not request-scoped and not rotated. Override the
/// endpoint and model via environment variables:
///
/// ```text
/// OPENAI_BASE_URL=https://api.openai.com
/// OPENAI_API_KEY=sk-...
/// OPENAI_MODEL=gpt-4o-mini
/// ```
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        self.base_url = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Construct from environment variables:
    /// - `OPENAI_API_KEY`  — required; returns `None` when absent
    /// - `OPENAI_BASE_URL` — optional; defaults to `https://api.openai.com`
    /// - `OPENAI_MODEL`    — optional; defaults to `gpt-4o-mini`
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("OPENAI_API_KEY").ok()?;
        let model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let mut client = Self::new(key, model);
        if let Ok(base) = std::env::var("OPENAI_BASE_URL") {
            client = client.with_base_url(base);
        }
        Some(client)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Wire message list: the fixed preamble first, then every history
    /// entry mapped to `{role, content}` in original order.
    fn build_messages(history: &[Message]) -> Vec<ApiMessage<'_>> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ApiMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        });
        for entry in history {
            messages.push(ApiMessage {
                role: entry.sender().as_role(),
                content: entry.text(),
            });
        }
        messages
    }

    /// Text of the first choice, or the fixed placeholder when the reply
    /// field is absent.
    fn extract_reply(response: ApiResponse) -> String {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| EMPTY_REPLY_PLACEHOLDER.to_string())
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, history: &[Message]) -> Result<String, DomainError> {
        let request = ApiRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: Self::build_messages(history),
        };
        let url = format!("{}{}", self.base_url, COMPLETIONS_PATH);
        debug!("Requesting completion for {} history entries", history.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::completion(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Completion endpoint returned {status}: {body}");
            return Err(DomainError::completion(format!(
                "endpoint returned {status}"
            )));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| DomainError::parse(format!("malformed completion response: {e}")))?;

        Ok(Self::extract_reply(api_response))
    }
}
