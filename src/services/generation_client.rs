use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;

use crate::{
    config::Config,
    errors::{AppError, AppResult, GenerationError},
    services::gemini_types::{
        ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse,
        GenerationConfig, Part, StreamEvent,
    },
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Lowercased fragments that mark a throttling or quota failure upstream.
const RATE_LIMIT_MARKERS: [&str; 8] = [
    "error 429",
    "code 429",
    "status 429",
    "resource_exhausted",
    "rate limit",
    "ratelimit",
    "quota",
    "too many requests",
];

pub type FragmentSender = mpsc::Sender<Result<String, GenerationError>>;

/// Per-call model settings. Passed by value to every call; the client keeps
/// no model configuration of its own.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub expect_json: bool,
}

impl GenerationOptions {
    pub fn json(max_output_tokens: u32, temperature: f32) -> Self {
        Self {
            max_output_tokens,
            temperature,
            expect_json: true,
        }
    }

    pub fn plain_text(max_output_tokens: u32, temperature: f32) -> Self {
        Self {
            max_output_tokens,
            temperature,
            expect_json: false,
        }
    }

    pub fn response_mime_type(&self) -> &'static str {
        if self.expect_json {
            "application/json"
        } else {
            "text/plain"
        }
    }
}

/// Seam between the use cases and the text-generation provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// One round trip to the model; returns the raw generated text.
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, GenerationError>;

    /// Forwards generated text into `fragments` as it arrives.
    ///
    /// Returns early with `Ok(())` once the receiving side is gone.
    async fn generate_stream(
        &self,
        prompt: &str,
        options: GenerationOptions,
        fragments: FragmentSender,
    ) -> Result<(), GenerationError>;
}

/// Maps an upstream failure to the pipeline taxonomy.
pub fn classify_failure(status: Option<u16>, message: &str) -> GenerationError {
    let lowered = message.to_ascii_lowercase();
    let throttled =
        status == Some(429) || RATE_LIMIT_MARKERS.iter().any(|marker| lowered.contains(marker));

    if throttled {
        GenerationError::RateLimited(message.to_string())
    } else {
        GenerationError::UpstreamError(message.to_string())
    }
}

fn transport_failure(err: reqwest::Error) -> GenerationError {
    classify_transport(
        err.is_timeout(),
        err.status().map(|s| s.as_u16()),
        &err.to_string(),
    )
}

/// A timeout is never a rate limit, whatever the message says.
fn classify_transport(timed_out: bool, status: Option<u16>, message: &str) -> GenerationError {
    if timed_out {
        return GenerationError::UpstreamError("request to the AI provider timed out".to_string());
    }
    classify_failure(status, message)
}

/// Extracts the text of one `data:` line of the SSE stream.
pub fn parse_sse_line(line: &str) -> Result<Option<String>, GenerationError> {
    let Some(data) = line.trim().strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    match serde_json::from_str::<StreamEvent>(data) {
        Ok(StreamEvent::Chunk(chunk)) => Ok(chunk.text()),
        Ok(StreamEvent::Error(envelope)) => Err(classify_failure(
            envelope.error.code,
            &envelope.error.describe(),
        )),
        Err(err) => Err(GenerationError::UpstreamError(format!(
            "malformed stream event: {err}"
        ))),
    }
}

/// Google Gemini over its REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AppError::InternalError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.gemini_base_url.clone(),
            config.gemini_model.clone(),
            config.gemini_api_key.clone(),
            config.gemini_timeout(),
        )
    }

    pub fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    fn request_body(prompt: &str, options: GenerationOptions) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: options.max_output_tokens,
                temperature: options.temperature,
                response_mime_type: options.response_mime_type(),
            },
        }
    }

    async fn send(
        &self,
        url: &str,
        prompt: &str,
        options: GenerationOptions,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, GenerationError> {
        let mut request = self
            .http
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&Self::request_body(prompt, options));
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(transport_failure)?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|envelope| envelope.error.describe())
            .unwrap_or_else(|_| format!("HTTP {status}: {body}"));

        log::warn!("Gemini request failed with HTTP {}", status);
        Err(classify_failure(Some(status), &message))
    }
}

/// Sends every complete line in `buffer` downstream.
/// Returns `false` once the consumer has gone away.
async fn drain_lines(
    buffer: &mut Vec<u8>,
    fragments: &FragmentSender,
    produced: &mut bool,
) -> Result<bool, GenerationError> {
    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        if let Some(fragment) = parse_sse_line(&String::from_utf8_lossy(&line))? {
            *produced = true;
            if fragments.send(Ok(fragment)).await.is_err() {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, GenerationError> {
        let started = Instant::now();
        let response = self
            .send(
                &self.endpoint("generateContent"),
                prompt,
                options,
                Some(self.timeout),
            )
            .await?;

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerationError::UpstreamError(format!("unreadable AI provider response: {e}"))
        })?;

        log::info!(
            "Gemini call model={} prompt_chars={} max_tokens={} elapsed_ms={}",
            self.model,
            prompt.len(),
            options.max_output_tokens,
            started.elapsed().as_millis()
        );
        if let Some(usage) = &body.usage_metadata {
            log::debug!(
                "Gemini usage prompt_tokens={} output_tokens={} total_tokens={}",
                usage.prompt_token_count,
                usage.candidates_token_count,
                usage.total_token_count
            );
        }

        match body.text() {
            Some(text) => Ok(text),
            None => {
                if let Some(reason) = body.block_reason() {
                    log::warn!("Gemini returned no content, prompt blocked: {}", reason);
                }
                Err(GenerationError::EmptyResponse)
            }
        }
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        options: GenerationOptions,
        fragments: FragmentSender,
    ) -> Result<(), GenerationError> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        // No total deadline on a stream; each read gets the idle timeout instead.
        let response = self.send(&url, prompt, options, None).await?;
        let mut chunks = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut produced = false;

        loop {
            let next = tokio::time::timeout(self.timeout, chunks.next())
                .await
                .map_err(|_| {
                    GenerationError::UpstreamError(
                        "timed out waiting for the AI provider stream".to_string(),
                    )
                })?;
            let Some(chunk) = next else {
                break;
            };

            buffer.extend_from_slice(&chunk.map_err(transport_failure)?);
            if !drain_lines(&mut buffer, &fragments, &mut produced).await? {
                log::debug!("Stream consumer dropped, stopping Gemini stream");
                return Ok(());
            }
        }

        if !buffer.is_empty() {
            buffer.push(b'\n');
            if !drain_lines(&mut buffer, &fragments, &mut produced).await? {
                return Ok(());
            }
        }

        if produced {
            Ok(())
        } else {
            Err(GenerationError::EmptyResponse)
        }
    }
}
