//! Review Client
//!
//! Produces review text for one catalog entry. Owns the pacing state (the
//! timestamp of its last outbound request), talks to the completion service
//! through a [`CompletionTransport`], and retries rate limits, server errors
//! and network failures with exponential backoff. Every failure comes back as
//! a [`ReviewError`] value; nothing here panics on a bad response.

use crate::catalog::MusicEntry;
use crate::config::{ApiConfig, AppConfig};
use crate::error::ReviewError;
use crate::pacing::{remaining_interval, Clock, PacingConfig, TokioClock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub mod prompt;
pub mod thinking;
pub mod transport;

pub use transport::{
    ChatCompletionRequest, ChatMessage, CompletionTransport, HttpTransport, MessageRole,
    TransportResponse,
};

use transport::ChatCompletionResponse;

/// Model label recorded on reviews produced without the service.
pub const SIMULATION_MODEL: &str = "simulation";

/// Where completions come from.
pub enum Backend {
    Remote(Box<dyn CompletionTransport>),
    /// Placeholder text, no network
    Simulation,
}

/// Generation parameters fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub model: String,
    pub temperature: f32,
    pub keep_thinking: bool,
    pub pacing: PacingConfig,
}

impl ClientSettings {
    pub fn from_config(api: &ApiConfig, pacing: &PacingConfig) -> Self {
        Self {
            model: api.model.clone(),
            temperature: api.temperature,
            keep_thinking: api.keep_thinking,
            pacing: pacing.clone(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default(), &PacingConfig::default())
    }
}

/// Generated review text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub text: String,
    pub model: String,
}

pub struct ReviewClient {
    backend: Backend,
    settings: ClientSettings,
    clock: Arc<dyn Clock>,
    last_request: Option<Instant>,
}

impl ReviewClient {
    pub fn new(backend: Backend, settings: ClientSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            settings,
            clock,
            last_request: None,
        }
    }

    /// Build the client a run configuration asks for.
    ///
    /// Simulation never needs a credential; a live client without one is a
    /// fatal configuration error.
    pub fn from_config(config: &AppConfig) -> Result<Self, ReviewError> {
        let settings = ClientSettings::from_config(&config.api, &config.pacing);
        let clock: Arc<dyn Clock> = Arc::new(TokioClock);

        if config.batch.simulate {
            info!("Simulation mode: reviews are placeholders, no API calls are made");
            return Ok(Self::new(Backend::Simulation, settings, clock));
        }

        let api_key = config.api.resolve_api_key()?;
        let transport = HttpTransport::new(
            config.api.endpoint.clone(),
            api_key,
            Duration::from_secs(config.api.timeout_secs),
        )?;
        Ok(Self::new(
            Backend::Remote(Box::new(transport)),
            settings,
            clock,
        ))
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self.backend, Backend::Simulation)
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Request body for one entry.
    pub fn build_request(&self, entry: &MusicEntry) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            messages: vec![ChatMessage::user(prompt::build_prompt(entry))],
            include_reasoning: self.settings.keep_thinking.then_some(true),
        }
    }

    /// Generate the review for one entry.
    pub async fn generate_review(&mut self, entry: &MusicEntry) -> Result<Review, ReviewError> {
        let transport = match &self.backend {
            Backend::Simulation => {
                debug!(title = %entry.title, "Synthesizing placeholder review");
                return Ok(Review {
                    text: prompt::simulated_review(entry),
                    model: SIMULATION_MODEL.to_string(),
                });
            }
            Backend::Remote(transport) => transport,
        };

        let pacing = &self.settings.pacing;
        if let Some(wait) = remaining_interval(
            self.last_request,
            self.clock.now(),
            pacing.min_request_interval(),
        ) {
            info!(
                wait_secs = wait.as_secs_f64(),
                "Rate limiting: sleeping before next request"
            );
            self.clock.sleep(wait).await;
        }

        let request = self.build_request(entry);
        let max_attempts = pacing.max_attempts.max(1);
        let mut last_error: Option<ReviewError> = None;

        for attempt in 0..max_attempts {
            self.last_request = Some(self.clock.now());
            info!(
                title = %entry.title,
                endpoint = transport.endpoint(),
                attempt = attempt + 1,
                max_attempts,
                "Sending completion request"
            );

            let result = send_once(
                transport.as_ref(),
                &request,
                entry,
                pacing,
                attempt,
                self.settings.keep_thinking,
            )
            .await;

            let err = match result {
                Ok(text) => {
                    return Ok(Review {
                        text,
                        model: self.settings.model.clone(),
                    })
                }
                Err(err) if err.is_retryable() => err,
                Err(err) => {
                    error!(title = %entry.title, error = %err, "Review generation failed");
                    return Err(err);
                }
            };

            let wait = match &err {
                ReviewError::RateLimited { retry_after_secs } => {
                    Duration::from_secs(*retry_after_secs)
                }
                _ => pacing.backoff(attempt),
            };
            let is_last = attempt + 1 == max_attempts;
            warn!(
                title = %entry.title,
                attempt = attempt + 1,
                max_attempts,
                wait_secs = if is_last { 0 } else { wait.as_secs() },
                error = %err,
                "Retryable failure from completion service"
            );
            if !is_last {
                self.clock.sleep(wait).await;
            }
            last_error = Some(err);
        }

        let last_error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempt made".to_string());
        error!(
            title = %entry.title,
            attempts = max_attempts,
            error = %last_error,
            "Giving up on review after exhausting retries"
        );
        Err(ReviewError::RetriesExhausted {
            title: entry.title.clone(),
            attempts: max_attempts,
            last_error,
        })
    }
}

/// One request/response exchange, classified.
async fn send_once(
    transport: &dyn CompletionTransport,
    request: &ChatCompletionRequest,
    entry: &MusicEntry,
    pacing: &PacingConfig,
    attempt: u32,
    keep_thinking: bool,
) -> Result<String, ReviewError> {
    let response = transport.send(request).await?;
    debug!(
        title = %entry.title,
        status = response.status,
        attempt = attempt + 1,
        "Completion response received"
    );
    match response.status {
        200..=299 => extract_completion(&response.body, &entry.title, keep_thinking),
        429 => Err(ReviewError::RateLimited {
            retry_after_secs: response
                .retry_after_secs()
                .unwrap_or_else(|| pacing.backoff(attempt).as_secs()),
        }),
        status @ 500..=599 => Err(ReviewError::ServerError {
            status,
            body: response.body,
        }),
        status => Err(ReviewError::RequestRejected {
            status,
            body: response.body,
        }),
    }
}

/// Pull `choices[0].message.content` out of a successful response body.
fn extract_completion(body: &str, title: &str, keep_thinking: bool) -> Result<String, ReviewError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| ReviewError::InvalidResponse(e.to_string()))?;
    if let Some(model) = &parsed.model {
        debug!(model = %model, "Completion received");
    }

    let message = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message);
    let (content, reasoning) = match message {
        Some(message) => (
            message.content.unwrap_or_default(),
            message.reasoning_content,
        ),
        None => (String::new(), None),
    };

    let text = if keep_thinking {
        thinking::merge_reasoning(&content, reasoning.as_deref())
    } else {
        thinking::strip_thinking(&content)
    };

    if text.trim().is_empty() {
        error!(title = %title, "Empty response received");
        return Err(ReviewError::EmptyCompletion {
            title: title.to_string(),
        });
    }
    Ok(text)
}
