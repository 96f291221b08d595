/// LLM Client — the single point of entry for all hosted-model calls in BizNexus.
///
/// ARCHITECTURAL RULE: No other module may call the watsonx API directly.
/// All model interactions MUST go through this module. The client returns the
/// generated text as-is; recovering structure from it is `extraction`'s job.
///
/// Model: ibm/granite-3-8b-instruct (hardcoded — do not make configurable to
/// prevent drift)
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub mod prompts;

const GENERATION_URL: &str =
    "https://us-south.ml.cloud.ibm.com/ml/v1/text/generation?version=2023-05-29";
const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";
/// The model used for all LLM calls in BizNexus.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL_ID: &str = "ibm/granite-3-8b-instruct";
const MAX_NEW_TOKENS: u32 = 900;
const MAX_RETRIES: u32 = 3;
/// IAM access tokens live for an hour; refresh a few minutes early.
const TOKEN_TTL: Duration = Duration::from_secs(55 * 60);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("IAM token exchange failed: {0}")]
    Auth(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    input: String,
    parameters: GenerationParameters,
    model_id: &'a str,
    project_id: &'a str,
    moderations: Moderations,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    decoding_method: &'static str,
    max_new_tokens: u32,
    min_new_tokens: u32,
    repetition_penalty: f32,
}

#[derive(Debug, Serialize)]
struct Moderations {
    hap: ModerationConfig,
    pii: ModerationConfig,
}

#[derive(Debug, Serialize)]
struct ModerationConfig {
    input: ModerationRule,
    output: ModerationRule,
}

#[derive(Debug, Serialize)]
struct ModerationRule {
    enabled: bool,
    threshold: f32,
    mask: ModerationMask,
}

#[derive(Debug, Serialize)]
struct ModerationMask {
    remove_entity_value: bool,
}

impl Moderations {
    /// HAP and PII masking on both input and output, threshold 0.5.
    fn masked() -> Self {
        let rule = || ModerationRule {
            enabled: true,
            threshold: 0.5,
            mask: ModerationMask {
                remove_entity_value: true,
            },
        };
        Self {
            hap: ModerationConfig {
                input: rule(),
                output: rule(),
            },
            pii: ModerationConfig {
                input: rule(),
                output: rule(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    results: Vec<GenerationResult>,
}

#[derive(Debug, Deserialize)]
struct GenerationResult {
    generated_text: String,
    input_token_count: Option<u32>,
    generated_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WatsonxError {
    errors: Vec<WatsonxErrorBody>,
}

#[derive(Debug, Deserialize)]
struct WatsonxErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// The single LLM client used by all services in BizNexus.
/// Wraps the watsonx text-generation API with IAM token caching and
/// exponential-backoff retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    project_id: String,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl LlmClient {
    pub fn new(api_key: String, project_id: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            project_id,
            token: Arc::new(Mutex::new(None)),
        }
    }

    /// Generates text for `prompt` under `system`, returning the raw reply.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff;
    /// a 401 invalidates the cached IAM token before the next attempt.
    pub async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let request_body = GenerationRequest {
            input: granite_prompt(system, prompt),
            parameters: GenerationParameters {
                decoding_method: "greedy",
                max_new_tokens: MAX_NEW_TOKENS,
                min_new_tokens: 0,
                repetition_penalty: 1.0,
            },
            model_id: MODEL_ID,
            project_id: &self.project_id,
            moderations: Moderations::masked(),
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let token = match self.access_token().await {
                Ok(t) => t,
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            };

            let response = self
                .client
                .post(GENERATION_URL)
                .bearer_auth(&token)
                .header("accept", "application/json")
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 401 {
                // Token rejected server-side; drop the cache and retry.
                self.token.lock().await.take();
                last_error = Some(LlmError::Auth("access token rejected".to_string()));
                continue;
            }

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Try to parse error message
                let message = serde_json::from_str::<WatsonxError>(&body)
                    .ok()
                    .and_then(|e| e.errors.into_iter().next())
                    .map(|e| e.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let generation: GenerationResponse = serde_json::from_str(&body)?;
            let result = generation
                .results
                .into_iter()
                .next()
                .ok_or(LlmError::EmptyContent)?;

            debug!(
                "LLM call succeeded: input_tokens={:?}, output_tokens={:?}",
                result.input_token_count, result.generated_token_count
            );

            return Ok(result.generated_text);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Returns a cached IAM access token, exchanging the apikey when the
    /// cache is empty or stale.
    async fn access_token(&self) -> Result<String, LlmError> {
        let mut cached = self.token.lock().await;
        if let Some(t) = cached.as_ref() {
            if t.fetched_at.elapsed() < TOKEN_TTL {
                return Ok(t.token.clone());
            }
        }

        let response = self
            .client
            .post(IAM_TOKEN_URL)
            .header("content-type", "application/x-www-form-urlencoded")
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Auth(format!("IAM returned {status}: {body}")));
        }

        let token: IamTokenResponse = response.json().await?;
        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            token: token.access_token,
            fetched_at: Instant::now(),
        });

        debug!("IAM access token refreshed");
        Ok(access_token)
    }
}

/// Wraps system and user text in the Granite chat template.
fn granite_prompt(system: &str, user: &str) -> String {
    format!(
        "<|start_of_role|>system<|end_of_role|>{system}<|end_of_text|>\n\
         <|start_of_role|>user<|end_of_role|>{user}<|end_of_text|>\n\
         <|start_of_role|>assistant<|end_of_role|>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granite_prompt_wraps_all_roles() {
        let prompt = granite_prompt("be helpful", "what is HR?");
        assert!(prompt.starts_with("<|start_of_role|>system<|end_of_role|>be helpful"));
        assert!(prompt.contains("<|start_of_role|>user<|end_of_role|>what is HR?"));
        assert!(prompt.ends_with("<|start_of_role|>assistant<|end_of_role|>"));
    }

    #[test]
    fn test_generation_request_serializes_moderations() {
        let body = GenerationRequest {
            input: granite_prompt("s", "u"),
            parameters: GenerationParameters {
                decoding_method: "greedy",
                max_new_tokens: MAX_NEW_TOKENS,
                min_new_tokens: 0,
                repetition_penalty: 1.0,
            },
            model_id: MODEL_ID,
            project_id: "proj",
            moderations: Moderations::masked(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model_id"], "ibm/granite-3-8b-instruct");
        assert_eq!(json["parameters"]["decoding_method"], "greedy");
        assert_eq!(json["moderations"]["hap"]["input"]["enabled"], true);
        assert_eq!(
            json["moderations"]["pii"]["output"]["mask"]["remove_entity_value"],
            true
        );
    }

    #[test]
    fn test_generation_response_deserializes() {
        let json = r#"{
            "results": [
                {"generated_text": "72% chance", "input_token_count": 40, "generated_token_count": 12}
            ]
        }"#;
        let parsed: GenerationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results[0].generated_text, "72% chance");
        assert_eq!(parsed.results[0].generated_token_count, Some(12));
    }
}
