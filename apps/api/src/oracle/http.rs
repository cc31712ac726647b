//! HttpOracle — a hosted sequence-to-sequence model behind an inference endpoint.
//!
//! Request shape follows the Hugging Face Inference API for text2text models:
//! `POST {endpoint}/models/{model}` with `{inputs, parameters, options}`,
//! answered by `[{"generated_text": "..."}]`.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::oracle::{GenerationOracle, GenerationParams, OracleError};

/// Prompt used to prove the model answers before the service starts taking traffic.
const WARMUP_PROMPT: &str = "generate keywords: warmup";

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_length: u32,
    num_beams: u32,
    do_sample: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct InferenceError {
    error: String,
}

/// Oracle backed by a remote inference endpoint. One instance per process,
/// shared behind `GuardedOracle`, which owns timeouts and retries.
pub struct HttpOracle {
    client: Client,
    url: Url,
    model: String,
    token: Option<String>,
    /// Context window in whitespace-delimited units; longer prompts are cut here.
    max_input_length: usize,
}

impl HttpOracle {
    /// Builds the oracle. Any failure here is fatal for the process.
    pub fn new(config: &Config) -> Result<Self, OracleError> {
        let model = config.model_name.trim();
        if model.is_empty() {
            return Err(OracleError::Load("model identifier is empty".to_string()));
        }

        let base = Url::parse(config.oracle.endpoint.trim_end_matches('/')).map_err(|e| {
            OracleError::Load(format!(
                "invalid oracle endpoint '{}': {e}",
                config.oracle.endpoint
            ))
        })?;
        let url = Url::parse(&format!("{}/models/{model}", base.as_str().trim_end_matches('/')))
            .map_err(|e| OracleError::Load(format!("invalid model URL for '{model}': {e}")))?;

        let client = Client::builder()
            .timeout(config.oracle.timeout)
            .build()
            .map_err(|e| OracleError::Load(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url,
            model: model.to_string(),
            token: config.oracle.token.clone(),
            max_input_length: config.max_input_length,
        })
    }

    /// Runs one short generation. A failure means the model cannot serve requests.
    pub async fn warm_up(&self) -> Result<(), OracleError> {
        info!("Warming up model {} at {}", self.model, self.url);
        self.generate(WARMUP_PROMPT, &GenerationParams::beam(8, 1))
            .await
            .map(|_| ())
            .map_err(|e| OracleError::Load(format!("warm-up generation failed: {e}")))
    }
}

#[async_trait]
impl GenerationOracle for HttpOracle {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, OracleError> {
        let inputs = truncate_to_window(prompt, self.max_input_length);
        let body = InferenceRequest {
            inputs,
            parameters: InferenceParameters {
                max_length: params.max_output_length,
                num_beams: params.num_beams,
                do_sample: params.is_sampling(),
                temperature: params.temperature,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let mut request = self.client.post(self.url.clone()).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Try to parse error message
            let message = serde_json::from_str::<InferenceError>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated = parse_generated_text(&text)?;
        debug!(
            "Generation complete: model={}, input_chars={}, output_chars={}",
            self.model,
            inputs.chars().count(),
            generated.chars().count()
        );
        Ok(generated)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Extracts the first `generated_text`. Accepts both the list form and a bare object.
fn parse_generated_text(body: &str) -> Result<String, OracleError> {
    if let Ok(list) = serde_json::from_str::<Vec<GeneratedText>>(body) {
        return list
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or(OracleError::EmptyOutput);
    }
    serde_json::from_str::<GeneratedText>(body)
        .map(|g| g.generated_text)
        .map_err(|e| OracleError::Parse(e.to_string()))
}

/// Cuts `prompt` after `max_units` whitespace-delimited units.
fn truncate_to_window(prompt: &str, max_units: usize) -> &str {
    let mut units = 0;
    let mut in_unit = false;
    for (idx, ch) in prompt.char_indices() {
        if ch.is_whitespace() {
            in_unit = false;
        } else if !in_unit {
            in_unit = true;
            units += 1;
            if units > max_units {
                return prompt[..idx].trim_end();
            }
        }
    }
    prompt
}
