/// Generation oracle — the single point of entry for all text-generation calls.
///
/// ARCHITECTURAL RULE: pipeline stages only ever see `dyn GenerationOracle`.
/// The model is opaque; nothing outside `oracle::http` knows how it is hosted.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::OracleConfig;

pub mod http;

/// Base delay for retry backoff: 500ms, 1s, 2s, ...
const BACKOFF_BASE_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Oracle returned no generated text")]
    EmptyOutput,

    #[error("Oracle call timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Model load failed: {0}")]
    Load(String),
}

impl OracleError {
    /// Transport errors, rate limits, server errors and timeouts are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            OracleError::Http(_) | OracleError::Timeout { .. } => true,
            OracleError::Api { status, .. } => *status == 429 || *status >= 500,
            OracleError::Parse(_) | OracleError::EmptyOutput | OracleError::Load(_) => false,
        }
    }
}

/// Decoding parameters for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_output_length: u32,
    pub num_beams: u32,
    /// `None` → deterministic beam search. `Some` → sampling.
    pub temperature: Option<f32>,
}

impl GenerationParams {
    pub const fn beam(max_output_length: u32, num_beams: u32) -> Self {
        Self {
            max_output_length,
            num_beams,
            temperature: None,
        }
    }

    pub const fn sampled(max_output_length: u32, num_beams: u32, temperature: f32) -> Self {
        Self {
            max_output_length,
            num_beams,
            temperature: Some(temperature),
        }
    }

    pub fn is_sampling(&self) -> bool {
        self.temperature.is_some()
    }
}

/// A text-generation capability: prompt + parameters in, text out.
///
/// Carried in `AppState` as `Arc<dyn GenerationOracle>` and shared across all items.
#[async_trait]
pub trait GenerationOracle: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationParams)
        -> Result<String, OracleError>;

    /// Identifier of the underlying model, for logs and the health endpoint.
    fn model_id(&self) -> &str;
}

// ────────────────────────────────────────────────────────────────────────────
// GuardedOracle — timeout, bounded retry, concurrency cap
// ────────────────────────────────────────────────────────────────────────────

/// Wraps any oracle with a per-attempt timeout, bounded retries with exponential
/// backoff, and a semaphore. With one permit, calls are served as a serialized queue.
/// A permit is held for one attempt only, never across a backoff sleep.
pub struct GuardedOracle {
    inner: Arc<dyn GenerationOracle>,
    timeout: Duration,
    max_retries: u32,
    permits: Semaphore,
}

impl GuardedOracle {
    pub fn new(
        inner: Arc<dyn GenerationOracle>,
        timeout: Duration,
        max_retries: u32,
        concurrency: usize,
    ) -> Self {
        Self {
            inner,
            timeout,
            max_retries,
            permits: Semaphore::new(concurrency.max(1)),
        }
    }

    pub fn from_config(inner: Arc<dyn GenerationOracle>, config: &OracleConfig) -> Self {
        Self::new(inner, config.timeout, config.retries, config.concurrency)
    }

    async fn attempt(&self, prompt: &str, params: &GenerationParams) -> Result<String, OracleError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| OracleError::Load("oracle permit pool closed".to_string()))?;

        match tokio::time::timeout(self.timeout, self.inner.generate(prompt, params)).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl GenerationOracle for GuardedOracle {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, OracleError> {
        let mut attempt = 0;
        loop {
            match self.attempt(prompt, params).await {
                Ok(text) => {
                    debug!(
                        "Oracle call succeeded: prompt_chars={}, output_chars={}, attempts={}",
                        prompt.chars().count(),
                        text.chars().count(),
                        attempt + 1
                    );
                    return Ok(text);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = Duration::from_millis(BACKOFF_BASE_MS << attempt.min(8));
                    warn!(
                        "Oracle call attempt {} failed ({e}), retrying after {}ms...",
                        attempt + 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test support
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::stub::StubOracle;
    use super::*;

    fn api_error(status: u16) -> OracleError {
        OracleError::Api {
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert!(api_error(429).is_retryable());
        assert!(api_error(503).is_retryable());
        assert!(!api_error(400).is_retryable());
        assert!(OracleError::Timeout { seconds: 1 }.is_retryable());
        assert!(!OracleError::EmptyOutput.is_retryable());
        assert!(!OracleError::Parse("bad".into()).is_retryable());
        assert!(!OracleError::Load("bad".into()).is_retryable());
    }

    #[test]
    fn test_params_constructors() {
        let beam = GenerationParams::beam(50, 4);
        assert!(!beam.is_sampling());
        let sampled = GenerationParams::sampled(200, 4, 0.7);
        assert_eq!(sampled.temperature, Some(0.7));
        assert!(sampled.is_sampling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_retries_retryable_errors() {
        let stub = Arc::new(StubOracle::new(vec![
            Err(api_error(503)),
            Err(api_error(429)),
            Ok("ok".to_string()),
        ]));
        let guard = GuardedOracle::new(stub.clone(), Duration::from_secs(5), 2, 1);

        let out = guard.generate("p", &GenerationParams::beam(10, 1)).await.unwrap();
        assert_eq!(out, "ok");
        assert_eq!(stub.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_gives_up_after_max_retries() {
        let stub = Arc::new(StubOracle::new(vec![
            Err(api_error(500)),
            Err(api_error(500)),
            Ok("too late".to_string()),
        ]));
        let guard = GuardedOracle::new(stub.clone(), Duration::from_secs(5), 1, 1);

        let err = guard.generate("p", &GenerationParams::beam(10, 1)).await.unwrap_err();
        assert!(matches!(err, OracleError::Api { status: 500, .. }));
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_guard_does_not_retry_permanent_errors() {
        let stub = Arc::new(StubOracle::new(vec![Err(api_error(400))]));
        let guard = GuardedOracle::new(stub.clone(), Duration::from_secs(5), 3, 1);

        assert!(guard.generate("p", &GenerationParams::beam(10, 1)).await.is_err());
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_frees_the_slot_for_other_callers() {
        let stub = Arc::new(StubOracle::new(vec![
            Err(api_error(503)),
            Ok("second caller".to_string()),
            Ok("first caller".to_string()),
        ]));
        let guard = GuardedOracle::new(stub.clone(), Duration::from_secs(5), 1, 1);
        let params = GenerationParams::beam(10, 1);

        // The first call fails and backs off; the second runs during that sleep.
        let (first, second) = tokio::join!(
            guard.generate("first", &params),
            guard.generate("second", &params)
        );

        assert_eq!(first.unwrap(), "first caller");
        assert_eq!(second.unwrap(), "second caller");
        let order: Vec<String> = stub
            .prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect();
        assert_eq!(order, ["first", "second", "first"]);
    }

    struct SlowOracle;

    #[async_trait]
    impl GenerationOracle for SlowOracle {
        async fn generate(&self, _: &str, _: &GenerationParams) -> Result<String, OracleError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("never".to_string())
        }

        fn model_id(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_times_out_slow_calls() {
        let guard = GuardedOracle::new(Arc::new(SlowOracle), Duration::from_secs(2), 0, 1);
        let err = guard.generate("p", &GenerationParams::beam(10, 1)).await.unwrap_err();
        assert!(matches!(err, OracleError::Timeout { seconds: 2 }));
    }

    #[test]
    fn test_guard_reports_inner_model_id() {
        let guard = GuardedOracle::new(
            Arc::new(StubOracle::constant("x")),
            Duration::from_secs(1),
            0,
            1,
        );
        assert_eq!(guard.model_id(), "stub-model");
    }
}
