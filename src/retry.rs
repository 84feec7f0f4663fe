//! Exponential backoff retry for translation and speech calls.
//!
//! Both remote speech capabilities are free web endpoints that throttle and
//! drop requests under load. [`Retrying`] wraps any [`Translator`] or
//! [`SpeechSynthesizer`] and transparently retries transient failures.
//!
//! # Retry Strategy
//!
//! - Configurable number of retries (default 2)
//! - Exponential backoff starting at the base delay (default 500ms)
//! - Maximum delay capped at 10 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd
//! - [`SpeechError::InputTooLong`] is never retried

use crate::error::SpeechError;
use crate::speech::{SpeechSynthesizer, Translator};
use async_trait::async_trait;
use rand::{Rng, rng};
use std::fmt;
use std::future::Future;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Backoff parameters shared by every retried call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts before giving up.
    pub max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    pub base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    pub max_delay: StdDuration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(10),
        }
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    ///
    /// ```text
    /// delay = min(base_delay * 2^(attempt-1), max_delay)
    /// ```
    pub fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = attempt.saturating_sub(1).min(31) as u32;
        let delay = self.base_delay.saturating_mul(1u32 << shift);
        delay.min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out.
    pub async fn run<T, F, Fut>(&self, what: &'static str, mut op: F) -> Result<T, SpeechError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, SpeechError>> + Send,
        T: Send,
    {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match op().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if !is_transient(&e) || attempt > self.max_retries {
                        error!(
                            what,
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "call failed; giving up"
                        );
                        return Err(e);
                    }

                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = self.backoff(attempt) + StdDuration::from_millis(jitter_ms);

                    warn!(
                        what,
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "call failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

fn is_transient(e: &SpeechError) -> bool {
    !matches!(e, SpeechError::InputTooLong { .. })
}

/// Wrapper that adds retry logic to a translator or synthesizer.
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retrying<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<T> fmt::Debug for Retrying<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrying")
            .field("policy", &self.policy)
            .finish()
    }
}

#[async_trait]
impl<T> Translator for Retrying<T>
where
    T: Translator,
{
    #[instrument(level = "info", skip_all)]
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, SpeechError> {
        self.policy
            .run("translate", || self.inner.translate(text, source, target))
            .await
    }
}

#[async_trait]
impl<T> SpeechSynthesizer for Retrying<T>
where
    T: SpeechSynthesizer,
{
    #[instrument(level = "info", skip_all)]
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError> {
        self.policy
            .run("synthesize", || self.inner.synthesize(text, language))
            .await
    }
}
