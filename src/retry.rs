//! Per-call timeout and bounded retry with exponential back-off and jitter.
//!
//! Only [`InvocationError::Transport`] is retried. A schema violation means
//! the answer was wrong, and asking again is a prompt-tuning decision.

use std::future::Future;
use std::time::Duration;

use crate::agent::{invoke, Agent};
use crate::contract::Contract;
use crate::error::InvocationError;

const MAX_DELAY_MS: u64 = 60_000;

/// How a stage calls the capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(180),
            max_retries: 2,
            backoff_base_ms: 1_000,
        }
    }
}

/// [`invoke`] under `policy`: each attempt is bounded by the timeout, and
/// transport failures are retried with back-off.
pub async fn call<T: Contract>(
    agent: &dyn Agent,
    prompt: &str,
    policy: CallPolicy,
) -> Result<T, InvocationError> {
    retry_with_backoff(policy.max_retries, policy.backoff_base_ms, move || async move {
        match tokio::time::timeout(policy.timeout, invoke::<T>(agent, prompt)).await {
            Ok(result) => result,
            Err(_) => Err(InvocationError::Transport(format!(
                "no response within {}s",
                policy.timeout.as_secs()
            ))),
        }
    })
    .await
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Delay before attempt `n + 1` is `backoff_base_ms * 2^(n-1)` with +/-25% jitter,
/// capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, InvocationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, InvocationError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
