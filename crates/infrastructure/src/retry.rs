use crate::store::StoreError;
use rand::Rng;
use shared::Config;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// リトライ設定
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 最大試行回数（初回を含む）
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
    /// 待機時間に 0.75..=1.25 のランダム係数を掛ける
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            backoff_multiplier: 2.0,
            max_delay_ms: 2000,
            add_jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.retry_max_attempts,
            initial_delay_ms: config.retry_initial_delay_ms,
            ..Self::default()
        }
    }

    fn delay_for(&self, base_delay_ms: u64) -> Duration {
        let delay_ms = base_delay_ms.min(self.max_delay_ms);
        if self.add_jitter {
            let factor = rand::thread_rng().gen_range(0.75..=1.25);
            Duration::from_millis((delay_ms as f64 * factor) as u64)
        } else {
            Duration::from_millis(delay_ms)
        }
    }
}

/// 指数バックオフでリトライ実行
/// 成功、リトライ不可のエラー、`max_attempts` 到達のいずれかで終了
pub async fn retry_with_backoff<F, Fut, T, E>(
    operation: F,
    config: &RetryConfig,
    is_retryable: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(error) => {
                if !is_retryable(&error) {
                    debug!(error = %error, "Non-retryable error");
                    return Err(error);
                }

                if attempt >= config.max_attempts {
                    warn!(
                        max_attempts = config.max_attempts,
                        error = %error,
                        "Max attempts reached, giving up"
                    );
                    return Err(error);
                }

                let delay = config.delay_for(delay_ms);
                warn!(
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retryable error, backing off"
                );

                sleep(delay).await;
                delay_ms = ((delay_ms as f64) * config.backoff_multiplier) as u64;
            }
        }
    }
}

/// スロットリングのみリトライするストア操作
/// 条件チェック失敗と結果不明のエラーはそのまま返す
pub async fn retry_store_operation<F, Fut, T>(
    operation: F,
    config: &RetryConfig,
) -> Result<T, StoreError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, StoreError>>,
{
    retry_with_backoff(operation, config, StoreError::is_retryable).await
}
