use lambda_runtime::Context;
use std::fmt::Display;
use std::future::Future;
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// JSON 形式のトレーシングを初期化（フィルターは `RUST_LOG`、既定は `info`）
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).json())
        .with(filter)
        .try_init()?;

    Ok(())
}

/// Lambda 関数のトレーシング情報
#[derive(Debug)]
pub struct LambdaTraceContext {
    pub function_name: String,
    pub function_version: String,
    pub request_id: String,
    pub trace_id: Option<String>,
}

impl LambdaTraceContext {
    pub fn from_lambda_context(context: &Context) -> Self {
        Self {
            function_name: context.env_config.function_name.clone(),
            function_version: context.env_config.version.clone(),
            request_id: context.request_id.clone(),
            trace_id: std::env::var("_X_AMZN_TRACE_ID").ok(),
        }
    }
}

/// Lambda 関数実行をトレースするマクロ
#[macro_export]
macro_rules! trace_lambda_handler {
    ($handler_name:expr, $event:expr, $context:expr, $handler_fn:expr) => {{
        use $crate::telemetry::{create_lambda_span, LambdaTraceContext};
        use tracing::{error, info, Instrument};

        let trace_context = LambdaTraceContext::from_lambda_context(&$context);
        let span = create_lambda_span($handler_name, &trace_context);

        async move {
            info!(
                function_name = %trace_context.function_name,
                request_id = %trace_context.request_id,
                "Lambda function started"
            );

            let result = $handler_fn($event, $context).await;

            match &result {
                Ok(_) => info!("Lambda function completed successfully"),
                Err(e) => error!(error = %e, "Lambda function failed"),
            }

            result
        }
        .instrument(span)
        .await
    }};
}

pub fn create_lambda_span(handler_name: &str, trace_context: &LambdaTraceContext) -> tracing::Span {
    tracing::span!(
        tracing::Level::INFO,
        "lambda_handler",
        handler = handler_name,
        function_name = %trace_context.function_name,
        function_version = %trace_context.function_version,
        request_id = %trace_context.request_id,
        trace_id = %trace_context.trace_id.as_deref().unwrap_or("none")
    )
}

/// ストア操作の所要時間と結果を記録
#[instrument(skip(operation))]
pub async fn trace_store_operation<T, E, Fut>(
    table_name: &str,
    operation_name: &str,
    operation: Fut,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let start_time = std::time::Instant::now();
    let result = operation.await;
    let duration = start_time.elapsed();

    match &result {
        Ok(_) => {
            info!(
                table = table_name,
                operation = operation_name,
                duration_ms = duration.as_millis() as u64,
                "Store operation completed"
            );
        }
        Err(e) => {
            error!(
                table = table_name,
                operation = operation_name,
                duration_ms = duration.as_millis() as u64,
                error = %e,
                "Store operation failed"
            );
        }
    }

    result
}
