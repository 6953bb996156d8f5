pub mod create_todo;
pub mod delete_todo;
pub mod list_todos;
pub mod request;
pub mod update_todo;

pub use request::ApiGatewayProxyRequest;

use domain::{TodoId, UserId};
use infrastructure::{DynamoTodoStore, StoreError};
use lambda_runtime::Error;
use shared::telemetry::init_tracing;
use shared::{ApiGatewayProxyResponse, AppError, Config};
use tracing::info;

/// 各 Lambda バイナリ共通のコールドスタート初期化（トレーシング、設定、ストア）
pub async fn init_store() -> Result<DynamoTodoStore, Error> {
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize tracing: {e}");
    }

    let config = Config::from_env()?;
    info!(
        table = %config.todos_table,
        environment = %config.environment,
        region = %config.aws_region,
        "Configuration loaded"
    );

    Ok(DynamoTodoStore::from_config(&config).await)
}

/// エラーをログ出力して HTTP レスポンスに変換
pub(crate) fn respond(
    result: Result<ApiGatewayProxyResponse, AppError>,
    request: &ApiGatewayProxyRequest,
) -> ApiGatewayProxyResponse {
    result.unwrap_or_else(|e| {
        e.log(request.request_id());
        ApiGatewayProxyResponse::from_error(&e, request.request_id())
    })
}

/// 削除/更新の存在チェック失敗は NotFound として扱う
pub(crate) fn guarded_store_error(
    error: StoreError,
    user_id: &UserId,
    todo_id: &TodoId,
) -> AppError {
    match error {
        StoreError::ConditionFailed => {
            AppError::NotFound(format!("todo {todo_id} for user {user_id}"))
        }
        other => other.into(),
    }
}
