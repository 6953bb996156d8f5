use crate::{respond, ApiGatewayProxyRequest};
use infrastructure::TodoStore;
use lambda_runtime::{Context, Error, LambdaEvent};
use shared::{ApiGatewayProxyResponse, AppError};
use tracing::info;

pub async fn function_handler(
    store: &dyn TodoStore,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let (request, context) = event.into_parts();

    shared::trace_lambda_handler!(
        "list-todos",
        request,
        context,
        |request: ApiGatewayProxyRequest, _context: Context| async move {
            Ok::<_, Error>(handle(store, &request).await)
        }
    )
}

/// `GET /todos`: 呼び出し元の Todo 一覧を JSON 配列で返す
pub async fn handle(store: &dyn TodoStore, request: &ApiGatewayProxyRequest) -> ApiGatewayProxyResponse {
    respond(list_todos(store, request).await, request)
}

async fn list_todos(
    store: &dyn TodoStore,
    request: &ApiGatewayProxyRequest,
) -> Result<ApiGatewayProxyResponse, AppError> {
    let user_id = request.identity()?;
    let todos = store.list_for_user(&user_id).await?;

    info!(user_id = %user_id, count = todos.len(), "Listed todos");
    Ok(ApiGatewayProxyResponse::json(200, &todos))
}
