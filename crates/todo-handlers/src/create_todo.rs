use crate::{respond, ApiGatewayProxyRequest};
use domain::{NewTodo, Todo};
use infrastructure::{StoreError, TodoStore};
use lambda_runtime::{Context, Error, LambdaEvent};
use shared::{ApiGatewayProxyResponse, AppError};
use tracing::info;

pub async fn function_handler(
    store: &dyn TodoStore,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let (request, context) = event.into_parts();

    shared::trace_lambda_handler!(
        "create-todo",
        request,
        context,
        |request: ApiGatewayProxyRequest, _context: Context| async move {
            Ok::<_, Error>(handle(store, &request).await)
        }
    )
}

/// `POST /todos`: 作成した Todo を 201 で返す
pub async fn handle(store: &dyn TodoStore, request: &ApiGatewayProxyRequest) -> ApiGatewayProxyResponse {
    let result = create_todo(store, request)
        .await
        .map(|todo| ApiGatewayProxyResponse::json(201, &todo));
    respond(result, request)
}

async fn create_todo(store: &dyn TodoStore, request: &ApiGatewayProxyRequest) -> Result<Todo, AppError> {
    let body = request.body_text()?;
    let new_todo = NewTodo::from_json(&body)?;
    new_todo.validated_title()?;

    let user_id = request.identity()?;
    let todo = Todo::create(user_id, &new_todo)?;

    store.insert_new(&todo).await.map_err(|e| match e {
        // v4 の新規 ID が衝突することは通常ない
        StoreError::ConditionFailed => {
            AppError::Internal(format!("todo id {} already exists", todo.todo_id))
        }
        other => other.into(),
    })?;

    info!(user_id = %todo.user_id, todo_id = %todo.todo_id, "Todo created");
    Ok(todo)
}
