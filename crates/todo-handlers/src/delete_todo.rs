use crate::{guarded_store_error, respond, ApiGatewayProxyRequest};
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
        "delete-todo",
        request,
        context,
        |request: ApiGatewayProxyRequest, _context: Context| async move {
            Ok::<_, Error>(handle(store, &request).await)
        }
    )
}

/// `DELETE /todos/{todoId}`
pub async fn handle(store: &dyn TodoStore, request: &ApiGatewayProxyRequest) -> ApiGatewayProxyResponse {
    respond(delete_todo(store, request).await, request)
}

async fn delete_todo(
    store: &dyn TodoStore,
    request: &ApiGatewayProxyRequest,
) -> Result<ApiGatewayProxyResponse, AppError> {
    let user_id = request.identity()?;
    let todo_id = request.todo_id()?;

    store
        .delete_existing(&user_id, &todo_id)
        .await
        .map_err(|e| guarded_store_error(e, &user_id, &todo_id))?;

    info!(user_id = %user_id, todo_id = %todo_id, "Todo deleted");
    Ok(ApiGatewayProxyResponse::message(
        200,
        format!("Todo {todo_id} deleted successfully"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::event;
    use domain::{NewTodo, Todo, UserId};
    use infrastructure::{InMemoryTodoStore, StoreError};

    async fn seeded(store: &InMemoryTodoStore, sub: &str) -> Todo {
        let new_todo = NewTodo {
            title: Some("Buy milk".to_string()),
            due_date: None,
        };
        let todo = Todo::create(UserId::from_string(sub.to_string()).unwrap(), &new_todo).unwrap();
        store.insert_new(&todo).await.unwrap();
        todo
    }

    #[tokio::test]
    async fn test_delete_existing_todo() {
        let store = InMemoryTodoStore::new();
        let todo = seeded(&store, "user-1").await;

        let response = handle(&store, &event(Some("user-1"), Some(todo.todo_id.as_str()), None)).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body_json()["message"],
            format!("Todo {} deleted successfully", todo.todo_id)
        );
        assert!(store.get(&todo.user_id, &todo.todo_id).is_none());
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        let store = InMemoryTodoStore::new();
        let todo = seeded(&store, "user-1").await;
        let request = event(Some("user-1"), Some(todo.todo_id.as_str()), None);

        assert_eq!(handle(&store, &request).await.status_code, 200);
        let response = handle(&store, &request).await;

        assert_eq!(response.status_code, 404);
        assert_eq!(response.body_json()["message"], "Todo not found");
    }

    #[tokio::test]
    async fn test_cannot_delete_another_users_todo() {
        let store = InMemoryTodoStore::new();
        let todo = seeded(&store, "owner").await;

        let response = handle(&store, &event(Some("intruder"), Some(todo.todo_id.as_str()), None)).await;

        assert_eq!(response.status_code, 404);
        assert!(store.get(&todo.user_id, &todo.todo_id).is_some());
    }

    #[tokio::test]
    async fn test_missing_todo_id_is_bad_request() {
        let store = InMemoryTodoStore::new();

        let response = handle(&store, &event(Some("user-1"), None, None)).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let store = InMemoryTodoStore::new();

        let response = handle(&store, &event(None, Some("abc"), None)).await;

        assert_eq!(response.status_code, 403);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_throttled_store_is_internal_error() {
        let store = InMemoryTodoStore::failing_with(StoreError::Throttled("slow down".to_string()));

        let response = handle(&store, &event(Some("user-1"), Some("abc"), None)).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body_json()["code"], "STORE_ERROR");
    }
}
