use crate::{guarded_store_error, respond, ApiGatewayProxyRequest};
use domain::TodoPatch;
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
        "update-todo",
        request,
        context,
        |request: ApiGatewayProxyRequest, _context: Context| async move {
            Ok::<_, Error>(handle(store, &request).await)
        }
    )
}

/// `PATCH /todos/{todoId}`: title / completed / dueDate の部分更新
pub async fn handle(store: &dyn TodoStore, request: &ApiGatewayProxyRequest) -> ApiGatewayProxyResponse {
    respond(update_todo(store, request).await, request)
}

async fn update_todo(
    store: &dyn TodoStore,
    request: &ApiGatewayProxyRequest,
) -> Result<ApiGatewayProxyResponse, AppError> {
    let user_id = request.identity()?;
    let todo_id = request.todo_id()?;
    let patch = TodoPatch::from_json(&request.body_text()?)?;

    store
        .update_existing(&user_id, &todo_id, &patch)
        .await
        .map_err(|e| guarded_store_error(e, &user_id, &todo_id))?;

    info!(user_id = %user_id, todo_id = %todo_id, "Todo updated");
    Ok(ApiGatewayProxyResponse::message(
        200,
        format!("Todo {todo_id} updated successfully"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::event;
    use domain::{NewTodo, Todo, UserId};
    use infrastructure::InMemoryTodoStore;
    use serde_json::json;

    async fn seeded(store: &InMemoryTodoStore) -> Todo {
        let new_todo = NewTodo {
            title: Some("Buy milk".to_string()),
            due_date: Some("2025-01-31".to_string()),
        };
        let todo = Todo::create(UserId::from_string("user-1".to_string()).unwrap(), &new_todo).unwrap();
        store.insert_new(&todo).await.unwrap();
        todo
    }

    #[tokio::test]
    async fn test_partial_update() {
        let store = InMemoryTodoStore::new();
        let todo = seeded(&store).await;

        let request = event(Some("user-1"), Some(todo.todo_id.as_str()), Some(json!({"completed": true})));
        let response = handle(&store, &request).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body_json()["message"],
            format!("Todo {} updated successfully", todo.todo_id)
        );

        let stored = store.get(&todo.user_id, &todo.todo_id).unwrap();
        assert!(stored.completed);
        assert_eq!(stored.title, "Buy milk");
        assert_eq!(stored.due_date.as_deref(), Some("2025-01-31"));
        assert_eq!(stored.created_at, todo.created_at);
    }

    #[tokio::test]
    async fn test_empty_due_date_removes_it() {
        let store = InMemoryTodoStore::new();
        let todo = seeded(&store).await;

        let request = event(
            Some("user-1"),
            Some(todo.todo_id.as_str()),
            Some(json!({"title": "Buy oat milk", "dueDate": ""})),
        );
        assert_eq!(handle(&store, &request).await.status_code, 200);

        let stored = store.get(&todo.user_id, &todo.todo_id).unwrap();
        assert_eq!(stored.title, "Buy oat milk");
        assert!(stored.due_date.is_none());
    }

    #[tokio::test]
    async fn test_false_due_date_removes_it() {
        let store = InMemoryTodoStore::new();
        let todo = seeded(&store).await;

        let request = event(Some("user-1"), Some(todo.todo_id.as_str()), Some(json!({"dueDate": false})));
        let response = handle(&store, &request).await;

        assert_eq!(response.status_code, 200);
        assert!(store.get(&todo.user_id, &todo.todo_id).unwrap().due_date.is_none());
    }

    #[tokio::test]
    async fn test_no_recognized_fields_skips_store() {
        let store = InMemoryTodoStore::new();
        let todo = seeded(&store).await;
        let calls_before = store.calls();

        let request = event(Some("user-1"), Some(todo.todo_id.as_str()), Some(json!({"colour": "red"})));
        let response = handle(&store, &request).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body_json()["message"], "No valid fields to update");
        assert_eq!(store.calls(), calls_before);
    }

    #[tokio::test]
    async fn test_wrongly_typed_field_is_bad_request() {
        let store = InMemoryTodoStore::new();
        let todo = seeded(&store).await;

        let request = event(
            Some("user-1"),
            Some(todo.todo_id.as_str()),
            Some(json!({"completed": "yes"})),
        );
        let response = handle(&store, &request).await;

        assert_eq!(response.status_code, 400);
        assert!(!store.get(&todo.user_id, &todo.todo_id).unwrap().completed);
    }

    #[tokio::test]
    async fn test_update_missing_todo_is_not_found() {
        let store = InMemoryTodoStore::new();

        let request = event(Some("user-1"), Some("does-not-exist"), Some(json!({"completed": true})));
        let response = handle(&store, &request).await;

        assert_eq!(response.status_code, 404);
        assert_eq!(response.body_json()["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_cannot_update_another_users_todo() {
        let store = InMemoryTodoStore::new();
        let todo = seeded(&store).await;

        let request = event(Some("user-2"), Some(todo.todo_id.as_str()), Some(json!({"title": "Mine now"})));
        let response = handle(&store, &request).await;

        assert_eq!(response.status_code, 404);
        assert_eq!(store.get(&todo.user_id, &todo.todo_id).unwrap().title, "Buy milk");
    }
}
