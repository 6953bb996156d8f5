use crate::models::{
    attr, item_to_todo, todo_key, todo_to_item, UpdateExpression, EXISTS_CONDITION,
    INSERT_CONDITION,
};
use crate::retry::{retry_store_operation, RetryConfig};
use crate::store::{StoreError, TodoStore};
use async_trait::async_trait;
use aws_config::retry::RetryConfig as SdkRetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use domain::{Todo, TodoId, TodoPatch, UserId};
use shared::telemetry::trace_store_operation;
use shared::Config;
use std::collections::HashMap;
use tracing::debug;

/// 適用されずに拒否されたリクエストに DynamoDB が返すエラーコード
const THROTTLING_CODES: [&str; 3] = [
    "ProvisionedThroughputExceededException",
    "ThrottlingException",
    "RequestLimitExceeded",
];

#[derive(Clone)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
}

impl DynamoDbClient {
    /// プロセスごとに一度だけ SDK クライアントを構築
    /// SDK のリトライは無効化し、`retry_store_operation` のみでリトライする
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .retry_config(SdkRetryConfig::disabled());

        if let Some(endpoint) = &config.dynamodb_endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        Self::from_client(Client::new(&sdk_config), &config.todos_table)
    }

    pub fn from_client(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// `todos` テーブル（PK: `userId`, SK: `todoId`）を使う `TodoStore` 実装
#[derive(Clone)]
pub struct DynamoTodoStore {
    db: DynamoDbClient,
    retry: RetryConfig,
}

impl DynamoTodoStore {
    pub fn new(db: DynamoDbClient, retry: RetryConfig) -> Self {
        Self { db, retry }
    }

    pub async fn from_config(config: &Config) -> Self {
        Self::new(
            DynamoDbClient::new(config).await,
            RetryConfig::from_config(config),
        )
    }
}

#[async_trait]
impl TodoStore for DynamoTodoStore {
    async fn insert_new(&self, todo: &Todo) -> Result<(), StoreError> {
        let db = &self.db;
        let item = &todo_to_item(todo);

        let operation = retry_store_operation(
            || async move {
                db.client()
                    .put_item()
                    .table_name(db.table_name())
                    .set_item(Some(item.clone()))
                    .condition_expression(INSERT_CONDITION)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|e| store_error(e, |err| err.is_conditional_check_failed_exception()))
            },
            &self.retry,
        );

        trace_store_operation(db.table_name(), "put_item", operation).await
    }

    async fn delete_existing(&self, user_id: &UserId, todo_id: &TodoId) -> Result<(), StoreError> {
        let db = &self.db;
        let key = &todo_key(user_id, todo_id);

        let operation = retry_store_operation(
            || async move {
                db.client()
                    .delete_item()
                    .table_name(db.table_name())
                    .set_key(Some(key.clone()))
                    .condition_expression(EXISTS_CONDITION)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|e| store_error(e, |err| err.is_conditional_check_failed_exception()))
            },
            &self.retry,
        );

        trace_store_operation(db.table_name(), "delete_item", operation).await
    }

    async fn update_existing(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        patch: &TodoPatch,
    ) -> Result<(), StoreError> {
        let update = UpdateExpression::from_patch(patch)
            .ok_or_else(|| StoreError::Malformed("update without any change".to_string()))?;
        debug!(expression = %update.expression, "Built update expression");

        let db = &self.db;
        let key = &todo_key(user_id, todo_id);
        let update = &update;

        let operation = retry_store_operation(
            || async move {
                // REMOVE のみの更新では値マップが空になり、空マップは DynamoDB が拒否する
                let values = (!update.values.is_empty()).then(|| update.values.clone());

                db.client()
                    .update_item()
                    .table_name(db.table_name())
                    .set_key(Some(key.clone()))
                    .update_expression(update.expression.as_str())
                    .set_expression_attribute_names(Some(update.names.clone()))
                    .set_expression_attribute_values(values)
                    .condition_expression(EXISTS_CONDITION)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|e| store_error(e, |err| err.is_conditional_check_failed_exception()))
            },
            &self.retry,
        );

        trace_store_operation(db.table_name(), "update_item", operation).await
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Todo>, StoreError> {
        let db = &self.db;
        let retry = &self.retry;
        let user_id = user_id.as_str();

        let operation = async move {
            let mut todos = Vec::new();
            let mut start_key: Option<HashMap<String, AttributeValue>> = None;

            loop {
                let page = retry_store_operation(
                    || {
                        let start_key = start_key.clone();
                        async move {
                            db.client()
                                .query()
                                .table_name(db.table_name())
                                .key_condition_expression("#userId = :uid")
                                .expression_attribute_names("#userId", attr::USER_ID)
                                .expression_attribute_values(
                                    ":uid",
                                    AttributeValue::S(user_id.to_string()),
                                )
                                .set_exclusive_start_key(start_key)
                                .send()
                                .await
                                .map_err(|e| store_error(e, |_| false))
                        }
                    },
                    retry,
                )
                .await?;

                for item in page.items() {
                    todos.push(item_to_todo(item)?);
                }

                match page.last_evaluated_key {
                    Some(key) if !key.is_empty() => start_key = Some(key),
                    _ => break,
                }
            }

            Ok(todos)
        };

        trace_store_operation(db.table_name(), "query", operation).await
    }
}

/// SDK エラーを StoreError に変換
fn store_error<E>(
    error: SdkError<E, HttpResponse>,
    is_condition_failure: impl Fn(&E) -> bool,
) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    if error.as_service_error().is_some_and(|e| is_condition_failure(e)) {
        return StoreError::ConditionFailed;
    }

    let detail = DisplayErrorContext(&error).to_string();
    match error.code() {
        Some(code) if THROTTLING_CODES.contains(&code) => StoreError::Throttled(detail),
        _ => StoreError::Unavailable(detail),
    }
}
