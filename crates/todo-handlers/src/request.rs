use base64::{engine::general_purpose::STANDARD, Engine as _};
use domain::{DomainError, TodoId, UserId};
use serde::Deserialize;
use shared::{AppError, RequestContext};
use std::collections::HashMap;

/// HTTP API (payload 2.0) プロキシイベント（ハンドラーが参照する部分のみ）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyRequest {
    pub body: Option<String>,
    pub is_base64_encoded: Option<bool>,
    pub path_parameters: Option<HashMap<String, String>>,
    pub request_context: Option<RequestContext>,
}

impl ApiGatewayProxyRequest {
    pub fn identity(&self) -> Result<UserId, AppError> {
        self.request_context
            .as_ref()
            .ok_or_else(|| AppError::Authorization("requestContext missing".to_string()))?
            .identity()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|context| context.request_id.as_deref())
    }

    /// パスパラメータ `todoId` を取得
    pub fn todo_id(&self) -> Result<TodoId, AppError> {
        let raw = self
            .path_parameters
            .as_ref()
            .and_then(|params| params.get("todoId"))
            .ok_or_else(|| AppError::Validation("Missing todoId path parameter".to_string()))?;

        TodoId::from_string(raw.clone())
            .map_err(|_| AppError::Validation("Missing todoId path parameter".to_string()))
    }

    /// リクエストボディを取得（Base64 エンコード時はデコード）
    pub fn body_text(&self) -> Result<String, AppError> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| DomainError::InvalidBody("request body is missing".to_string()))?;

        if !self.is_base64_encoded.unwrap_or(false) {
            return Ok(body.to_string());
        }

        let bytes = STANDARD
            .decode(body)
            .map_err(|e| DomainError::InvalidBody(format!("invalid base64 body: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| DomainError::InvalidBody(format!("body is not UTF-8: {e}")).into())
    }
}
