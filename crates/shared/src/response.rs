use crate::errors::{AppError, ErrorResponse};
use serde::Serialize;
use std::collections::HashMap;

const SERIALIZATION_FALLBACK: &str =
    r#"{"code":"INTERNAL_ERROR","message":"Internal Server Error"}"#;

/// HTTP API (payload 2.0) プロキシレスポンス
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ApiGatewayProxyResponse {
    pub fn json<T: Serialize + ?Sized>(status_code: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self::with_body(status_code, body),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                Self::with_body(500, SERIALIZATION_FALLBACK.to_string())
            }
        }
    }

    /// `{"message": ...}` 形式の完了メッセージ
    pub fn message(status_code: u16, message: impl Into<String>) -> Self {
        Self::json(status_code, &serde_json::json!({ "message": message.into() }))
    }

    pub fn from_error(error: &AppError, request_id: Option<&str>) -> Self {
        let body = ErrorResponse::from_app_error(error, request_id);
        let body = serde_json::to_string(&body)
            .unwrap_or_else(|_| SERIALIZATION_FALLBACK.to_string());
        Self::with_body(error.http_status_code(), body)
    }

    /// ボディを JSON として解析（JSON でなければ `Value::Null`）
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }

    fn with_body(status_code: u16, body: String) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            "Content-Type,Authorization".to_string(),
        );

        Self {
            status_code,
            headers,
            body,
            is_base64_encoded: false,
        }
    }
}
