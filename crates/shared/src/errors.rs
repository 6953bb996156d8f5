use serde::Serialize;
use thiserror::Error;

/// Todo ハンドラー共通のエラー型
#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Validation failed: {0}")]
    Validation(String),

    // 認証クレームが存在しない、または利用できない
    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// エラーの重要度（ログレベルに対応）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl AppError {
    /// レスポンスボディに載せるエラーコード
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Domain(_) | AppError::Validation(_) => "BAD_REQUEST",
            AppError::Authorization(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Store(_) => "STORE_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::Domain(_) | AppError::Validation(_) => 400,
            AppError::Authorization(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::Store(_) | AppError::Configuration(_) | AppError::Internal(_) => 500,
        }
    }

    /// クライアント向けメッセージ。サーバー側エラーの詳細は返さない
    pub fn user_message(&self) -> String {
        match self {
            AppError::Domain(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Authorization(_) => "Unauthorized - invalid token".to_string(),
            AppError::NotFound(_) => "Todo not found".to_string(),
            AppError::Store(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                "Internal Server Error".to_string()
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Domain(_) | AppError::Validation(_) | AppError::NotFound(_) => {
                ErrorSeverity::Info
            }
            AppError::Authorization(_) => ErrorSeverity::Warning,
            AppError::Store(_) | AppError::Internal(_) => ErrorSeverity::Error,
            AppError::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    /// 重要度に応じたレベルで一度だけログ出力
    pub fn log(&self, request_id: Option<&str>) {
        let request_id = request_id.unwrap_or("none");
        let code = self.code();

        match self.severity() {
            ErrorSeverity::Critical => {
                tracing::error!(error = %self, code, request_id, "Critical error occurred")
            }
            ErrorSeverity::Error => {
                tracing::error!(error = %self, code, request_id, "Error occurred")
            }
            ErrorSeverity::Warning => {
                tracing::warn!(error = %self, code, request_id, "Request rejected")
            }
            ErrorSeverity::Info => {
                tracing::info!(error = %self, code, request_id, "Request rejected")
            }
        }
    }
}

/// エラーレスポンスのボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn from_app_error(error: &AppError, request_id: Option<&str>) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.user_message(),
            request_id: request_id.map(str::to_string),
        }
    }
}
