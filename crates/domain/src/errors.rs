use thiserror::Error;

/// ストア呼び出し前に検出する入力エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// 詳細はログ用で、クライアントには返さない
    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("Missing title")]
    MissingTitle,

    #[error("Invalid value for '{field}': expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("No valid fields to update")]
    NoFieldsToUpdate,

    #[error("Invalid UserId: {0}")]
    InvalidUserId(String),

    #[error("Invalid TodoId: {0}")]
    InvalidTodoId(String),
}
