use async_trait::async_trait;
use domain::{Todo, TodoId, TodoPatch, UserId};
use shared::AppError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 書き込みの条件式が成立しなかった
    #[error("Conditional check failed")]
    ConditionFailed,

    /// 適用前に拒否された（リトライ可能）
    #[error("Request throttled: {0}")]
    Throttled(String),

    /// 結果不明（タイムアウト、通信エラー、サービスエラー）
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Throttled(_))
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        AppError::Store(error.to_string())
    }
}

/// ハンドラーが使うストア操作
/// キーは常に呼び出し元の `UserId` から組み立てる
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// 新規レコードを書き込む。(user, todo id) が既存なら `ConditionFailed`
    async fn insert_new(&self, todo: &Todo) -> Result<(), StoreError>;

    /// レコードが存在しなければ `ConditionFailed`
    async fn delete_existing(&self, user_id: &UserId, todo_id: &TodoId) -> Result<(), StoreError>;

    /// `patch` を一回の書き込みで適用。レコードが存在しなければ `ConditionFailed`
    async fn update_existing(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        patch: &TodoPatch,
    ) -> Result<(), StoreError>;

    /// `user_id` が所有する全レコード（ストアの順序）
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Todo>, StoreError>;
}
