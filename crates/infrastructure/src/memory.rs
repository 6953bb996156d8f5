use crate::store::{StoreError, TodoStore};
use async_trait::async_trait;
use domain::{Todo, TodoId, TodoPatch, UserId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

type Records = BTreeMap<(UserId, TodoId), Todo>;

/// DynamoDB テーブルと同じ条件チェックを持つインメモリの `TodoStore`（開発/テスト用）
/// レコードは (user, todo id) 順に並ぶ
#[derive(Debug, Default)]
pub struct InMemoryTodoStore {
    records: Mutex<Records>,
    calls: AtomicUsize,
    failure: Mutex<Option<StoreError>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// すべての呼び出しが `error` で失敗するストア
    pub fn failing_with(error: StoreError) -> Self {
        let store = Self::default();
        *store.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
        store
    }

    /// これまでのストア呼び出し回数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn get(&self, user_id: &UserId, todo_id: &TodoId) -> Option<Todo> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(user_id.clone(), todo_id.clone()))
            .cloned()
    }

    fn begin_call(&self) -> Result<MutexGuard<'_, Records>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }

        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn insert_new(&self, todo: &Todo) -> Result<(), StoreError> {
        let mut records = self.begin_call()?;
        let key = (todo.user_id.clone(), todo.todo_id.clone());

        if records.contains_key(&key) {
            return Err(StoreError::ConditionFailed);
        }
        records.insert(key, todo.clone());
        Ok(())
    }

    async fn delete_existing(&self, user_id: &UserId, todo_id: &TodoId) -> Result<(), StoreError> {
        let mut records = self.begin_call()?;

        records
            .remove(&(user_id.clone(), todo_id.clone()))
            .map(|_| ())
            .ok_or(StoreError::ConditionFailed)
    }

    async fn update_existing(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        patch: &TodoPatch,
    ) -> Result<(), StoreError> {
        let mut records = self.begin_call()?;

        let todo = records
            .get_mut(&(user_id.clone(), todo_id.clone()))
            .ok_or(StoreError::ConditionFailed)?;
        todo.apply(patch);
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Todo>, StoreError> {
        let records = self.begin_call()?;

        Ok(records
            .iter()
            .filter(|((owner, _), _)| owner == user_id)
            .map(|(_, todo)| todo.clone())
            .collect())
    }
}
