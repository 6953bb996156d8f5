use crate::errors::DomainError;
use crate::patch::{FieldChange, TodoPatch};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Owner identity, taken from the `sub` claim of the caller's token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn from_string(id: String) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidUserId("empty identity".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sort key of a todo. Generated ids are UUID v4 strings; ids coming from a
/// request path are accepted as-is because the store decides whether they exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(id: String) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidTodoId("empty id".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of a create request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: Option<String>,
    pub due_date: Option<String>,
}

impl NewTodo {
    /// Parses a create body. Only JSON objects are accepted.
    pub fn from_json(body: &str) -> Result<Self, DomainError> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        if !value.is_object() {
            return Err(DomainError::InvalidBody("expected a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| DomainError::InvalidBody(e.to_string()))
    }

    /// Returns the title when present and non-empty. Whitespace is kept as given.
    pub fn validated_title(&self) -> Result<&str, DomainError> {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => Ok(title),
            _ => Err(DomainError::MissingTitle),
        }
    }
}

/// A todo record. Serializes to the flat representation returned to callers,
/// which never includes the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(skip)]
    pub user_id: UserId,
    pub todo_id: TodoId,
    pub title: String,
    pub completed: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl Todo {
    /// Builds a fresh, not yet persisted todo owned by `user_id`.
    pub fn create(user_id: UserId, new_todo: &NewTodo) -> Result<Self, DomainError> {
        let title = new_todo.validated_title()?.to_string();

        Ok(Self {
            user_id,
            todo_id: TodoId::new(),
            title,
            completed: false,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            due_date: new_todo.due_date.clone().filter(|d| !d.is_empty()),
        })
    }

    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        match &patch.due_date {
            Some(FieldChange::Set(due_date)) => self.due_date = Some(due_date.clone()),
            Some(FieldChange::Remove) => self.due_date = None,
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::from_string("u1".to_string()).unwrap()
    }

    #[test]
    fn test_todo_id_new_is_uuid_v4() {
        let todo_id = TodoId::new();
        let parsed = uuid::Uuid::parse_str(todo_id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_todo_ids_are_unique() {
        assert_ne!(TodoId::new(), TodoId::new());
    }

    #[test]
    fn test_empty_identifiers_are_rejected() {
        assert!(UserId::from_string(String::new()).is_err());
        assert!(UserId::from_string("   ".to_string()).is_err());
        assert!(TodoId::from_string(String::new()).is_err());
    }

    #[test]
    fn test_new_todo_from_json() {
        let new_todo = NewTodo::from_json(r#"{"title":"Buy milk","dueDate":"2025-01-31"}"#).unwrap();
        assert_eq!(new_todo.title.as_deref(), Some("Buy milk"));
        assert_eq!(new_todo.due_date.as_deref(), Some("2025-01-31"));
    }

    #[test]
    fn test_new_todo_rejects_non_objects() {
        for body in ["not json", "[\"Buy milk\"]", "\"Buy milk\"", "null", ""] {
            assert!(
                matches!(NewTodo::from_json(body), Err(DomainError::InvalidBody(_))),
                "body {body:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_new_todo_rejects_wrongly_typed_title() {
        let result = NewTodo::from_json(r#"{"title": 42}"#);
        assert!(matches!(result, Err(DomainError::InvalidBody(_))));
    }

    #[test]
    fn test_validated_title_requires_content() {
        for body in [r#"{}"#, r#"{"title":null}"#, r#"{"title":""}"#] {
            let new_todo = NewTodo::from_json(body).unwrap();
            assert_eq!(new_todo.validated_title(), Err(DomainError::MissingTitle));
        }
    }

    #[test]
    fn test_whitespace_title_is_kept() {
        let new_todo = NewTodo::from_json(r#"{"title":"   "}"#).unwrap();
        assert_eq!(new_todo.validated_title(), Ok("   "));

        let todo = Todo::create(user(), &new_todo).unwrap();
        assert_eq!(todo.title, "   ");
    }

    #[test]
    fn test_create_sets_defaults() {
        let new_todo = NewTodo::from_json(r#"{"title":"Buy milk"}"#).unwrap();
        let todo = Todo::create(user(), &new_todo).unwrap();

        assert_eq!(todo.title, "Buy milk");
        assert!(!todo.completed);
        assert!(todo.due_date.is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&todo.created_at).is_ok());
    }

    #[test]
    fn test_create_drops_empty_due_date() {
        let new_todo = NewTodo::from_json(r#"{"title":"Buy milk","dueDate":""}"#).unwrap();
        let todo = Todo::create(user(), &new_todo).unwrap();
        assert!(todo.due_date.is_none());
    }

    #[test]
    fn test_serialized_todo_omits_owner() {
        let new_todo = NewTodo::from_json(r#"{"title":"Buy milk"}"#).unwrap();
        let todo = Todo::create(user(), &new_todo).unwrap();

        let json = serde_json::to_value(&todo).unwrap();
        assert!(json.get("userId").is_none());
        assert!(json.get("dueDate").is_none());
        assert_eq!(json["todoId"], todo.todo_id.as_str());
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn test_apply_patch() {
        let new_todo = NewTodo::from_json(r#"{"title":"Buy milk","dueDate":"2025-01-31"}"#).unwrap();
        let mut todo = Todo::create(user(), &new_todo).unwrap();

        todo.apply(&TodoPatch {
            title: None,
            completed: Some(true),
            due_date: Some(FieldChange::Remove),
        });

        assert_eq!(todo.title, "Buy milk");
        assert!(todo.completed);
        assert!(todo.due_date.is_none());
    }
}
