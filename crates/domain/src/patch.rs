use crate::errors::DomainError;
use serde_json::Value;

/// 単一属性に対する更新内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange<T> {
    Set(T),
    Remove,
}

/// Todo の部分更新（`None` の属性は変更しない）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<FieldChange<String>>,
}

impl TodoPatch {
    /// 更新リクエストボディから対象フィールドを読み取る
    ///
    /// falsy な `dueDate`（`""`, `null`, `false`, `0`, `[]`, `{}`）は属性を削除する。
    /// 未知のキーは無視し、対象フィールドが一つもなければ `NoFieldsToUpdate`。
    pub fn from_json(body: &str) -> Result<Self, DomainError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        let fields = value
            .as_object()
            .ok_or_else(|| DomainError::InvalidBody("expected a JSON object".to_string()))?;

        let mut patch = TodoPatch::default();

        if let Some(title) = fields.get("title") {
            let title = title.as_str().ok_or(DomainError::InvalidField {
                field: "title",
                expected: "a string",
            })?;
            patch.title = Some(title.to_string());
        }

        if let Some(completed) = fields.get("completed") {
            let completed = completed.as_bool().ok_or(DomainError::InvalidField {
                field: "completed",
                expected: "a boolean",
            })?;
            patch.completed = Some(completed);
        }

        if let Some(due_date) = fields.get("dueDate") {
            patch.due_date = Some(match due_date {
                Value::String(s) if !s.is_empty() => FieldChange::Set(s.clone()),
                value if is_falsy(value) => FieldChange::Remove,
                _ => {
                    return Err(DomainError::InvalidField {
                        field: "dueDate",
                        expected: "a date string or an empty value",
                    })
                }
            });
        }

        if patch.is_empty() {
            return Err(DomainError::NoFieldsToUpdate);
        }

        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none() && self.due_date.is_none()
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_with_all_fields() {
        let patch =
            TodoPatch::from_json(r#"{"title":"Buy oat milk","completed":true,"dueDate":"2025-02-01"}"#)
                .unwrap();

        assert_eq!(patch.title.as_deref(), Some("Buy oat milk"));
        assert_eq!(patch.completed, Some(true));
        assert_eq!(patch.due_date, Some(FieldChange::Set("2025-02-01".to_string())));
    }

    #[test]
    fn test_absent_fields_are_untouched() {
        let patch = TodoPatch::from_json(r#"{"completed":false}"#).unwrap();

        assert!(patch.title.is_none());
        assert_eq!(patch.completed, Some(false));
        assert!(patch.due_date.is_none());
    }

    #[test]
    fn test_falsy_due_date_removes() {
        let bodies = [
            r#"{"dueDate":""}"#,
            r#"{"dueDate":null}"#,
            r#"{"dueDate":false}"#,
            r#"{"dueDate":0}"#,
            r#"{"dueDate":[]}"#,
            r#"{"dueDate":{}}"#,
        ];
        for body in bodies {
            let patch = TodoPatch::from_json(body).unwrap();
            assert_eq!(patch.due_date, Some(FieldChange::Remove));
        }
    }

    #[test]
    fn test_no_recognized_fields() {
        for body in [r#"{}"#, r#"{"priority":"high","owner":"someone"}"#] {
            assert_eq!(TodoPatch::from_json(body), Err(DomainError::NoFieldsToUpdate));
        }
    }

    #[test]
    fn test_wrongly_typed_fields() {
        let cases = [
            (r#"{"title":null}"#, "title"),
            (r#"{"completed":"yes"}"#, "completed"),
            (r#"{"dueDate":20250201}"#, "dueDate"),
            (r#"{"dueDate":true}"#, "dueDate"),
        ];
        for (body, expected_field) in cases {
            match TodoPatch::from_json(body) {
                Err(DomainError::InvalidField { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("unexpected result for {body}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_invalid_body() {
        assert!(matches!(
            TodoPatch::from_json("{not json"),
            Err(DomainError::InvalidBody(_))
        ));
        assert!(matches!(
            TodoPatch::from_json("[1,2]"),
            Err(DomainError::InvalidBody(_))
        ));
    }
}
