use crate::store::StoreError;
use aws_sdk_dynamodb::types::AttributeValue;
use domain::{FieldChange, Todo, TodoId, TodoPatch, UserId};
use std::collections::HashMap;

/// `todos` テーブルの属性名
pub mod attr {
    pub const USER_ID: &str = "userId";
    pub const TODO_ID: &str = "todoId";
    pub const TITLE: &str = "title";
    pub const COMPLETED: &str = "completed";
    pub const CREATED_AT: &str = "createdAt";
    pub const DUE_DATE: &str = "dueDate";
}

pub const INSERT_CONDITION: &str = "attribute_not_exists(userId) AND attribute_not_exists(todoId)";
pub const EXISTS_CONDITION: &str = "attribute_exists(todoId)";

pub fn todo_key(user_id: &UserId, todo_id: &TodoId) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (attr::USER_ID.to_string(), AttributeValue::S(user_id.as_str().to_string())),
        (attr::TODO_ID.to_string(), AttributeValue::S(todo_id.as_str().to_string())),
    ])
}

pub fn todo_to_item(todo: &Todo) -> HashMap<String, AttributeValue> {
    let mut item = todo_key(&todo.user_id, &todo.todo_id);
    item.insert(attr::TITLE.to_string(), AttributeValue::S(todo.title.clone()));
    item.insert(attr::COMPLETED.to_string(), AttributeValue::Bool(todo.completed));
    item.insert(attr::CREATED_AT.to_string(), AttributeValue::S(todo.created_at.clone()));

    if let Some(due_date) = &todo.due_date {
        item.insert(attr::DUE_DATE.to_string(), AttributeValue::S(due_date.clone()));
    }

    item
}

pub fn item_to_todo(item: &HashMap<String, AttributeValue>) -> Result<Todo, StoreError> {
    let user_id = UserId::from_string(string_attr(item, attr::USER_ID)?)
        .map_err(|e| StoreError::Malformed(e.to_string()))?;
    let todo_id = TodoId::from_string(string_attr(item, attr::TODO_ID)?)
        .map_err(|e| StoreError::Malformed(e.to_string()))?;

    let completed = *item
        .get(attr::COMPLETED)
        .ok_or_else(|| missing(attr::COMPLETED))?
        .as_bool()
        .map_err(|_| StoreError::Malformed(format!("'{}' is not a boolean", attr::COMPLETED)))?;

    let due_date = match item.get(attr::DUE_DATE) {
        Some(_) => Some(string_attr(item, attr::DUE_DATE)?),
        None => None,
    };

    Ok(Todo {
        user_id,
        todo_id,
        title: string_attr(item, attr::TITLE)?,
        completed,
        created_at: string_attr(item, attr::CREATED_AT)?,
        due_date,
    })
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String, StoreError> {
    item.get(name)
        .ok_or_else(|| missing(name))?
        .as_s()
        .cloned()
        .map_err(|_| StoreError::Malformed(format!("'{name}' is not a string")))
}

fn missing(name: &str) -> StoreError {
    StoreError::Malformed(format!("missing attribute '{name}'"))
}

/// パッチから組み立てる `SET`/`REMOVE` 式
/// 属性名は常にプレースホルダー経由で指定する
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl UpdateExpression {
    /// 変更がなければ `None`
    pub fn from_patch(patch: &TodoPatch) -> Option<Self> {
        let mut set_clauses = Vec::new();
        let mut remove_clauses = Vec::new();
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        if let Some(title) = &patch.title {
            set_clauses.push("#title = :title");
            names.insert("#title".to_string(), attr::TITLE.to_string());
            values.insert(":title".to_string(), AttributeValue::S(title.clone()));
        }

        if let Some(completed) = patch.completed {
            set_clauses.push("#completed = :completed");
            names.insert("#completed".to_string(), attr::COMPLETED.to_string());
            values.insert(":completed".to_string(), AttributeValue::Bool(completed));
        }

        match &patch.due_date {
            Some(FieldChange::Set(due_date)) => {
                set_clauses.push("#dueDate = :dueDate");
                names.insert("#dueDate".to_string(), attr::DUE_DATE.to_string());
                values.insert(":dueDate".to_string(), AttributeValue::S(due_date.clone()));
            }
            Some(FieldChange::Remove) => {
                remove_clauses.push("#dueDate");
                names.insert("#dueDate".to_string(), attr::DUE_DATE.to_string());
            }
            None => {}
        }

        let mut sections = Vec::new();
        if !set_clauses.is_empty() {
            sections.push(format!("SET {}", set_clauses.join(", ")));
        }
        if !remove_clauses.is_empty() {
            sections.push(format!("REMOVE {}", remove_clauses.join(", ")));
        }
        if sections.is_empty() {
            return None;
        }

        Some(Self {
            expression: sections.join(" "),
            names,
            values,
        })
    }
}
