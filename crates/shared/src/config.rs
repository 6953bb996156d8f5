use crate::errors::AppError;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub todos_table: String,
    pub environment: String,
    pub aws_region: String,
    /// DynamoDB エンドポイントの上書き（DynamoDB Local 用）
    pub dynamodb_endpoint: Option<String>,
    pub retry_max_attempts: u32,
    pub retry_initial_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let retry_max_attempts: u32 = parse_var(&lookup, "STORE_RETRY_MAX_ATTEMPTS", 3)?;
        if retry_max_attempts == 0 {
            return Err(AppError::Configuration(
                "STORE_RETRY_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        Ok(Config {
            todos_table: lookup("TODOS_TABLE").unwrap_or_else(|| "todos".to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            dynamodb_endpoint: lookup("DYNAMODB_ENDPOINT").filter(|s| !s.is_empty()),
            retry_max_attempts,
            retry_initial_delay_ms: parse_var(&lookup, "STORE_RETRY_INITIAL_DELAY_MS", 100)?,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{key} has an invalid value: {raw}"))),
        None => Ok(default),
    }
}
