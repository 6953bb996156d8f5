use crate::errors::AppError;
use domain::UserId;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// HTTP API (payload 2.0) イベントの `requestContext`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub request_id: Option<String>,
    pub authorizer: Option<Authorizer>,
}

/// API Gateway が付与するオーソライザー情報
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Authorizer {
    pub jwt: Option<JwtAuthorizer>,
}

/// JWT オーソライザーで検証済みのトークンクレーム
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwtAuthorizer {
    pub claims: Option<HashMap<String, Value>>,
}

impl RequestContext {
    pub fn claims(&self) -> Option<&HashMap<String, Value>> {
        self.authorizer
            .as_ref()
            .and_then(|authorizer| authorizer.jwt.as_ref())
            .and_then(|jwt| jwt.claims.as_ref())
    }

    /// 呼び出し元のユーザー ID を取得
    /// JWT オーソライザーの空でない文字列 `sub` 以外はすべて拒否する
    pub fn identity(&self) -> Result<UserId, AppError> {
        let claims = self
            .claims()
            .ok_or_else(|| AppError::Authorization("JWT authorizer context missing".to_string()))?;
        identity_from_claims(claims)
    }
}

pub fn identity_from_claims(claims: &HashMap<String, Value>) -> Result<UserId, AppError> {
    let sub = claims
        .get("sub")
        .ok_or_else(|| AppError::Authorization("'sub' claim missing".to_string()))?
        .as_str()
        .ok_or_else(|| AppError::Authorization("'sub' claim is not a string".to_string()))?;

    UserId::from_string(sub.to_string()).map_err(|e| AppError::Authorization(e.to_string()))
}
