use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::services::token_service::TokenKind;
use crate::AppState;

/// The authenticated caller, inserted into request extensions by [`require_bearer_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

fn reject(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

pub async fn require_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return reject("missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return reject("bad_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return reject("unsupported_scheme");
    };

    let claims = match state.token_service.verify(token.trim(), TokenKind::Access) {
        Ok(claims) => claims,
        Err(_) => return reject("invalid_token"),
    };
    let Ok(user_id) = claims.user_id() else {
        return reject("invalid_token");
    };

    match state.users.find_by_id(user_id).await {
        Ok(Some(user)) if user.status.is_active() => {
            req.extensions_mut().insert(AuthUser { id: user.id });
            next.run(req).await
        }
        Ok(Some(_)) => reject("user_inactive"),
        Ok(None) => reject("user_not_found"),
        Err(err) => err.into_response(),
    }
}
