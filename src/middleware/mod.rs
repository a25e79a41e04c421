use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use std::sync::Arc;
use uuid::Uuid;

pub const SESSION_HEADER: &str = "x-selection-session";

/// Сессия выбора мест, к которой относится запрос.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSessionId(pub Uuid);

// Извлекает id сессии из заголовка X-Selection-Session
impl FromRequestParts<Arc<crate::AppState>> for SelectionSessionId {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "X-Selection-Session header is required".to_string()))?;

        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| (StatusCode::BAD_REQUEST, "X-Selection-Session must be a UUID".to_string()))?;

        if !state.sessions.contains(id).await {
            return Err((StatusCode::NOT_FOUND, "Selection session not found".to_string()));
        }

        Ok(SelectionSessionId(id))
    }
}
