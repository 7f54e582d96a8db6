use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::message::{self, MessageKind};
use crate::error::AppResult;
use crate::notify::render;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub kind: MessageKind,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// The caller's notification history, newest first. Title and body are
/// rendered at read time from the stored kind and params.
pub async fn my_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<MessageResponse>>> {
    let messages = message::Entity::find()
        .filter(message::Column::RecipientId.eq(claims.sub))
        .all(&state.db)
        .await?;

    let mut responses: Vec<MessageResponse> = messages
        .into_iter()
        .map(|m| {
            let (title, body) = render(&m.kind, &m.params);
            MessageResponse {
                id: m.id,
                kind: m.kind,
                title,
                body,
                created_at: m.created_at.with_timezone(&Utc),
            }
        })
        .collect();
    responses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(responses))
}
