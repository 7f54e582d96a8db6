use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::message::{self, MessageKind};
use crate::error::AppResult;
use crate::AppState;

/// Append a notification record and kick off best-effort push delivery.
///
/// The message row is the source of truth; push delivery is spawned and never
/// awaited, so a dead webhook cannot fail the moderation action that caused
/// the notification.
pub async fn notify(
    state: &AppState,
    recipient_id: Uuid,
    kind: MessageKind,
    params: Value,
) -> AppResult<message::Model> {
    let record = message::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipient_id: Set(recipient_id),
        kind: Set(kind.clone()),
        params: Set(params.clone()),
        ..Default::default()
    };

    let saved = record.insert(&state.db).await?;

    if let Some(webhook) = state.config.push_webhook_url.clone() {
        let (title, body) = render(&kind, &params);
        tokio::spawn(async move {
            let payload = serde_json::json!({
                "recipient": recipient_id,
                "title": title,
                "body": body,
            });

            match reqwest::Client::new().post(&webhook).json(&payload).send().await {
                Ok(resp) if !resp.status().is_success() => {
                    tracing::warn!(status = %resp.status(), "push webhook returned an error");
                }
                Err(err) => {
                    tracing::warn!(%err, "push delivery failed");
                }
                Ok(_) => {}
            }
        });
    }

    Ok(saved)
}

/// Render a stored message to (title, body). Pure: messages are stored as
/// kind + params so history can be re-rendered with different wording later.
pub fn render(kind: &MessageKind, params: &Value) -> (String, String) {
    let param = |key: &str| {
        params
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    match kind {
        MessageKind::RegistrationPending => (
            "Application received".to_string(),
            "Your driver application is awaiting review.".to_string(),
        ),
        MessageKind::RegistrationApproved => (
            "Application approved".to_string(),
            "Your driver application was approved. You can now publish rides.".to_string(),
        ),
        MessageKind::RegistrationRejected => (
            "Application rejected".to_string(),
            format!("Your driver application was rejected: {}", param("reason")),
        ),
        MessageKind::AccountBlocked => (
            "Account blocked".to_string(),
            format!("Your account was blocked: {}", param("reason")),
        ),
        MessageKind::RideCreated => (
            "Ride submitted".to_string(),
            format!(
                "Your ride from {} to {} was submitted and is awaiting moderation.",
                param("origin"),
                param("destination")
            ),
        ),
        MessageKind::RideApproved => (
            "Ride approved".to_string(),
            format!(
                "Your ride from {} to {} is now visible to passengers.",
                param("origin"),
                param("destination")
            ),
        ),
        MessageKind::RideRejected => (
            "Ride rejected".to_string(),
            format!(
                "Your ride from {} to {} was rejected: {}",
                param("origin"),
                param("destination"),
                param("reason")
            ),
        ),
        MessageKind::OrderAccepted => (
            "Booking accepted".to_string(),
            format!(
                "The driver accepted your booking for the ride from {} to {}.",
                param("origin"),
                param("destination")
            ),
        ),
        MessageKind::OrderRejected => (
            "Booking declined".to_string(),
            format!(
                "The driver declined your booking for the ride from {} to {}.",
                param("origin"),
                param("destination")
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_renders_the_reason() {
        let (title, body) = render(
            &MessageKind::RideRejected,
            &serde_json::json!({
                "origin": "Tashkent",
                "destination": "Samarkand",
                "reason": "blurry vehicle photo",
            }),
        );

        assert_eq!(title, "Ride rejected");
        assert!(body.contains("Tashkent"));
        assert!(body.contains("Samarkand"));
        assert!(body.contains("blurry vehicle photo"));
    }

    #[test]
    fn missing_params_render_empty_not_panic() {
        let (_, body) = render(&MessageKind::RideApproved, &serde_json::json!({}));
        assert!(body.contains("from  to "));
    }

    #[test]
    fn static_kinds_ignore_params() {
        let (title, body) = render(
            &MessageKind::RegistrationApproved,
            &serde_json::json!({"reason": "unused"}),
        );
        assert_eq!(title, "Application approved");
        assert!(!body.contains("unused"));
    }
}
