use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, QuerySelect, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::driver::{self, DriverStatus};
use crate::entities::message::MessageKind;
use crate::entities::promo_code;
use crate::entities::ride::{self, RideStatus};
use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::notify::notify;
use crate::promo::{self, PromoDisplayStatus};
use crate::utils::visibility;
use crate::AppState;

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Approve,
    Reject,
}

/// A rejection needs a reason the applicant can act on; approvals ignore it.
fn required_reason(decision: ModerationDecision, reason: Option<&str>) -> AppResult<Option<String>> {
    match decision {
        ModerationDecision::Approve => Ok(None),
        ModerationDecision::Reject => {
            let trimmed = reason.map(str::trim).unwrap_or("");
            if trimmed.is_empty() {
                Err(AppError::Validation(
                    "A rejection reason is required".to_string(),
                ))
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}

// ============ Driver Applications ============

#[derive(Debug, Serialize)]
pub struct DriverApplicationResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub passport_number: String,
    pub vehicle_model: String,
    pub vehicle_plate: String,
    pub vehicle_photo_ref: Option<String>,
    pub status: DriverStatus,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// List all driver applications (admin)
pub async fn list_drivers(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DriverApplicationResponse>>> {
    let drivers = driver::Entity::find().all(&state.db).await?;
    let users = user::Entity::find().all(&state.db).await?;

    let mut responses: Vec<DriverApplicationResponse> = drivers
        .into_iter()
        .map(|d| {
            let account = users.iter().find(|u| u.id == d.id);
            DriverApplicationResponse {
                id: d.id,
                full_name: d.full_name,
                email: account.map(|u| u.email.clone()).unwrap_or_default(),
                phone: account.map(|u| u.phone.clone()).unwrap_or_default(),
                passport_number: d.passport_number,
                vehicle_model: d.vehicle_model,
                vehicle_plate: d.vehicle_plate,
                vehicle_photo_ref: d.vehicle_photo_ref,
                status: d.status,
                rejection_reason: d.rejection_reason,
                submitted_at: d.submitted_at.with_timezone(&Utc),
                reviewed_at: d.reviewed_at.map(|t| t.with_timezone(&Utc)),
            }
        })
        .collect();
    responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    Ok(Json(responses))
}

#[derive(Debug, Deserialize)]
pub struct ReviewDriverRequest {
    pub decision: ModerationDecision,
    pub reason: Option<String>,
}

/// Approve or reject a pending driver application (admin)
pub async fn review_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
    Json(payload): Json<ReviewDriverRequest>,
) -> AppResult<Json<driver::Model>> {
    let reason = required_reason(payload.decision, payload.reason.as_deref())?;

    let txn = state.db.begin().await?;

    let profile = driver::Entity::find_by_id(driver_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Driver application not found".to_string()))?;

    if profile.status != DriverStatus::Pending {
        return Err(AppError::InvalidStateTransition(
            "Application has already been reviewed".to_string(),
        ));
    }

    let (status, kind) = match payload.decision {
        ModerationDecision::Approve => (DriverStatus::Verified, MessageKind::RegistrationApproved),
        ModerationDecision::Reject => (DriverStatus::Rejected, MessageKind::RegistrationRejected),
    };

    let mut active: driver::ActiveModel = profile.into();
    active.status = Set(status);
    active.rejection_reason = Set(reason.clone());
    active.reviewed_at = Set(Some(Utc::now().into()));
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    let params = match reason {
        Some(r) => serde_json::json!({ "reason": r }),
        None => serde_json::json!({}),
    };
    notify(&state, driver_id, kind, params).await?;

    tracing::info!(%driver_id, status = ?updated.status, "driver application reviewed");
    Ok(Json(updated))
}

// ============ Ride Moderation ============

#[derive(Debug, Serialize)]
pub struct AdminRideResponse {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub driver_name: String,
    pub origin: String,
    pub destination: String,
    pub price: i64,
    pub seats: i32,
    pub promo_code: Option<String>,
    pub status: RideStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub expired: bool,
}

/// List all rides (admin)
pub async fn list_rides(State(state): State<AppState>) -> AppResult<Json<Vec<AdminRideResponse>>> {
    let now = Utc::now();
    let rides = ride::Entity::find().all(&state.db).await?;
    let drivers = driver::Entity::find().all(&state.db).await?;

    let mut responses: Vec<AdminRideResponse> = rides
        .into_iter()
        .map(|r| {
            let profile = drivers.iter().find(|d| d.id == r.driver_id);
            let expired = visibility::is_expired(&r, now);
            AdminRideResponse {
                id: r.id,
                driver_id: r.driver_id,
                driver_name: profile.map(|d| d.full_name.clone()).unwrap_or_default(),
                origin: r.origin,
                destination: r.destination,
                price: r.price,
                seats: r.seats,
                promo_code: r.promo_code,
                status: r.status,
                rejection_reason: r.rejection_reason,
                created_at: r.created_at.with_timezone(&Utc),
                approved_at: r.approved_at.map(|t| t.with_timezone(&Utc)),
                expired,
            }
        })
        .collect();
    responses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(responses))
}

#[derive(Debug, Deserialize)]
pub struct ModerateRideRequest {
    pub decision: ModerationDecision,
    pub reason: Option<String>,
}

/// Approve or reject a pending ride (admin). A ride is moderated exactly
/// once; the losing side of a concurrent double-moderation gets an error.
pub async fn moderate_ride(
    State(state): State<AppState>,
    Path(ride_id): Path<Uuid>,
    Json(payload): Json<ModerateRideRequest>,
) -> AppResult<Json<ride::Model>> {
    let reason = required_reason(payload.decision, payload.reason.as_deref())?;

    let txn = state.db.begin().await?;

    let current = ride::Entity::find_by_id(ride_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

    if current.status != RideStatus::Pending {
        return Err(AppError::InvalidStateTransition(
            "Ride has already been moderated".to_string(),
        ));
    }

    let driver_id = current.driver_id;
    let (origin, destination) = (current.origin.clone(), current.destination.clone());

    let mut active: ride::ActiveModel = current.into();
    let kind = match payload.decision {
        ModerationDecision::Approve => {
            active.status = Set(RideStatus::Approved);
            active.approved_at = Set(Some(Utc::now().into()));
            MessageKind::RideApproved
        }
        ModerationDecision::Reject => {
            active.status = Set(RideStatus::Rejected);
            active.rejection_reason = Set(reason.clone());
            MessageKind::RideRejected
        }
    };
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    let mut params = serde_json::json!({
        "origin": origin,
        "destination": destination,
    });
    if let Some(r) = reason {
        params["reason"] = serde_json::Value::String(r);
    }
    notify(&state, driver_id, kind, params).await?;

    tracing::info!(%ride_id, status = ?updated.status, "ride moderated");
    Ok(Json(updated))
}

/// Delete a ride (admin)
pub async fn delete_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = ride::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Ride not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Ride deleted" })))
}

// ============ Promo Codes ============

#[derive(Debug, Deserialize)]
pub struct CreatePromoCodeRequest {
    pub usage_limit: i32,
    pub validity_hours: i64,
}

#[derive(Debug, Serialize)]
pub struct PromoCodeResponse {
    pub id: Uuid,
    pub code: String,
    pub usage_limit: i32,
    pub usage_count: i32,
    pub expires_at: DateTime<Utc>,
    pub status: PromoDisplayStatus,
    pub created_at: DateTime<Utc>,
}

impl PromoCodeResponse {
    fn from_model(model: promo_code::Model, now: DateTime<Utc>) -> Self {
        let status = promo::display_status(&model, now);
        Self {
            id: model.id,
            code: model.code,
            usage_limit: model.usage_limit,
            usage_count: model.usage_count,
            expires_at: model.expires_at.with_timezone(&Utc),
            status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Issue a new promo code (admin)
pub async fn create_promo_code(
    State(state): State<AppState>,
    Json(payload): Json<CreatePromoCodeRequest>,
) -> AppResult<Json<PromoCodeResponse>> {
    let created = promo::create_code(&state.db, payload.usage_limit, payload.validity_hours).await?;
    tracing::info!(code = %created.code, limit = created.usage_limit, "promo code created");

    Ok(Json(PromoCodeResponse::from_model(created, Utc::now())))
}

/// List promo codes with their derived display status (admin)
pub async fn list_promo_codes(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PromoCodeResponse>>> {
    let now = Utc::now();
    let codes = promo_code::Entity::find().all(&state.db).await?;

    let mut responses: Vec<PromoCodeResponse> = codes
        .into_iter()
        .map(|c| PromoCodeResponse::from_model(c, now))
        .collect();
    responses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(responses))
}

// ============ User Management ============

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
    pub blocked: bool,
    pub blocked_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            phone: u.phone,
            role: u.role,
            blocked: u.blocked,
            blocked_reason: u.blocked_reason,
            created_at: u.created_at.with_timezone(&Utc),
        }
    }
}

/// List all users (admin)
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = user::Entity::find().all(&state.db).await?;

    let responses: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(responses))
}

#[derive(Debug, Deserialize)]
pub struct BlockUserRequest {
    pub blocked: bool,
    pub reason: Option<String>,
}

/// Block or unblock a user account (admin). Blocking requires a reason.
pub async fn set_user_block(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<BlockUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let reason = if payload.blocked {
        let trimmed = payload.reason.as_deref().map(str::trim).unwrap_or("");
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "A blocking reason is required".to_string(),
            ));
        }
        Some(trimmed.to_string())
    } else {
        None
    };

    let account = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if account.role == UserRole::Admin {
        return Err(AppError::AccessDenied(
            "Admin accounts cannot be blocked".to_string(),
        ));
    }

    let mut active: user::ActiveModel = account.into();
    active.blocked = Set(payload.blocked);
    active.blocked_reason = Set(reason.clone());
    let updated = active.update(&state.db).await?;

    if let Some(r) = reason {
        notify(
            &state,
            user_id,
            MessageKind::AccountBlocked,
            serde_json::json!({ "reason": r }),
        )
        .await?;
    }

    tracing::info!(%user_id, blocked = updated.blocked, "user block state changed");
    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user account (admin). Foreign keys cascade to the driver
/// profile, rides, orders and messages.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = user::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}
