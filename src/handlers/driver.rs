use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::driver::{self, DriverStatus};
use crate::entities::message::MessageKind;
use crate::entities::order::{self, OrderStatus};
use crate::entities::ride::{self, RideStatus};
use crate::error::{AppError, AppResult};
use crate::notify::notify;
use crate::promo;
use crate::utils::jwt::Claims;
use crate::utils::visibility;
use crate::AppState;

// ============ Verification Application ============

#[derive(Debug, Deserialize)]
pub struct ApplicationRequest {
    pub full_name: String,
    pub passport_number: String,
    pub vehicle_model: String,
    pub vehicle_plate: String,
    /// Storage reference of the vehicle photo. Omitting it on re-submission
    /// keeps the previously uploaded photo.
    pub vehicle_photo_ref: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationStatusResponse {
    pub status: DriverStatus,
    pub application: Option<driver::Model>,
}

/// Submit or re-submit the driver verification application
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ApplicationRequest>,
) -> AppResult<Json<driver::Model>> {
    // Validate before any write
    if payload.full_name.trim().is_empty()
        || payload.passport_number.trim().is_empty()
        || payload.vehicle_model.trim().is_empty()
        || payload.vehicle_plate.trim().is_empty()
    {
        return Err(AppError::Validation(
            "Full name, passport number, vehicle model and plate are required".to_string(),
        ));
    }

    let now = Utc::now();
    let existing = driver::Entity::find_by_id(claims.sub).one(&state.db).await?;

    let saved = match existing {
        Some(current) => {
            let photo = payload
                .vehicle_photo_ref
                .or_else(|| current.vehicle_photo_ref.clone());

            let mut active: driver::ActiveModel = current.into();
            active.full_name = Set(payload.full_name.trim().to_string());
            active.passport_number = Set(payload.passport_number.trim().to_string());
            active.vehicle_model = Set(payload.vehicle_model.trim().to_string());
            active.vehicle_plate = Set(payload.vehicle_plate.trim().to_string());
            active.vehicle_photo_ref = Set(photo);
            active.status = Set(DriverStatus::Pending);
            active.rejection_reason = Set(None);
            active.submitted_at = Set(now.into());
            active.reviewed_at = Set(None);
            active.update(&state.db).await?
        }
        None => {
            let new_driver = driver::ActiveModel {
                id: Set(claims.sub),
                full_name: Set(payload.full_name.trim().to_string()),
                passport_number: Set(payload.passport_number.trim().to_string()),
                vehicle_model: Set(payload.vehicle_model.trim().to_string()),
                vehicle_plate: Set(payload.vehicle_plate.trim().to_string()),
                vehicle_photo_ref: Set(payload.vehicle_photo_ref),
                status: Set(DriverStatus::Pending),
                submitted_at: Set(now.into()),
                ..Default::default()
            };
            new_driver.insert(&state.db).await?
        }
    };

    notify(
        &state,
        claims.sub,
        MessageKind::RegistrationPending,
        serde_json::json!({}),
    )
    .await?;

    Ok(Json(saved))
}

/// The driver's own application and verification status
pub async fn my_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ApplicationStatusResponse>> {
    let application = driver::Entity::find_by_id(claims.sub).one(&state.db).await?;

    let status = application
        .as_ref()
        .map(|a| a.status.clone())
        .unwrap_or(DriverStatus::Unsubmitted);

    Ok(Json(ApplicationStatusResponse { status, application }))
}

// ============ Ride Publication ============

#[derive(Debug, Deserialize)]
pub struct CreateRideRequest {
    pub origin: String,
    pub destination: String,
    pub price: i64,
    pub seats: i32,
    pub departure_time: Option<DateTime<Utc>>,
    pub departure_note: Option<String>,
    pub promo_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RideResponse {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub price: i64,
    pub seats: i32,
    pub departure_time: Option<DateTime<Utc>>,
    pub departure_note: Option<String>,
    pub promo_code: Option<String>,
    pub status: RideStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub expired: bool,
}

impl RideResponse {
    fn from_model(ride: ride::Model, now: DateTime<Utc>) -> Self {
        let expired = visibility::is_expired(&ride, now);
        Self {
            id: ride.id,
            origin: ride.origin,
            destination: ride.destination,
            price: ride.price,
            seats: ride.seats,
            departure_time: ride.departure_time.map(|t| t.with_timezone(&Utc)),
            departure_note: ride.departure_note,
            promo_code: ride.promo_code,
            status: ride.status,
            rejection_reason: ride.rejection_reason,
            created_at: ride.created_at.with_timezone(&Utc),
            approved_at: ride.approved_at.map(|t| t.with_timezone(&Utc)),
            expired,
        }
    }
}

/// Publish a new ride. The promo redemption, the retirement of the previous
/// ride and the insert commit together; if any step fails nothing is applied.
pub async fn create_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRideRequest>,
) -> AppResult<Json<RideResponse>> {
    let origin = payload.origin.trim();
    let destination = payload.destination.trim();
    if origin.is_empty() || destination.is_empty() {
        return Err(AppError::Validation(
            "Origin and destination are required".to_string(),
        ));
    }
    if origin.eq_ignore_ascii_case(destination) {
        return Err(AppError::Validation(
            "Origin and destination must be different".to_string(),
        ));
    }
    if payload.price <= 0 {
        return Err(AppError::Validation("Price must be positive".to_string()));
    }
    if payload.seats <= 0 {
        return Err(AppError::Validation("Seats must be positive".to_string()));
    }

    let txn = state.db.begin().await?;

    // Verification gate. Locking the profile row also serializes concurrent
    // submissions by the same driver, so the retire-and-insert below cannot
    // interleave and leave two live rides.
    let profile = driver::Entity::find_by_id(claims.sub)
        .lock_exclusive()
        .one(&txn)
        .await?;
    if !matches!(&profile, Some(d) if d.status == DriverStatus::Verified) {
        return Err(AppError::AccessDenied(
            "Only verified drivers can publish rides".to_string(),
        ));
    }

    // A failed redemption aborts the whole submission without consuming a use
    let promo_code = match payload
        .promo_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        Some(code) => Some(promo::redeem(&txn, code).await?.code),
        None => None,
    };

    // A new submission retires whatever ride currently occupies the driver's
    // single active slot
    ride::Entity::delete_many()
        .filter(ride::Column::DriverId.eq(claims.sub))
        .filter(ride::Column::Status.is_in([RideStatus::Pending, RideStatus::Approved]))
        .exec(&txn)
        .await?;

    let now = Utc::now();
    let new_ride = ride::ActiveModel {
        id: Set(Uuid::new_v4()),
        driver_id: Set(claims.sub),
        origin: Set(origin.to_string()),
        destination: Set(destination.to_string()),
        price: Set(payload.price),
        seats: Set(payload.seats),
        departure_time: Set(payload.departure_time.map(Into::into)),
        departure_note: Set(payload.departure_note),
        promo_code: Set(promo_code),
        status: Set(RideStatus::Pending),
        created_at: Set(now.into()),
        ..Default::default()
    };
    let inserted = new_ride.insert(&txn).await?;

    txn.commit().await?;

    notify(
        &state,
        claims.sub,
        MessageKind::RideCreated,
        serde_json::json!({
            "origin": inserted.origin.clone(),
            "destination": inserted.destination.clone(),
        }),
    )
    .await?;

    Ok(Json(RideResponse::from_model(inserted, now)))
}

/// List the driver's own rides, newest first
pub async fn my_rides(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<RideResponse>>> {
    let now = Utc::now();
    let rides = ride::Entity::find()
        .filter(ride::Column::DriverId.eq(claims.sub))
        .all(&state.db)
        .await?;

    let mut responses: Vec<RideResponse> = rides
        .into_iter()
        .map(|r| RideResponse::from_model(r, now))
        .collect();
    responses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(responses))
}

// ============ Order Triage ============

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderDecision {
    Accept,
    Reject,
}

#[derive(Debug, Deserialize)]
pub struct ResolveOrderRequest {
    pub decision: OrderDecision,
}

#[derive(Debug, Serialize)]
pub struct IncomingOrderResponse {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub passenger_name: String,
    pub passenger_phone: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// List booking requests across the driver's rides
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<IncomingOrderResponse>>> {
    let rides = ride::Entity::find()
        .filter(ride::Column::DriverId.eq(claims.sub))
        .all(&state.db)
        .await?;
    let ride_ids: Vec<Uuid> = rides.iter().map(|r| r.id).collect();

    let orders = order::Entity::find()
        .filter(order::Column::RideId.is_in(ride_ids))
        .all(&state.db)
        .await?;

    let mut responses: Vec<IncomingOrderResponse> = orders
        .into_iter()
        .filter_map(|o| {
            let ride = rides.iter().find(|r| r.id == o.ride_id)?;
            Some(IncomingOrderResponse {
                id: o.id,
                ride_id: o.ride_id,
                origin: ride.origin.clone(),
                destination: ride.destination.clone(),
                passenger_name: o.passenger_name,
                passenger_phone: o.passenger_phone,
                status: o.status,
                created_at: o.created_at.with_timezone(&Utc),
            })
        })
        .collect();
    responses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(responses))
}

/// Accept or reject a booking request. An order is resolved exactly once.
pub async fn resolve_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<ResolveOrderRequest>,
) -> AppResult<Json<order::Model>> {
    let txn = state.db.begin().await?;

    let order = order::Entity::find_by_id(order_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let ride = ride::Entity::find_by_id(order.ride_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

    if ride.driver_id != claims.sub {
        return Err(AppError::AccessDenied(
            "You can only resolve orders on your own rides".to_string(),
        ));
    }

    if order.status != OrderStatus::New {
        return Err(AppError::InvalidStateTransition(
            "Order has already been resolved".to_string(),
        ));
    }

    let passenger_id = order.passenger_id;
    let (status, kind) = match payload.decision {
        OrderDecision::Accept => (OrderStatus::Accepted, MessageKind::OrderAccepted),
        OrderDecision::Reject => (OrderStatus::Rejected, MessageKind::OrderRejected),
    };

    let mut active: order::ActiveModel = order.into();
    active.status = Set(status);
    active.resolved_at = Set(Some(Utc::now().into()));
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    notify(
        &state,
        passenger_id,
        kind,
        serde_json::json!({
            "origin": ride.origin,
            "destination": ride.destination,
        }),
    )
    .await?;

    Ok(Json(updated))
}
