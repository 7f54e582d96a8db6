use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::driver::{self, DriverStatus};
use crate::entities::order::{self, OrderStatus};
use crate::entities::ride::{self, RideStatus};
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;
use crate::utils::visibility;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PublicRideResponse {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub price: i64,
    pub seats: i32,
    pub departure_time: Option<DateTime<Utc>>,
    pub departure_note: Option<String>,
    pub driver_name: String,
    pub vehicle_model: String,
    pub created_at: DateTime<Utc>,
}

fn to_public(ride: ride::Model, drivers: &[driver::Model]) -> PublicRideResponse {
    let profile = drivers.iter().find(|d| d.id == ride.driver_id);
    PublicRideResponse {
        id: ride.id,
        origin: ride.origin,
        destination: ride.destination,
        price: ride.price,
        seats: ride.seats,
        departure_time: ride.departure_time.map(|t| t.with_timezone(&Utc)),
        departure_note: ride.departure_note,
        driver_name: profile.map(|d| d.full_name.clone()).unwrap_or_default(),
        vehicle_model: profile.map(|d| d.vehicle_model.clone()).unwrap_or_default(),
        created_at: ride.created_at.with_timezone(&Utc),
    }
}

/// The public ride board: approved, unexpired rides from verified drivers,
/// newest first
pub async fn list_rides(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PublicRideResponse>>> {
    let now = Utc::now();

    let rides = ride::Entity::find()
        .filter(ride::Column::Status.eq(RideStatus::Approved))
        .all(&state.db)
        .await?;

    let drivers = driver::Entity::find()
        .filter(driver::Column::Status.eq(DriverStatus::Verified))
        .all(&state.db)
        .await?;
    let verified: HashSet<Uuid> = drivers.iter().map(|d| d.id).collect();

    let board = visibility::public_board(rides, &verified, now);

    let responses: Vec<PublicRideResponse> =
        board.into_iter().map(|r| to_public(r, &drivers)).collect();

    Ok(Json(responses))
}

/// Ride details, only while the ride is publicly listed
pub async fn get_ride(
    State(state): State<AppState>,
    Path(ride_id): Path<Uuid>,
) -> AppResult<Json<PublicRideResponse>> {
    let now = Utc::now();

    let ride = ride::Entity::find_by_id(ride_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

    let profile = driver::Entity::find_by_id(ride.driver_id).one(&state.db).await?;
    let verified: HashSet<Uuid> = profile
        .iter()
        .filter(|d| d.status == DriverStatus::Verified)
        .map(|d| d.id)
        .collect();

    if !visibility::is_listed(&ride, &verified, now) {
        return Err(AppError::NotFound("Ride not found".to_string()));
    }

    let drivers: Vec<driver::Model> = profile.into_iter().collect();
    Ok(Json(to_public(ride, &drivers)))
}

// ============ Booking ============

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub ride_id: Uuid,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub price: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Request a seat on a listed ride
pub async fn place_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<OrderResponse>> {
    // Blocked passengers cannot book
    let account = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;
    if account.blocked {
        return Err(AppError::AccessDenied(format!(
            "Your account is blocked: {}",
            account.blocked_reason.unwrap_or_default()
        )));
    }

    if payload.name.trim().is_empty() || payload.phone.trim().is_empty() {
        return Err(AppError::Validation(
            "Contact name and phone are required".to_string(),
        ));
    }

    let now = Utc::now();
    let ride = ride::Entity::find_by_id(payload.ride_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

    let profile = driver::Entity::find_by_id(ride.driver_id).one(&state.db).await?;
    let verified: HashSet<Uuid> = profile
        .iter()
        .filter(|d| d.status == DriverStatus::Verified)
        .map(|d| d.id)
        .collect();

    if !visibility::is_listed(&ride, &verified, now) {
        return Err(AppError::NotFound(
            "Ride is no longer available".to_string(),
        ));
    }

    let new_order = order::ActiveModel {
        id: Set(Uuid::new_v4()),
        ride_id: Set(ride.id),
        passenger_id: Set(claims.sub),
        passenger_name: Set(payload.name.trim().to_string()),
        passenger_phone: Set(payload.phone.trim().to_string()),
        status: Set(OrderStatus::New),
        ..Default::default()
    };
    let saved = new_order.insert(&state.db).await?;

    Ok(Json(OrderResponse {
        id: saved.id,
        ride_id: ride.id,
        origin: ride.origin,
        destination: ride.destination,
        price: ride.price,
        status: saved.status,
        created_at: saved.created_at.with_timezone(&Utc),
    }))
}

/// List the passenger's own booking requests
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<OrderResponse>>> {
    let orders = order::Entity::find()
        .filter(order::Column::PassengerId.eq(claims.sub))
        .all(&state.db)
        .await?;

    let rides = ride::Entity::find().all(&state.db).await?;

    let mut responses: Vec<OrderResponse> = orders
        .into_iter()
        .filter_map(|o| {
            let ride = rides.iter().find(|r| r.id == o.ride_id)?;
            Some(OrderResponse {
                id: o.id,
                ride_id: o.ride_id,
                origin: ride.origin.clone(),
                destination: ride.destination.clone(),
                price: ride.price,
                status: o.status,
                created_at: o.created_at.with_timezone(&Utc),
            })
        })
        .collect();
    responses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(responses))
}
