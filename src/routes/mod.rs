use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{admin, auth, driver, messages, passenger};
use crate::middleware::auth::{auth_middleware, require_admin, require_driver, require_passenger};
use crate::middleware::rate_limit::{create_public_governor, create_role_governor, RateLimitedRole};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Create role-specific governor layers
    let driver_governor = create_role_governor(RateLimitedRole::Driver);
    let passenger_governor = create_role_governor(RateLimitedRole::Passenger);
    // Create IP-based governor for public routes
    let public_governor = create_public_governor();

    // Public routes (IP-based rate limiting)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor.clone());

    // Public ride board
    let public_routes = Router::new()
        .route("/rides", get(passenger::list_rides))
        .route("/rides/{id}", get(passenger::get_ride))
        .layer(public_governor);

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        // Driver verification
        .route("/drivers", get(admin::list_drivers))
        .route("/drivers/{id}/review", put(admin::review_driver))
        // Ride moderation
        .route("/rides", get(admin::list_rides))
        .route("/rides/{id}/moderate", put(admin::moderate_ride))
        .route("/rides/{id}", delete(admin::delete_ride))
        // Promo codes
        .route("/promo-codes", post(admin::create_promo_code))
        .route("/promo-codes", get(admin::list_promo_codes))
        // User management
        .route("/users", get(admin::list_users))
        .route("/users/{id}/block", put(admin::set_user_block))
        .route("/users/{id}", delete(admin::delete_user))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Driver routes (requires auth + driver role)
    let driver_routes = Router::new()
        .route("/application", post(driver::submit_application))
        .route("/application", get(driver::my_application))
        .route("/rides", post(driver::create_ride))
        .route("/rides", get(driver::my_rides))
        .route("/orders", get(driver::my_orders))
        .route("/orders/{id}", put(driver::resolve_order))
        .layer(driver_governor)
        .layer(middleware::from_fn(require_driver))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Passenger routes (requires auth + passenger role)
    let passenger_routes = Router::new()
        .route("/", post(passenger::place_order))
        .route("/", get(passenger::my_orders))
        .layer(passenger_governor)
        .layer(middleware::from_fn(require_passenger))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Message history for any authenticated user
    let message_routes = Router::new()
        .route("/", get(messages::my_messages))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/driver", driver_routes)
        .nest("/api/orders", passenger_routes)
        .nest("/api/messages", message_routes)
        .with_state(state)
}
