use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::auth::{create_token, logout};
use super::handlers::{
    AppState, add_car, create_booking, delete_car, get_car, list_bookings, list_cars,
    list_owner_cars, recent_cars, remove_booking, update_booking_dates, update_booking_status,
    update_car,
};

/// Creates the API router with all car and booking endpoints
///
/// Car endpoints:
/// - GET /all-cars, GET /recent-allCars, GET /car-details/:id, GET /update-car/:id
/// - GET /my-carList/:email
/// - POST /car-added, PUT /update-car-details/:id, DELETE /delete-myCar/:id
///
/// Booking endpoints:
/// - POST /my-booking, GET /my-all-booking/:email
/// - PATCH /update-booking-status/:id, PATCH /update-booking-date/:id
/// - DELETE /remove-bookingCar/:id
///
/// POST /jwt and GET /logout are only mounted when cookie auth is configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Car endpoints
        .route("/all-cars", get(list_cars))
        .route("/recent-allCars", get(recent_cars))
        .route("/car-details/:id", get(get_car))
        .route("/update-car/:id", get(get_car))
        .route("/my-carList/:email", get(list_owner_cars))
        .route("/car-added", post(add_car))
        .route("/update-car-details/:id", put(update_car))
        .route("/delete-myCar/:id", delete(delete_car))
        // Booking endpoints
        .route("/my-booking", post(create_booking))
        .route("/my-all-booking/:email", get(list_bookings))
        .route("/update-booking-status/:id", patch(update_booking_status))
        .route("/update-booking-date/:id", patch(update_booking_dates))
        .route("/remove-bookingCar/:id", delete(remove_booking));

    if state.auth.is_some() {
        router = router
            .route("/jwt", post(create_token))
            .route("/logout", get(logout));
    }

    router
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Builds the CORS layer for the configured frontend origins
///
/// Credentials are allowed so the token cookie is sent cross-origin, which
/// rules out wildcard origins, methods and headers.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let origins = allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
