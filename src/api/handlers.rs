use crate::application::rental::{self as service, BookingParty, ServiceDependencies};
use crate::config::AuthConfig;
use crate::domain::{
    BookingId, CarId,
    car::CarAttributes,
    commands::{AddCar, CreateBooking, UpdateBookingDates, UpdateBookingStatus, UpdateCar},
};
use crate::ports::InsertResult;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    auth::authorize_email,
    error::ApiError,
    types::{
        BookingListQuery, BookingResponse, CarResponse, CarSearchQuery, CreateBookingRequest,
        DeleteResultResponse, InsertResultResponse, OwnerCarsQuery, UpdateDatesRequest,
        UpdateResultResponse, UpdateStatusRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
    /// None の場合、Cookie JWTによる認可は行わない
    pub auth: Option<AuthConfig>,
}

// ============================================================================
// Car handlers
// ============================================================================

/// GET /all-cars?searchTerm= - 車両一覧
///
/// searchTerm が空の場合は全件を返す。
pub async fn list_cars(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CarSearchQuery>,
) -> Result<Json<Vec<CarResponse>>, ApiError> {
    let cars = service::list_cars(&state.service_deps, query.search_term.as_deref()).await?;
    Ok(Json(cars.into_iter().map(CarResponse::from).collect()))
}

/// GET /recent-allCars - 新着車両（最大6件）
pub async fn recent_cars(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CarResponse>>, ApiError> {
    let cars = service::recent_cars(&state.service_deps).await?;
    Ok(Json(cars.into_iter().map(CarResponse::from).collect()))
}

/// GET /car-details/:id, GET /update-car/:id - 車両詳細
pub async fn get_car(
    State(state): State<Arc<AppState>>,
    Path(car_id): Path<Uuid>,
) -> Result<Json<CarResponse>, ApiError> {
    let car = service::get_car(&state.service_deps, CarId::from_uuid(car_id)).await?;
    Ok(Json(CarResponse::from(car)))
}

/// GET /my-carList/:email?filterDate= - 所有者の車両一覧
pub async fn list_owner_cars(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(email): Path<String>,
    Query(query): Query<OwnerCarsQuery>,
) -> Result<Json<Vec<CarResponse>>, ApiError> {
    authorize_email(&state, &jar, &email)?;

    let cars =
        service::list_owner_cars(&state.service_deps, &email, query.filter_date.as_deref()).await?;
    Ok(Json(cars.into_iter().map(CarResponse::from).collect()))
}

/// POST /car-added - 車両登録
pub async fn add_car(
    State(state): State<Arc<AppState>>,
    Json(attributes): Json<CarAttributes>,
) -> Result<(StatusCode, Json<InsertResultResponse>), ApiError> {
    let car_id = service::add_car(&state.service_deps, AddCar { attributes }).await?;

    let result = InsertResult {
        inserted_id: car_id.value(),
    };
    Ok((StatusCode::CREATED, Json(result.into())))
}

/// PUT /update-car-details/:id - 車両の部分更新（upsert）
pub async fn update_car(
    State(state): State<Arc<AppState>>,
    Path(car_id): Path<Uuid>,
    Json(attributes): Json<CarAttributes>,
) -> Result<Json<UpdateResultResponse>, ApiError> {
    let cmd = UpdateCar {
        car_id: CarId::from_uuid(car_id),
        attributes,
    };

    let result = service::update_car(&state.service_deps, cmd).await?;
    Ok(Json(result.into()))
}

/// DELETE /delete-myCar/:id - 車両削除
pub async fn delete_car(
    State(state): State<Arc<AppState>>,
    Path(car_id): Path<Uuid>,
) -> Result<Json<DeleteResultResponse>, ApiError> {
    let result = service::delete_car(&state.service_deps, CarId::from_uuid(car_id)).await?;
    Ok(Json(result.into()))
}

// ============================================================================
// Booking handlers
// ============================================================================

/// POST /my-booking - 車両を予約
///
/// 同じ予約者・車両の予約が既にある場合は400を返す。
/// 成功時は車両の demandCount が1増える。
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<InsertResultResponse>), ApiError> {
    let cmd = CreateBooking {
        requester_email: req.requester_email,
        car_id: CarId::from_uuid(req.car_id),
        owner_email: req.owner_email,
        start_date: req.start_date,
        end_date: req.end_date,
        details: req.details,
    };

    let booking_id = service::create_booking(&state.service_deps, cmd).await?;

    let result = InsertResult {
        inserted_id: booking_id.value(),
    };
    Ok((StatusCode::CREATED, Json(result.into())))
}

/// GET /my-all-booking/:email?buyer= - 予約一覧
///
/// buyer=false の場合は email の所有車両に対する予約を返す。
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(email): Path<String>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    authorize_email(&state, &jar, &email)?;

    let party = if query.buyer.unwrap_or(true) {
        BookingParty::Requester
    } else {
        BookingParty::Owner
    };

    let bookings = service::list_bookings(&state.service_deps, &email, party).await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// PATCH /update-booking-status/:id - 予約ステータス変更
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateResultResponse>, ApiError> {
    let cmd = UpdateBookingStatus {
        booking_id: BookingId::from_uuid(booking_id),
        status: req.status,
    };

    let result = service::update_booking_status(&state.service_deps, cmd).await?;
    Ok(Json(result.into()))
}

/// PATCH /update-booking-date/:id - 予約日程変更
pub async fn update_booking_dates(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<UpdateDatesRequest>,
) -> Result<Json<UpdateResultResponse>, ApiError> {
    let cmd = UpdateBookingDates {
        booking_id: BookingId::from_uuid(booking_id),
        start_date: req.start_date,
        end_date: req.end_date,
    };

    let result = service::update_booking_dates(&state.service_deps, cmd).await?;
    Ok(Json(result.into()))
}

/// DELETE /remove-bookingCar/:id - 予約削除
///
/// 存在しない予約でもエラーにせず deletedCount: 0 を返す。
pub async fn remove_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<DeleteResultResponse>, ApiError> {
    let result =
        service::remove_booking(&state.service_deps, BookingId::from_uuid(booking_id)).await?;
    Ok(Json(result.into()))
}
