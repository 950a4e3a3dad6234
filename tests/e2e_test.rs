use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use nexdrive_rental::adapters::memory::{MemoryBookingStore, MemoryCarInventory};
use nexdrive_rental::api::handlers::AppState;
use nexdrive_rental::api::router::create_router;
use nexdrive_rental::api::types::*;
use nexdrive_rental::application::rental::ServiceDependencies;
use nexdrive_rental::config::AuthConfig;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// インメモリストアを使ったアプリケーションのセットアップ
fn setup_app(auth: Option<AuthConfig>) -> axum::Router {
    let service_deps = ServiceDependencies {
        car_inventory: Arc::new(MemoryCarInventory::new()),
        booking_store: Arc::new(MemoryBookingStore::new()),
    };

    create_router(Arc::new(AppState { service_deps, auth }))
}

fn test_auth() -> AuthConfig {
    AuthConfig {
        jwt_secret: "e2e-secret".to_string(),
        jwt_expiration_seconds: 300,
        secure_cookie: false,
    }
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn add_car(app: &axum::Router, attributes: Value) -> uuid::Uuid {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/car-added", &attributes))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let result: InsertResultResponse = read_json(response).await;
    assert!(result.acknowledged);
    result.inserted_id
}

async fn get_car(app: &axum::Router, car_id: uuid::Uuid) -> CarResponse {
    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/car-details/{}", car_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await
}

fn booking_body(email: &str, car_id: uuid::Uuid) -> Value {
    json!({
        "requesterEmail": email,
        "carId": car_id,
        "ownerEmail": "owner@example.com",
        "startDate": "2025-07-01",
        "endDate": "2025-07-03",
        "totalPrice": 180
    })
}

// ============================================================================
// E2Eテスト: 車両
// ============================================================================

#[tokio::test]
async fn test_e2e_car_lifecycle() {
    let app = setup_app(None);

    // Step 1: 登録（POST /car-added）
    let car_id = add_car(
        &app,
        json!({ "model": "Mazda MX-5", "price": 90, "ownerEmail": "owner@example.com" }),
    )
    .await;

    // Step 2: 詳細取得（GET /car-details/:id）
    let car = get_car(&app, car_id).await;
    assert_eq!(car.id, car_id);
    assert_eq!(car.attributes.get("model"), Some(&json!("Mazda MX-5")));
    assert_eq!(car.attributes.get("price"), Some(&json!(90)));
    assert_eq!(car.demand_count, 0);

    // Step 3: 部分更新（PUT /update-car-details/:id）
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/update-car-details/{}", car_id),
            &json!({ "price": 95 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let update: UpdateResultResponse = read_json(response).await;
    assert_eq!(update.matched_count, 1);
    assert_eq!(update.modified_count, 1);

    // 編集画面用の取得（GET /update-car/:id）
    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/update-car/{}", car_id)))
        .await
        .unwrap();
    let car: CarResponse = read_json(response).await;
    assert_eq!(car.attributes.get("price"), Some(&json!(95)));
    assert_eq!(car.attributes.get("model"), Some(&json!("Mazda MX-5")));

    // Step 4: 削除（DELETE /delete-myCar/:id）
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/delete-myCar/{}", car_id)))
        .await
        .unwrap();
    let deleted: DeleteResultResponse = read_json(response).await;
    assert_eq!(deleted.deleted_count, 1);

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/car-details/{}", car_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_search_and_recent() {
    let app = setup_app(None);
    for i in 0..8 {
        let model = if i % 2 == 0 { "Honda Civic" } else { "Ford Focus" };
        add_car(&app, json!({ "model": model, "seq": i })).await;
    }

    // 空の検索語は全件
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/all-cars?searchTerm="))
        .await
        .unwrap();
    let all: Vec<CarResponse> = read_json(response).await;
    assert_eq!(all.len(), 8);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/all-cars?searchTerm=civic"))
        .await
        .unwrap();
    let civics: Vec<CarResponse> = read_json(response).await;
    assert_eq!(civics.len(), 4);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/recent-allCars"))
        .await
        .unwrap();
    let recent: Vec<CarResponse> = read_json(response).await;
    assert_eq!(recent.len(), 6);
}

#[tokio::test]
async fn test_e2e_upsert_unknown_car() {
    let app = setup_app(None);
    let car_id = uuid::Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/update-car-details/{}", car_id),
            &json!({ "model": "Kia Soul" }),
        ))
        .await
        .unwrap();

    let update: UpdateResultResponse = read_json(response).await;
    assert_eq!(update.upserted_id, Some(car_id));
    assert_eq!(get_car(&app, car_id).await.attributes.get("model"), Some(&json!("Kia Soul")));
}

#[tokio::test]
async fn test_e2e_owner_car_list_rejects_bad_filter() {
    let app = setup_app(None);

    let response = app
        .oneshot(empty_request(
            "GET",
            "/my-carList/owner@example.com?filterDate=sideways",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "INVALID_QUERY");
}

#[tokio::test]
async fn test_e2e_malformed_id() {
    let app = setup_app(None);

    let response = app
        .oneshot(empty_request("GET", "/car-details/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// E2Eテスト: 予約
// ============================================================================

#[tokio::test]
async fn test_e2e_full_booking_flow() {
    let app = setup_app(None);
    let car_id = add_car(
        &app,
        json!({ "model": "VW Golf", "ownerEmail": "owner@example.com" }),
    )
    .await;

    // Step 1: 予約（POST /my-booking）
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/my-booking",
            &booking_body("renter@example.com", car_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let inserted: InsertResultResponse = read_json(response).await;
    let booking_id = inserted.inserted_id;

    // demandCount が1増える
    assert_eq!(get_car(&app, car_id).await.demand_count, 1);

    // Step 2: 重複予約は400
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/my-booking",
            &booking_body("renter@example.com", car_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"You Already This Car Booking");
    assert_eq!(get_car(&app, car_id).await.demand_count, 1);

    // Step 3: 予約者の一覧（GET /my-all-booking/:email）
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/my-all-booking/renter@example.com"))
        .await
        .unwrap();
    let bookings: Vec<BookingResponse> = read_json(response).await;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].id, booking_id);
    assert_eq!(bookings[0].status, "pending");
    assert_eq!(bookings[0].details.get("totalPrice"), Some(&json!(180)));

    // 所有者側の一覧（buyer=false）
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/my-all-booking/owner@example.com?buyer=false"))
        .await
        .unwrap();
    let received: Vec<BookingResponse> = read_json(response).await;
    assert_eq!(received.len(), 1);

    // Step 4: ステータス変更（PATCH /update-booking-status/:id）
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/update-booking-status/{}", booking_id),
            &json!({ "status": "confirmed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let update: UpdateResultResponse = read_json(response).await;
    assert_eq!(update.modified_count, 1);

    // Step 5: 日程変更（PATCH /update-booking-date/:id）
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/update-booking-date/{}", booking_id),
            &json!({ "endDate": "2025-07-05" }),
        ))
        .await
        .unwrap();
    let update: UpdateResultResponse = read_json(response).await;
    assert_eq!(update.matched_count, 1);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/my-all-booking/renter@example.com?buyer=true"))
        .await
        .unwrap();
    let bookings: Vec<BookingResponse> = read_json(response).await;
    assert_eq!(bookings[0].status, "confirmed");
    assert_eq!(bookings[0].start_date.as_deref(), Some("2025-07-01"));
    assert_eq!(bookings[0].end_date.as_deref(), Some("2025-07-05"));

    // Step 6: 削除（DELETE /remove-bookingCar/:id）を2回
    for expected in [1, 0] {
        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &format!("/remove-bookingCar/{}", booking_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let deleted: DeleteResultResponse = read_json(response).await;
        assert_eq!(deleted.deleted_count, expected);
    }
}

#[tokio::test]
async fn test_e2e_booking_status_errors() {
    let app = setup_app(None);
    let car_id = add_car(&app, json!({ "model": "Audi A3" })).await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/my-booking",
            &booking_body("renter@example.com", car_id),
        ))
        .await
        .unwrap();
    let inserted: InsertResultResponse = read_json(response).await;
    let uri = format!("/update-booking-status/{}", inserted.inserted_id);

    // 未定義のステータス
    let response = app
        .clone()
        .oneshot(json_request("PATCH", &uri, &json!({ "status": "whatever" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "INVALID_STATUS");

    // pending → completed は不可
    let response = app
        .clone()
        .oneshot(json_request("PATCH", &uri, &json!({ "status": "completed" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // 存在しない予約
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/update-booking-status/{}", uuid::Uuid::new_v4()),
            &json!({ "status": "confirmed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// E2Eテスト: Cookie JWT
// ============================================================================

#[tokio::test]
async fn test_e2e_jwt_routes_absent_without_secret() {
    let app = setup_app(None);

    let response = app
        .oneshot(json_request("POST", "/jwt", &json!({ "email": "a@example.com" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_jwt_cookie_authorizes_own_lists() {
    let app = setup_app(Some(test_auth()));

    // トークンなしは401
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/my-carList/renter@example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // トークン発行（POST /jwt）
    let response = app
        .clone()
        .oneshot(json_request("POST", "/jwt", &json!({ "email": "renter@example.com" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    // 本人のリストは200
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/my-all-booking/renter@example.com")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 他人のリストは403
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/my-carList/someone-else@example.com")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 不正なトークンは401
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/my-carList/renter@example.com")
                .header(header::COOKIE, "token=garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // ログアウトでCookie削除
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.starts_with("token="));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_e2e_logout_clears_cookie_with_secure_attributes() {
    let app = setup_app(Some(AuthConfig {
        secure_cookie: true,
        ..test_auth()
    }));

    let response = app
        .clone()
        .oneshot(json_request("POST", "/jwt", &json!({ "email": "renter@example.com" })))
        .await
        .unwrap();
    let issued = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(issued.contains("SameSite=None"));
    assert!(issued.contains("Secure"));
    let cookie = issued.split(';').next().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.starts_with("token=;"));
    assert!(cleared.contains("Max-Age=0"));
    assert!(cleared.contains("SameSite=None"));
    assert!(cleared.contains("Secure"));
    assert!(cleared.contains("Path=/"));
}
