use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingDetails};
use crate::domain::car::{Car, CarAttributes};
use crate::ports::{DeleteResult, InsertResult, UpdateResult};

// ============================================================================
// Query parameters
// ============================================================================

/// 車両一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSearchQuery {
    /// model に対する部分一致検索
    pub search_term: Option<String>,
}

/// 所有者の車両一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerCarsQuery {
    /// 並び順（newest / oldest）
    pub filter_date: Option<String>,
}

/// 予約一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    /// true（既定）なら予約者として、false なら所有者としての予約
    pub buyer: Option<bool>,
}

// ============================================================================
// Request bodies
// ============================================================================

/// 予約作成リクエスト（POST /my-booking）
///
/// 定義済み以外のフィールドは details にそのまま保存される。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub requester_email: String,
    pub car_id: Uuid,
    #[serde(default)]
    pub owner_email: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub details: BookingDetails,
}

/// ステータス変更リクエスト（PATCH /update-booking-status/:id）
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// 日程変更リクエスト（PATCH /update-booking-date/:id）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatesRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// トークン発行リクエスト（POST /jwt）
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

// ============================================================================
// Responses
// ============================================================================

/// 車両レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub attributes: CarAttributes,
    pub demand_count: u64,
    pub created_at: DateTime<Utc>,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            id: car.car_id.value(),
            attributes: car.attributes,
            demand_count: car.demand_count,
            created_at: car.created_at,
        }
    }
}

/// 予約レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub requester_email: String,
    pub car_id: Uuid,
    pub owner_email: Option<String>,
    pub status: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub details: BookingDetails,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.booking_id.value(),
            requester_email: booking.requester_email,
            car_id: booking.car_id.value(),
            owner_email: booking.owner_email,
            status: booking.status.as_str().to_string(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            details: booking.details,
            created_at: booking.created_at,
        }
    }
}

/// 挿入結果レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResultResponse {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

impl From<InsertResult> for InsertResultResponse {
    fn from(result: InsertResult) -> Self {
        Self {
            acknowledged: true,
            inserted_id: result.inserted_id,
        }
    }
}

/// 更新結果レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResultResponse {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Uuid>,
}

impl From<UpdateResult> for UpdateResultResponse {
    fn from(result: UpdateResult) -> Self {
        Self {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        }
    }
}

/// 削除結果レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResultResponse {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl From<DeleteResult> for DeleteResultResponse {
    fn from(result: DeleteResult) -> Self {
        Self {
            acknowledged: true,
            deleted_count: result.deleted_count,
        }
    }
}

/// Cookie操作の結果
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
