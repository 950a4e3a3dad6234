use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{BookingId, BookingStatusError, CarId, commands::CreateBooking};

/// 予約の自由形式の追加フィールド
pub type BookingDetails = Map<String, Value>;

/// サーバー側で管理するキー
const RESERVED_FIELDS: [&str; 3] = ["_id", "status", "createdAt"];

/// 予約ステータス
///
/// 状態遷移：
/// - Pending → Confirmed | Canceled
/// - Confirmed → Completed | Canceled
/// - Canceled, Completed は終端状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// 承認待ち
    Pending,
    /// 承認済み
    Confirmed,
    /// キャンセル済み
    Canceled,
    /// 利用完了
    Completed,
}

impl BookingStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Canceled => "canceled",
            BookingStatus::Completed => "completed",
        }
    }

    /// 終端状態かどうか
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Canceled | BookingStatus::Completed)
    }

    /// self から next への遷移が許可されているか
    ///
    /// 同じ状態への遷移は常に許可（変更なし）。
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }

        matches!(
            (*self, next),
            (Pending, Confirmed)
                | (Pending, Canceled)
                | (Confirmed, Completed)
                | (Confirmed, Canceled)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = BookingStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "canceled" | "cancelled" => Ok(BookingStatus::Canceled),
            "completed" => Ok(BookingStatus::Completed),
            _ => Err(BookingStatusError::Unknown(s.to_string())),
        }
    }
}

/// 予約レコード
///
/// (requester_email, car_id) の組につき1件のみ存在できる。
/// car_id は車両への参照だが、存在は強制しない。
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub booking_id: BookingId,
    pub requester_email: String,
    pub car_id: CarId,
    pub owner_email: Option<String>,
    pub status: BookingStatus,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub details: BookingDetails,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// 重複判定に用いるキー
    pub fn uniqueness_key(&self) -> (&str, CarId) {
        (self.requester_email.as_str(), self.car_id)
    }
}

/// 純粋関数：予約を作成する
///
/// 新しい予約は常にPending状態で始まる。
pub fn create_booking(cmd: CreateBooking, now: DateTime<Utc>) -> Booking {
    Booking {
        booking_id: BookingId::new(),
        requester_email: cmd.requester_email,
        car_id: cmd.car_id,
        owner_email: cmd.owner_email,
        status: BookingStatus::Pending,
        start_date: cmd.start_date,
        end_date: cmd.end_date,
        details: sanitize_details(cmd.details),
        created_at: now,
    }
}

/// 純粋関数：ステータス遷移を検証する
pub fn transition_status(
    current: BookingStatus,
    next: BookingStatus,
) -> Result<BookingStatus, BookingStatusError> {
    if current.can_transition_to(next) {
        Ok(next)
    } else {
        Err(BookingStatusError::InvalidTransition {
            from: current,
            to: next,
        })
    }
}

fn sanitize_details(mut details: BookingDetails) -> BookingDetails {
    for key in RESERVED_FIELDS {
        details.remove(key);
    }
    details
}
