use super::{BookingId, CarId, booking::BookingDetails, car::CarAttributes};

/// コマンド：車両を登録する
#[derive(Debug, Clone, PartialEq)]
pub struct AddCar {
    pub attributes: CarAttributes,
}

/// コマンド：車両属性を部分更新する（存在しなければ作成）
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCar {
    pub car_id: CarId,
    pub attributes: CarAttributes,
}

/// コマンド：車両を予約する
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBooking {
    pub requester_email: String,
    pub car_id: CarId,
    pub owner_email: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub details: BookingDetails,
}

/// コマンド：予約ステータスを変更する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBookingStatus {
    pub booking_id: BookingId,
    pub status: String,
}

/// コマンド：予約日程を変更する
///
/// None のフィールドは変更しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBookingDates {
    pub booking_id: BookingId,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}
