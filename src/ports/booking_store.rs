use crate::domain::{
    BookingId,
    booking::{Booking, BookingStatus},
};
use async_trait::async_trait;

use super::write_result::{DeleteResult, UpdateResult};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 予約ストアポート
///
/// (requester_email, car_id) の一意性はストア側で保証する。
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// 同じ (requester_email, car_id) の予約がなければ挿入する
    ///
    /// 判定と挿入は不可分に行われる。既に存在した場合は false を返し、
    /// 何も書き込まない。
    async fn insert_if_absent(&self, booking: Booking) -> Result<bool>;

    /// IDで予約を取得する
    async fn get_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>>;

    /// 予約者の全予約を新しい順に取得する
    async fn find_by_requester(&self, requester_email: &str) -> Result<Vec<Booking>>;

    /// 車両所有者宛ての全予約を新しい順に取得する
    async fn find_by_owner(&self, owner_email: &str) -> Result<Vec<Booking>>;

    /// 現在のステータスが expected の場合のみステータスを書き換える
    ///
    /// 比較と書き込みは不可分に行われる。予約が存在しないか、
    /// ステータスが expected と異なる場合は matched_count = 0 を返す。
    async fn update_status(
        &self,
        booking_id: BookingId,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> Result<UpdateResult>;

    /// 日程を上書きする（None のフィールドはそのまま）
    async fn update_dates(
        &self,
        booking_id: BookingId,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<UpdateResult>;

    /// 予約を削除する
    async fn delete(&self, booking_id: BookingId) -> Result<DeleteResult>;
}
