use crate::domain::{
    self, BookingId,
    booking::{Booking, BookingStatus},
    commands::*,
};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{RentalApplicationError, Result};

/// サービスの依存関係
///
/// ストアへのハンドルはグローバルに保持せず、このデータ構造として
/// 各関数に明示的に渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub car_inventory: Arc<dyn CarInventory>,
    pub booking_store: Arc<dyn BookingStore>,
}

/// 予約一覧の対象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingParty {
    /// 予約者として行った予約
    Requester,
    /// 所有車両に対して受けた予約
    Owner,
}

/// 車両を予約する
///
/// 処理の流れ：
/// 1. (requester_email, car_id) が未登録の場合のみ予約を挿入（不可分）
/// 2. 既に存在すれば DuplicateBooking
/// 3. 車両の demand_count を1増やす
///
/// 車両の存在は強制しない。対象車両がない場合はカウンタ更新が0件となり、
/// 警告ログのみ出して予約は成立させる。
///
/// # 補償
///
/// 3でストアエラーが発生した場合、1で挿入した予約を削除してからエラーを返す。
/// カウンタ未更新の予約が残らないようにするため。
///
/// # 戻り値
/// 成功時は作成された予約のID
pub async fn create_booking(deps: &ServiceDependencies, cmd: CreateBooking) -> Result<BookingId> {
    let booking = domain::booking::create_booking(cmd, chrono::Utc::now());
    let booking_id = booking.booking_id;
    let car_id = booking.car_id;
    let requester_email = booking.requester_email.clone();

    // 1. 重複判定と挿入
    let inserted = deps
        .booking_store
        .insert_if_absent(booking)
        .await
        .map_err(RentalApplicationError::BookingStoreError)?;

    if !inserted {
        tracing::info!(%car_id, requester = %requester_email, "Duplicate booking rejected");
        return Err(RentalApplicationError::DuplicateBooking);
    }

    // 2. 人気カウンタを更新
    match deps.car_inventory.increment_demand(car_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(
                %car_id,
                %booking_id,
                "Booked car does not exist; demand count not updated"
            );
        }
        Err(e) => {
            tracing::error!(%car_id, %booking_id, "Failed to increment demand count: {}", e);
            if let Err(rollback) = deps.booking_store.delete(booking_id).await {
                tracing::error!(
                    %booking_id,
                    "Failed to remove booking after counter failure: {}",
                    rollback
                );
            }
            return Err(RentalApplicationError::CarInventoryError(e));
        }
    }

    tracing::debug!(%booking_id, %car_id, "Booking created");
    Ok(booking_id)
}

/// 予約一覧を取得する
pub async fn list_bookings(
    deps: &ServiceDependencies,
    email: &str,
    party: BookingParty,
) -> Result<Vec<Booking>> {
    let bookings = match party {
        BookingParty::Requester => deps.booking_store.find_by_requester(email).await,
        BookingParty::Owner => deps.booking_store.find_by_owner(email).await,
    };

    bookings.map_err(RentalApplicationError::BookingStoreError)
}

/// 予約ステータスを変更する
///
/// ステータスは定義済みの値のみ受け付け、状態遷移の妥当性を検証する。
///
/// 書き込みは読み取り時のステータスを前提とした比較付き更新で行う。
/// 他のリクエストが先にステータスを変えていた場合は読み直し、
/// 新しいステータスに対して遷移を検証し直す。
pub async fn update_booking_status(
    deps: &ServiceDependencies,
    cmd: UpdateBookingStatus,
) -> Result<UpdateResult> {
    let requested = cmd
        .status
        .parse::<BookingStatus>()
        .map_err(|_| RentalApplicationError::InvalidStatus(cmd.status.clone()))?;

    loop {
        let booking = deps
            .booking_store
            .get_by_id(cmd.booking_id)
            .await
            .map_err(RentalApplicationError::BookingStoreError)?
            .ok_or(RentalApplicationError::BookingNotFound)?;

        let next = domain::booking::transition_status(booking.status, requested)
            .map_err(RentalApplicationError::from)?;

        let result = deps
            .booking_store
            .update_status(cmd.booking_id, booking.status, next)
            .await
            .map_err(RentalApplicationError::BookingStoreError)?;

        if result.matched_count > 0 {
            return Ok(result);
        }

        // 遷移は一方向にしか進まないため、再試行は有限回で終わる
        tracing::debug!(
            booking_id = %cmd.booking_id,
            "Booking status changed concurrently; retrying"
        );
    }
}

/// 予約日程を変更する
///
/// 存在しない予約の場合はエラーではなく matched_count = 0 の結果を返す。
pub async fn update_booking_dates(
    deps: &ServiceDependencies,
    cmd: UpdateBookingDates,
) -> Result<UpdateResult> {
    deps.booking_store
        .update_dates(cmd.booking_id, cmd.start_date, cmd.end_date)
        .await
        .map_err(RentalApplicationError::BookingStoreError)
}

/// 予約を削除する
///
/// 存在しない予約の場合は deleted_count = 0 の結果を返す。
/// demand_count は人気の累計のため減らさない。
pub async fn remove_booking(
    deps: &ServiceDependencies,
    booking_id: BookingId,
) -> Result<DeleteResult> {
    deps.booking_store
        .delete(booking_id)
        .await
        .map_err(RentalApplicationError::BookingStoreError)
}
