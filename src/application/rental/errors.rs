use crate::domain::{BookingStatusError, booking::BookingStatus};
use thiserror::Error;

/// レンタル管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum RentalApplicationError {
    /// 同じ予約者・車両の予約が既に存在する
    #[error("You Already This Car Booking")]
    DuplicateBooking,

    /// 車両が見つからない
    #[error("Car not found")]
    CarNotFound,

    /// 予約が見つからない
    #[error("Booking not found")]
    BookingNotFound,

    /// 定義されていないステータス
    #[error("Invalid booking status: {0}")]
    InvalidStatus(String),

    /// 許可されていない状態遷移
    #[error("Cannot change booking status from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// クエリパラメータが不正
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// CarInventoryのエラー
    #[error("Car inventory error")]
    CarInventoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// BookingStoreのエラー
    #[error("Booking store error")]
    BookingStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<BookingStatusError> for RentalApplicationError {
    fn from(err: BookingStatusError) -> Self {
        match err {
            BookingStatusError::Unknown(status) => RentalApplicationError::InvalidStatus(status),
            BookingStatusError::InvalidTransition { from, to } => {
                RentalApplicationError::InvalidTransition { from, to }
            }
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, RentalApplicationError>;
