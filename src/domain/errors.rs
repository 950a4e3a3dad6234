use super::booking::BookingStatus;
use thiserror::Error;

/// 予約ステータス変更のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingStatusError {
    /// 定義されていないステータス文字列
    #[error("Unknown booking status: {0}")]
    Unknown(String),
    /// 許可されていない状態遷移
    #[error("Cannot change booking status from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
}
