#![allow(dead_code)]

use async_trait::async_trait;
use nexdrive_rental::domain::{
    BookingId,
    booking::{Booking, BookingStatus},
};
use nexdrive_rental::ports::{BookingStore, DeleteResult, UpdateResult, booking_store};
use sqlx::PgPool;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Barrier;

/// テスト用データベースプールを作成し、マイグレーションを実行
///
/// DATABASE_URL が未設定の場合は None を返し、呼び出し側のテストはスキップする。
/// 本番と同じマイグレーションファイルを sqlx migrate で適用する。
pub async fn create_test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
        return None;
    };

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// 各テストの前に全データを削除する
pub async fn cleanup_database(pool: &PgPool) {
    sqlx::query("TRUNCATE TABLE bookings, cars")
        .execute(pool)
        .await
        .expect("Failed to truncate tables");
}

/// 最初の parties 回の get_by_id を読み取り後に待ち合わせさせる BookingStore
///
/// 全員が同じ状態を読んでから書き込みに進むため、
/// 読み取りと書き込みの間に別のリクエストが割り込む状況を確実に再現できる。
pub struct InterleavingBookingStore {
    inner: Arc<dyn BookingStore>,
    barrier: Barrier,
    parties: usize,
    reads: AtomicUsize,
}

impl InterleavingBookingStore {
    pub fn new(inner: Arc<dyn BookingStore>, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
            parties,
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BookingStore for InterleavingBookingStore {
    async fn insert_if_absent(&self, booking: Booking) -> booking_store::Result<bool> {
        self.inner.insert_if_absent(booking).await
    }

    async fn get_by_id(&self, booking_id: BookingId) -> booking_store::Result<Option<Booking>> {
        let found = self.inner.get_by_id(booking_id).await?;
        if self.reads.fetch_add(1, Ordering::SeqCst) < self.parties {
            self.barrier.wait().await;
        }
        Ok(found)
    }

    async fn find_by_requester(
        &self,
        requester_email: &str,
    ) -> booking_store::Result<Vec<Booking>> {
        self.inner.find_by_requester(requester_email).await
    }

    async fn find_by_owner(&self, owner_email: &str) -> booking_store::Result<Vec<Booking>> {
        self.inner.find_by_owner(owner_email).await
    }

    async fn update_status(
        &self,
        booking_id: BookingId,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> booking_store::Result<UpdateResult> {
        self.inner.update_status(booking_id, expected, status).await
    }

    async fn update_dates(
        &self,
        booking_id: BookingId,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> booking_store::Result<UpdateResult> {
        self.inner.update_dates(booking_id, start_date, end_date).await
    }

    async fn delete(&self, booking_id: BookingId) -> booking_store::Result<DeleteResult> {
        self.inner.delete(booking_id).await
    }
}
