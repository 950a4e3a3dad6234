use crate::domain::{
    BookingId, CarId,
    booking::{Booking, BookingDetails, BookingStatus},
};
use crate::ports::booking_store::{BookingStore as BookingStoreTrait, Result};
use crate::ports::write_result::{DeleteResult, UpdateResult};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use std::str::FromStr;

const BOOKING_COLUMNS: &str = r#"
    id,
    requester_email,
    car_id,
    owner_email,
    status,
    start_date,
    end_date,
    details,
    created_at
"#;

/// Maps a `bookings` row to a Booking
fn map_row_to_booking(row: &PgRow) -> Result<Booking> {
    let status_str: &str = row.try_get("status")?;
    let status = BookingStatus::from_str(status_str).map_err(|e| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{:?}", e),
        )) as Box<dyn std::error::Error + Send + Sync>
    })?;

    let Json(details): Json<BookingDetails> = row.try_get("details")?;

    Ok(Booking {
        booking_id: BookingId::from_uuid(row.try_get("id")?),
        requester_email: row.try_get("requester_email")?,
        car_id: CarId::from_uuid(row.try_get("car_id")?),
        owner_email: row.try_get("owner_email")?,
        status,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        details,
        created_at: row.try_get("created_at")?,
    })
}

/// PostgreSQL implementation of BookingStore
///
/// Duplicate detection relies on the `uq_bookings_requester_car` unique
/// constraint, so concurrent requests for the same pair cannot both insert.
pub struct BookingStore {
    pool: PgPool,
}

impl BookingStore {
    /// Create a new BookingStore with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by(&self, column: &'static str, email: &str) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE {} = $1 ORDER BY created_at DESC, id DESC",
            BOOKING_COLUMNS, column
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_booking).collect()
    }
}

#[async_trait]
impl BookingStoreTrait for BookingStore {
    async fn insert_if_absent(&self, booking: Booking) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookings (
                id,
                requester_email,
                car_id,
                owner_email,
                status,
                start_date,
                end_date,
                details,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (requester_email, car_id) DO NOTHING
            "#,
        )
        .bind(booking.booking_id.value())
        .bind(&booking.requester_email)
        .bind(booking.car_id.value())
        .bind(&booking.owner_email)
        .bind(booking.status.as_str())
        .bind(&booking.start_date)
        .bind(&booking.end_date)
        .bind(Json(&booking.details))
        .bind(booking.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(booking_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_booking).transpose()
    }

    async fn find_by_requester(&self, requester_email: &str) -> Result<Vec<Booking>> {
        self.find_by("requester_email", requester_email).await
    }

    async fn find_by_owner(&self, owner_email: &str) -> Result<Vec<Booking>> {
        self.find_by("owner_email", owner_email).await
    }

    async fn update_status(
        &self,
        booking_id: BookingId,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> Result<UpdateResult> {
        // The row lock taken by UPDATE re-checks the status predicate,
        // so a concurrent writer that changed it first leaves 0 rows here.
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2
            WHERE id = $1 AND status = $3
            "#,
        )
        .bind(booking_id.value())
        .bind(status.as_str())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(UpdateResult::unmatched());
        }
        Ok(UpdateResult::matched(expected != status))
    }

    async fn update_dates(
        &self,
        booking_id: BookingId,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<UpdateResult> {
        let row = sqlx::query(
            r#"
            WITH previous AS (
                SELECT start_date, end_date FROM bookings WHERE id = $1
            )
            UPDATE bookings
            SET start_date = COALESCE($2, bookings.start_date),
                end_date = COALESCE($3, bookings.end_date)
            WHERE id = $1
            RETURNING
                (SELECT start_date FROM previous) IS DISTINCT FROM bookings.start_date
                OR (SELECT end_date FROM previous) IS DISTINCT FROM bookings.end_date
                AS modified
            "#,
        )
        .bind(booking_id.value())
        .bind(start_date)
        .bind(end_date)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(UpdateResult::unmatched()),
            Some(row) => Ok(UpdateResult::matched(row.try_get("modified")?)),
        }
    }

    async fn delete(&self, booking_id: BookingId) -> Result<DeleteResult> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id.value())
            .execute(&self.pool)
            .await?;

        Ok(DeleteResult {
            deleted_count: result.rows_affected(),
        })
    }
}
