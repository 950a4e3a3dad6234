use crate::domain::{
    CarId,
    car::{Car, CarAttributes, OwnerCarOrder},
};
use crate::ports::car_inventory::{CarInventory as CarInventoryTrait, Result};
use crate::ports::write_result::{DeleteResult, UpdateResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};

/// Maps a `cars` row to a Car
///
/// demand_count is stored as BIGINT and must fit into u64.
fn map_row_to_car(row: &PgRow) -> Result<Car> {
    let demand_count: i64 = row.try_get("demand_count")?;
    let demand_count: u64 = demand_count.try_into().map_err(|_| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("demand_count out of range: {}", demand_count),
        )) as Box<dyn std::error::Error + Send + Sync>
    })?;

    let Json(attributes): Json<CarAttributes> = row.try_get("attributes")?;

    Ok(Car {
        car_id: CarId::from_uuid(row.try_get("id")?),
        attributes,
        demand_count,
        created_at: row.try_get("created_at")?,
    })
}

/// PostgreSQL implementation of CarInventory
///
/// Free-form attributes live in a JSONB column; the counter is a plain
/// BIGINT so increments are a single atomic UPDATE.
pub struct CarInventory {
    pool: PgPool,
}

impl CarInventory {
    /// Create a new CarInventory with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarInventoryTrait for CarInventory {
    async fn insert(&self, car: Car) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cars (id, attributes, demand_count, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(car.car_id.value())
        .bind(Json(&car.attributes))
        .bind(i64::try_from(car.demand_count)?)
        .bind(car.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, car_id: CarId) -> Result<Option<Car>> {
        let row = sqlx::query(
            r#"
            SELECT id, attributes, demand_count, created_at
            FROM cars
            WHERE id = $1
            "#,
        )
        .bind(car_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_car).transpose()
    }

    /// Lists cars in insertion order
    ///
    /// Uses strpos instead of ILIKE so that `%` and `_` in the search term
    /// are matched literally.
    async fn list(&self, search: Option<&str>) -> Result<Vec<Car>> {
        let rows = sqlx::query(
            r#"
            SELECT id, attributes, demand_count, created_at
            FROM cars
            WHERE $1::text IS NULL
               OR strpos(lower(attributes->>'model'), lower($1::text)) > 0
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(search)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_car).collect()
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Car>> {
        let rows = sqlx::query(
            r#"
            SELECT id, attributes, demand_count, created_at
            FROM cars
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::try_from(limit)?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_car).collect()
    }

    async fn list_by_owner(&self, owner_email: &str, order: OwnerCarOrder) -> Result<Vec<Car>> {
        let query = match order {
            OwnerCarOrder::Newest => {
                r#"
                SELECT id, attributes, demand_count, created_at
                FROM cars
                WHERE attributes->>'ownerEmail' = $1
                ORDER BY created_at DESC, id DESC
                "#
            }
            OwnerCarOrder::Oldest => {
                r#"
                SELECT id, attributes, demand_count, created_at
                FROM cars
                WHERE attributes->>'ownerEmail' = $1
                ORDER BY created_at ASC, id ASC
                "#
            }
        };

        let rows = sqlx::query(query)
            .bind(owner_email)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_car).collect()
    }

    /// Merges attributes into an existing car or inserts a new one
    ///
    /// The `previous` CTE reads the pre-statement snapshot, so a NULL
    /// previous_attributes means the row was created by this statement.
    async fn upsert_attributes(
        &self,
        car_id: CarId,
        attributes: CarAttributes,
        now: DateTime<Utc>,
    ) -> Result<UpdateResult> {
        let row = sqlx::query(
            r#"
            WITH previous AS (
                SELECT attributes FROM cars WHERE id = $1
            )
            INSERT INTO cars (id, attributes, demand_count, created_at)
            VALUES ($1, $2, 0, $3)
            ON CONFLICT (id)
            DO UPDATE SET attributes = cars.attributes || EXCLUDED.attributes
            RETURNING (SELECT attributes FROM previous) AS previous_attributes, attributes
            "#,
        )
        .bind(car_id.value())
        .bind(Json(&attributes))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        let previous: Option<Json<serde_json::Value>> = row.try_get("previous_attributes")?;
        let Json(current): Json<serde_json::Value> = row.try_get("attributes")?;

        Ok(match previous {
            None => UpdateResult::upserted(car_id.value()),
            Some(Json(previous)) => UpdateResult::matched(previous != current),
        })
    }

    async fn delete(&self, car_id: CarId) -> Result<DeleteResult> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(car_id.value())
            .execute(&self.pool)
            .await?;

        Ok(DeleteResult {
            deleted_count: result.rows_affected(),
        })
    }

    async fn increment_demand(&self, car_id: CarId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE cars
            SET demand_count = demand_count + 1
            WHERE id = $1
            "#,
        )
        .bind(car_id.value())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
