use crate::domain::{
    self, CarId,
    car::{Car, OwnerCarOrder},
    commands::*,
};
use crate::ports::*;

use super::booking_service::ServiceDependencies;
use super::errors::{RentalApplicationError, Result};

/// 新着一覧の最大件数
pub const RECENT_CARS_LIMIT: usize = 6;

/// 車両を登録する
///
/// 予約済みキー（_id, demandCount, createdAt）は無視し、
/// demand_count は0から開始する。
pub async fn add_car(deps: &ServiceDependencies, cmd: AddCar) -> Result<CarId> {
    let car = domain::car::add_car(cmd.attributes, chrono::Utc::now());
    let car_id = car.car_id;

    deps.car_inventory
        .insert(car)
        .await
        .map_err(RentalApplicationError::CarInventoryError)?;

    tracing::debug!(%car_id, "Car added");
    Ok(car_id)
}

/// IDで車両を取得する
pub async fn get_car(deps: &ServiceDependencies, car_id: CarId) -> Result<Car> {
    deps.car_inventory
        .get_by_id(car_id)
        .await
        .map_err(RentalApplicationError::CarInventoryError)?
        .ok_or(RentalApplicationError::CarNotFound)
}

/// 車両一覧を取得する
///
/// 検索語が空（空白のみを含む）の場合は絞り込まずに全件を返す。
pub async fn list_cars(deps: &ServiceDependencies, search_term: Option<&str>) -> Result<Vec<Car>> {
    let search = search_term.map(str::trim).filter(|term| !term.is_empty());

    deps.car_inventory
        .list(search)
        .await
        .map_err(RentalApplicationError::CarInventoryError)
}

/// 新着の車両を最大6件取得する
pub async fn recent_cars(deps: &ServiceDependencies) -> Result<Vec<Car>> {
    deps.car_inventory
        .list_recent(RECENT_CARS_LIMIT)
        .await
        .map_err(RentalApplicationError::CarInventoryError)
}

/// 所有者の車両一覧を取得する
///
/// filter_date は "newest"（既定）または "oldest"。
pub async fn list_owner_cars(
    deps: &ServiceDependencies,
    owner_email: &str,
    filter_date: Option<&str>,
) -> Result<Vec<Car>> {
    let order = match filter_date.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value
            .parse::<OwnerCarOrder>()
            .map_err(RentalApplicationError::InvalidQuery)?,
        None => OwnerCarOrder::default(),
    };

    deps.car_inventory
        .list_by_owner(owner_email, order)
        .await
        .map_err(RentalApplicationError::CarInventoryError)
}

/// 車両属性を部分更新する（存在しなければ作成）
pub async fn update_car(deps: &ServiceDependencies, cmd: UpdateCar) -> Result<UpdateResult> {
    let attributes = domain::car::sanitize_attributes(cmd.attributes);

    deps.car_inventory
        .upsert_attributes(cmd.car_id, attributes, chrono::Utc::now())
        .await
        .map_err(RentalApplicationError::CarInventoryError)
}

/// 車両を削除する
///
/// 存在しない車両の場合は deleted_count = 0 の結果を返す。
pub async fn delete_car(deps: &ServiceDependencies, car_id: CarId) -> Result<DeleteResult> {
    deps.car_inventory
        .delete(car_id)
        .await
        .map_err(RentalApplicationError::CarInventoryError)
}
