use crate::domain::{
    CarId,
    car::{Car, CarAttributes, OwnerCarOrder},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::write_result::{DeleteResult, UpdateResult};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 車両在庫ポート
///
/// 車両レコードの永続化を抽象化する。
/// demand_count の更新は increment_demand のみが行う。
#[async_trait]
pub trait CarInventory: Send + Sync {
    /// 車両を新規登録する
    async fn insert(&self, car: Car) -> Result<()>;

    /// IDで車両を取得する
    async fn get_by_id(&self, car_id: CarId) -> Result<Option<Car>>;

    /// 車両一覧を取得する
    ///
    /// search が Some の場合、model 属性に対する大文字小文字を区別しない
    /// 部分一致で絞り込む。並び順は登録順。
    async fn list(&self, search: Option<&str>) -> Result<Vec<Car>>;

    /// 新しい順に最大 limit 件の車両を取得する
    async fn list_recent(&self, limit: usize) -> Result<Vec<Car>>;

    /// 所有者の車両を取得する
    async fn list_by_owner(&self, owner_email: &str, order: OwnerCarOrder) -> Result<Vec<Car>>;

    /// 属性をマージする。車両が存在しなければ作成する（upsert）。
    ///
    /// 新規作成時の登録日時には now を使う。
    async fn upsert_attributes(
        &self,
        car_id: CarId,
        attributes: CarAttributes,
        now: DateTime<Utc>,
    ) -> Result<UpdateResult>;

    /// 車両を削除する
    async fn delete(&self, car_id: CarId) -> Result<DeleteResult>;

    /// demand_count を1増やす
    ///
    /// 対象の車両が存在しない場合は false を返す。
    async fn increment_demand(&self, car_id: CarId) -> Result<bool>;
}
