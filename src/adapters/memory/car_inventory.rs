use crate::domain::{
    CarId,
    car::{self, Car, CarAttributes, OwnerCarOrder},
};
use crate::ports::car_inventory::{CarInventory as CarInventoryTrait, Result};
use crate::ports::write_result::{DeleteResult, UpdateResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::RwLock;

use super::poisoned;

/// In-memory implementation of CarInventory
///
/// Cars are kept in insertion order so that unfiltered listings match
/// the natural order of the PostgreSQL adapter.
#[derive(Default)]
pub struct CarInventory {
    cars: RwLock<Vec<Car>>,
}

impl CarInventory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CarInventoryTrait for CarInventory {
    async fn insert(&self, car: Car) -> Result<()> {
        let mut cars = self.cars.write().map_err(poisoned)?;
        if cars.iter().any(|c| c.car_id == car.car_id) {
            return Err(format!("car {} already exists", car.car_id).into());
        }
        cars.push(car);
        Ok(())
    }

    async fn get_by_id(&self, car_id: CarId) -> Result<Option<Car>> {
        let cars = self.cars.read().map_err(poisoned)?;
        Ok(cars.iter().find(|c| c.car_id == car_id).cloned())
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<Car>> {
        let cars = self.cars.read().map_err(poisoned)?;
        Ok(cars
            .iter()
            .filter(|c| search.is_none_or(|term| c.matches_search(term)))
            .cloned()
            .collect())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Car>> {
        let cars = self.cars.read().map_err(poisoned)?;
        let mut recent: Vec<Car> = cars.clone();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        Ok(recent)
    }

    async fn list_by_owner(&self, owner_email: &str, order: OwnerCarOrder) -> Result<Vec<Car>> {
        let cars = self.cars.read().map_err(poisoned)?;
        let mut owned: Vec<Car> = cars
            .iter()
            .filter(|c| c.owner_email() == Some(owner_email))
            .cloned()
            .collect();
        match order {
            OwnerCarOrder::Newest => owned.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            OwnerCarOrder::Oldest => owned.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        Ok(owned)
    }

    async fn upsert_attributes(
        &self,
        car_id: CarId,
        attributes: CarAttributes,
        now: DateTime<Utc>,
    ) -> Result<UpdateResult> {
        let mut cars = self.cars.write().map_err(poisoned)?;
        match cars.iter_mut().find(|c| c.car_id == car_id) {
            Some(existing) => {
                let modified = car::merge_attributes(&mut existing.attributes, attributes);
                Ok(UpdateResult::matched(modified))
            }
            None => {
                cars.push(Car {
                    car_id,
                    attributes,
                    demand_count: 0,
                    created_at: now,
                });
                Ok(UpdateResult::upserted(car_id.value()))
            }
        }
    }

    async fn delete(&self, car_id: CarId) -> Result<DeleteResult> {
        let mut cars = self.cars.write().map_err(poisoned)?;
        let before = cars.len();
        cars.retain(|c| c.car_id != car_id);
        Ok(DeleteResult {
            deleted_count: (before - cars.len()) as u64,
        })
    }

    async fn increment_demand(&self, car_id: CarId) -> Result<bool> {
        let mut cars = self.cars.write().map_err(poisoned)?;
        match cars.iter_mut().find(|c| c.car_id == car_id) {
            Some(car) => {
                car.demand_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn car_with(attributes: serde_json::Value, created_at: DateTime<Utc>) -> Car {
        car::add_car(attributes.as_object().cloned().unwrap(), created_at)
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first_and_capped() {
        let inventory = CarInventory::new();
        let base = Utc::now();
        for i in 0..8 {
            let created_at = base + Duration::seconds(i);
            let car = car_with(json!({ "model": format!("car-{}", i) }), created_at);
            inventory.insert(car).await.unwrap();
        }

        let recent = inventory.list_recent(6).await.unwrap();

        assert_eq!(recent.len(), 6);
        assert_eq!(recent[0].model(), Some("car-7"));
        assert_eq!(recent[5].model(), Some("car-2"));
    }

    #[tokio::test]
    async fn test_upsert_creates_then_merges() {
        let inventory = CarInventory::new();
        let car_id = CarId::new();
        let attrs = |v: serde_json::Value| v.as_object().cloned().unwrap();

        let created = inventory
            .upsert_attributes(car_id, attrs(json!({ "model": "Civic" })), Utc::now())
            .await
            .unwrap();
        assert_eq!(created, UpdateResult::upserted(car_id.value()));

        let updated = inventory
            .upsert_attributes(car_id, attrs(json!({ "price": 30 })), Utc::now())
            .await
            .unwrap();
        assert_eq!(updated, UpdateResult::matched(true));

        let car = inventory.get_by_id(car_id).await.unwrap().unwrap();
        assert_eq!(car.model(), Some("Civic"));
        assert_eq!(car.attributes.get("price"), Some(&json!(30)));
        assert_eq!(car.demand_count, 0);
    }

    #[tokio::test]
    async fn test_increment_missing_car() {
        let inventory = CarInventory::new();

        assert!(!inventory.increment_demand(CarId::new()).await.unwrap());
    }
}
