pub mod booking_store;
pub mod car_inventory;

pub use booking_store::BookingStore as MemoryBookingStore;
pub use car_inventory::CarInventory as MemoryCarInventory;

/// Converts a poisoned lock into the ports' boxed error type.
fn poisoned<T>(err: std::sync::PoisonError<T>) -> Box<dyn std::error::Error + Send + Sync> {
    format!("in-memory store lock poisoned: {}", err).into()
}
