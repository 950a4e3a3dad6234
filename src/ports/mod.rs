pub mod booking_store;
pub mod car_inventory;
pub mod write_result;

pub use booking_store::BookingStore;
pub use car_inventory::CarInventory;
pub use write_result::*;
