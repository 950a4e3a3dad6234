pub mod booking_store;
pub mod car_inventory;

// パブリックに型を再エクスポート
pub use booking_store::BookingStore as PostgresBookingStore;
pub use car_inventory::CarInventory as PostgresCarInventory;
