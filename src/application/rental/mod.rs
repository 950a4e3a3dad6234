mod booking_service;
mod errors;
mod inventory_service;

pub use booking_service::{
    BookingParty, ServiceDependencies, create_booking, list_bookings, remove_booking,
    update_booking_dates, update_booking_status,
};
pub use errors::{RentalApplicationError, Result};
pub use inventory_service::{
    RECENT_CARS_LIMIT, add_car, delete_car, get_car, list_cars, list_owner_cars, recent_cars,
    update_car,
};
