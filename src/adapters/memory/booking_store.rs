use crate::domain::{
    BookingId,
    booking::{Booking, BookingStatus},
};
use crate::ports::booking_store::{BookingStore as BookingStoreTrait, Result};
use crate::ports::write_result::{DeleteResult, UpdateResult};
use async_trait::async_trait;
use std::sync::RwLock;

use super::poisoned;

/// In-memory implementation of BookingStore
///
/// The uniqueness check and the insert happen under one write lock,
/// mirroring the unique constraint of the PostgreSQL adapter.
#[derive(Default)]
pub struct BookingStore {
    bookings: RwLock<Vec<Booking>>,
}

impl BookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings
    }
}

#[async_trait]
impl BookingStoreTrait for BookingStore {
    async fn insert_if_absent(&self, booking: Booking) -> Result<bool> {
        let mut bookings = self.bookings.write().map_err(poisoned)?;
        if bookings
            .iter()
            .any(|b| b.uniqueness_key() == booking.uniqueness_key())
        {
            return Ok(false);
        }
        bookings.push(booking);
        Ok(true)
    }

    async fn get_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().map_err(poisoned)?;
        Ok(bookings.iter().find(|b| b.booking_id == booking_id).cloned())
    }

    async fn find_by_requester(&self, requester_email: &str) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().map_err(poisoned)?;
        Ok(Self::newest_first(
            bookings
                .iter()
                .filter(|b| b.requester_email == requester_email)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_owner(&self, owner_email: &str) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().map_err(poisoned)?;
        Ok(Self::newest_first(
            bookings
                .iter()
                .filter(|b| b.owner_email.as_deref() == Some(owner_email))
                .cloned()
                .collect(),
        ))
    }

    async fn update_status(
        &self,
        booking_id: BookingId,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> Result<UpdateResult> {
        let mut bookings = self.bookings.write().map_err(poisoned)?;
        match bookings
            .iter_mut()
            .find(|b| b.booking_id == booking_id && b.status == expected)
        {
            Some(booking) => {
                let modified = booking.status != status;
                booking.status = status;
                Ok(UpdateResult::matched(modified))
            }
            None => Ok(UpdateResult::unmatched()),
        }
    }

    async fn update_dates(
        &self,
        booking_id: BookingId,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<UpdateResult> {
        let mut bookings = self.bookings.write().map_err(poisoned)?;
        let Some(booking) = bookings.iter_mut().find(|b| b.booking_id == booking_id) else {
            return Ok(UpdateResult::unmatched());
        };

        let mut modified = false;
        if let Some(start) = start_date {
            modified |= booking.start_date.as_deref() != Some(start.as_str());
            booking.start_date = Some(start);
        }
        if let Some(end) = end_date {
            modified |= booking.end_date.as_deref() != Some(end.as_str());
            booking.end_date = Some(end);
        }
        Ok(UpdateResult::matched(modified))
    }

    async fn delete(&self, booking_id: BookingId) -> Result<DeleteResult> {
        let mut bookings = self.bookings.write().map_err(poisoned)?;
        let before = bookings.len();
        bookings.retain(|b| b.booking_id != booking_id);
        Ok(DeleteResult {
            deleted_count: (before - bookings.len()) as u64,
        })
    }
}
