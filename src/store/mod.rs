pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::models::{Booking, Room, Ticket};
use std::future::Future;

/// Read access to bookable rooms.
pub trait RoomStore: Send + Sync {
    fn find_by_id(&self, room_id: i64) -> impl Future<Output = Result<Option<Room>>> + Send;
}

/// Read access to a user's event ticket. The registration pipeline that
/// issues and pays tickets lives elsewhere; this store only surfaces the row.
pub trait TicketStore: Send + Sync {
    fn find_by_user(&self, user_id: i64) -> impl Future<Output = Result<Option<Ticket>>> + Send;
}

/// CRUD access to booking records.
pub trait BookingStore: Send + Sync {
    /// The user's current booking, oldest first when there are several.
    fn find_by_user(&self, user_id: i64) -> impl Future<Output = Result<Option<Booking>>> + Send;

    fn find_all_by_user(&self, user_id: i64) -> impl Future<Output = Result<Vec<Booking>>> + Send;

    fn find_all_by_room(&self, room_id: i64) -> impl Future<Output = Result<Vec<Booking>>> + Send;

    /// Insert a booking for `user_id` in `room`, unless the room is already
    /// at capacity — then `Ok(None)` and nothing is written. The occupancy
    /// count and the insert happen under one room-scoped guard, so two
    /// concurrent calls cannot both squeeze into the last free slot.
    fn create_in_room(
        &self,
        user_id: i64,
        room: &Room,
    ) -> impl Future<Output = Result<Option<Booking>>> + Send;

    /// Point an existing booking at `room`, under the same capacity guard as
    /// `create_in_room`. The occupancy count is the raw number of bookings
    /// already referencing the target room; a booking moved within its own
    /// room still counts against it. Errors if the booking row is gone.
    fn move_to_room(
        &self,
        booking_id: i64,
        room: &Room,
    ) -> impl Future<Output = Result<Option<Booking>>> + Send;
}
