//! In-memory store implementations backing the test suite.
//!
//! Each store keeps its rows behind a single mutex, which makes the
//! count-then-write sequence in `create_in_room`/`move_to_room` atomic the
//! same way the room-scoped transaction does in the Postgres stores.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{BookingStore, RoomStore, TicketStore};
use crate::error::{BookingError, ForbiddenReason, Result};
use crate::models::{Booking, Room, Ticket};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| BookingError::Forbidden(ForbiddenReason::Other))
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRooms {
    rooms: Arc<Mutex<HashMap<i64, Room>>>,
}

impl MemoryRooms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, room: Room) {
        self.rooms.lock().expect("room store poisoned").insert(room.id, room);
    }

    pub fn remove(&self, room_id: i64) {
        self.rooms.lock().expect("room store poisoned").remove(&room_id);
    }
}

impl RoomStore for MemoryRooms {
    async fn find_by_id(&self, room_id: i64) -> Result<Option<Room>> {
        Ok(lock(&self.rooms)?.get(&room_id).cloned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTickets {
    tickets: Arc<Mutex<HashMap<i64, Ticket>>>,
}

impl MemoryTickets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, ticket: Ticket) {
        self.tickets
            .lock()
            .expect("ticket store poisoned")
            .insert(ticket.user_id, ticket);
    }
}

impl TicketStore for MemoryTickets {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Ticket>> {
        Ok(lock(&self.tickets)?.get(&user_id).cloned())
    }
}

#[derive(Debug, Default)]
struct BookingRows {
    next_id: i64,
    rows: Vec<Booking>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBookings {
    inner: Arc<Mutex<BookingRows>>,
}

impl MemoryBookings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookingStore for MemoryBookings {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Booking>> {
        Ok(lock(&self.inner)?
            .rows
            .iter()
            .find(|b| b.user_id == user_id)
            .cloned())
    }

    async fn find_all_by_user(&self, user_id: i64) -> Result<Vec<Booking>> {
        Ok(lock(&self.inner)?
            .rows
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_all_by_room(&self, room_id: i64) -> Result<Vec<Booking>> {
        Ok(lock(&self.inner)?
            .rows
            .iter()
            .filter(|b| b.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn create_in_room(&self, user_id: i64, room: &Room) -> Result<Option<Booking>> {
        let mut inner = lock(&self.inner)?;

        let occupied = inner.rows.iter().filter(|b| b.room_id == room.id).count();
        if occupied as i64 >= i64::from(room.capacity) {
            return Ok(None);
        }

        inner.next_id += 1;
        let booking = Booking {
            id: inner.next_id,
            user_id,
            room_id: room.id,
            created_at: chrono::Utc::now().naive_utc(),
        };
        inner.rows.push(booking.clone());
        Ok(Some(booking))
    }

    async fn move_to_room(&self, booking_id: i64, room: &Room) -> Result<Option<Booking>> {
        let mut inner = lock(&self.inner)?;

        let occupied = inner.rows.iter().filter(|b| b.room_id == room.id).count();
        if occupied as i64 >= i64::from(room.capacity) {
            return Ok(None);
        }

        let row = inner
            .rows
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or(BookingError::Database(sqlx::Error::RowNotFound))?;
        row.room_id = room.id;
        Ok(Some(row.clone()))
    }
}
