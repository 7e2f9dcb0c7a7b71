use sqlx::PgPool;

use super::{BookingStore, RoomStore, TicketStore};
use crate::error::Result;
use crate::models::{Booking, Room, Ticket};

#[derive(Clone)]
pub struct PgRoomStore {
    pool: PgPool,
}

impl PgRoomStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RoomStore for PgRoomStore {
    async fn find_by_id(&self, room_id: i64) -> Result<Option<Room>> {
        let room = sqlx::query_as::<_, Room>("SELECT id, name, capacity FROM rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(room)
    }
}

#[derive(Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TicketStore for PgTicketStore {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Ticket>> {
        let ticket = sqlx::query_as::<_, Ticket>(
            "SELECT id, user_id, status, is_remote, includes_hotel
             FROM tickets
             WHERE user_id = $1
             ORDER BY id DESC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ticket)
    }
}

#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl BookingStore for PgBookingStore {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            "SELECT id, user_id, room_id, created_at
             FROM bookings
             WHERE user_id = $1
             ORDER BY id
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn find_all_by_user(&self, user_id: i64) -> Result<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT id, user_id, room_id, created_at
             FROM bookings
             WHERE user_id = $1
             ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn find_all_by_room(&self, room_id: i64) -> Result<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT id, user_id, room_id, created_at
             FROM bookings
             WHERE room_id = $1
             ORDER BY id",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn create_in_room(&self, user_id: i64, room: &Room) -> Result<Option<Booking>> {
        let mut tx = self.pool.begin().await?;

        // Writers against the same room queue up on this row lock until
        // commit, so count-then-insert stays serialized per room.
        sqlx::query("SELECT id FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(room.id)
            .fetch_optional(&mut *tx)
            .await?;

        let occupied =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE room_id = $1")
                .bind(room.id)
                .fetch_one(&mut *tx)
                .await?;

        if occupied >= i64::from(room.capacity) {
            tx.rollback().await?;
            return Ok(None);
        }

        let booking = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (user_id, room_id)
             VALUES ($1, $2)
             RETURNING id, user_id, room_id, created_at",
        )
        .bind(user_id)
        .bind(room.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(booking))
    }

    async fn move_to_room(&self, booking_id: i64, room: &Room) -> Result<Option<Booking>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(room.id)
            .fetch_optional(&mut *tx)
            .await?;

        let occupied =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE room_id = $1")
                .bind(room.id)
                .fetch_one(&mut *tx)
                .await?;

        if occupied >= i64::from(room.capacity) {
            tx.rollback().await?;
            return Ok(None);
        }

        // RowNotFound here means the booking vanished between the caller's
        // precondition check and now; it bubbles up as a store error.
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings
             SET room_id = $2
             WHERE id = $1
             RETURNING id, user_id, room_id, created_at",
        )
        .bind(booking_id)
        .bind(room.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(booking))
    }
}
