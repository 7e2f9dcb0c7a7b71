use tracing::{debug, info};

use crate::error::{BookingError, ForbiddenReason, NotFoundReason, Result};
use crate::models::{Booking, Room};
use crate::store::{BookingStore, RoomStore, TicketStore};

/// Orchestrates the three booking use cases over the backing stores.
///
/// Holds no state of its own between calls; every request is a fresh
/// read/write sequence against the stores.
#[derive(Clone)]
pub struct BookingService<B, R, T> {
    bookings: B,
    rooms: R,
    tickets: T,
}

impl<B, R, T> BookingService<B, R, T>
where
    B: BookingStore,
    R: RoomStore,
    T: TicketStore,
{
    pub fn new(bookings: B, rooms: R, tickets: T) -> Self {
        Self {
            bookings,
            rooms,
            tickets,
        }
    }

    /// The caller's booking joined with the room it points at.
    pub async fn booking_for_user(&self, user_id: i64) -> Result<(Booking, Room)> {
        let booking = self
            .bookings
            .find_by_user(user_id)
            .await?
            .ok_or(BookingError::NotFound(NotFoundReason::Booking))?;

        // The room can be retired while bookings still reference it.
        let room = self.require_room(booking.room_id).await?;

        Ok((booking, room))
    }

    /// Book a room for the caller.
    ///
    /// Order matters: ticket before room, room before capacity. A user may
    /// end up with several bookings; the store does not enforce one-per-user.
    pub async fn create_booking(&self, user_id: i64, room_id: i64) -> Result<Booking> {
        let ticket = self
            .tickets
            .find_by_user(user_id)
            .await?
            .ok_or(BookingError::NotFound(NotFoundReason::Ticket))?;

        if !ticket.grants_hotel_stay() {
            return Err(BookingError::Forbidden(ForbiddenReason::IneligibleTicket));
        }

        let room = self.require_room(room_id).await?;

        let booking = self
            .bookings
            .create_in_room(user_id, &room)
            .await?
            .ok_or_else(|| {
                debug!("room {} is full, rejecting booking for user {}", room.id, user_id);
                BookingError::Forbidden(ForbiddenReason::RoomFull)
            })?;

        info!("user {} booked room {} (booking {})", user_id, room.id, booking.id);
        Ok(booking)
    }

    /// Move the caller's booking to another room.
    pub async fn change_room(
        &self,
        user_id: i64,
        booking_id: i64,
        room_id: i64,
    ) -> Result<Booking> {
        let owned = self.bookings.find_all_by_user(user_id).await?;
        if owned.is_empty() {
            return Err(BookingError::NotFound(NotFoundReason::Booking));
        }

        let room = self.require_room(room_id).await?;

        let booking = self
            .bookings
            .move_to_room(booking_id, &room)
            .await?
            .ok_or_else(|| {
                debug!("room {} is full, rejecting move of booking {}", room.id, booking_id);
                BookingError::Forbidden(ForbiddenReason::RoomFull)
            })?;

        info!("booking {} moved to room {}", booking.id, room.id);
        Ok(booking)
    }

    async fn require_room(&self, room_id: i64) -> Result<Room> {
        self.rooms
            .find_by_id(room_id)
            .await?
            .ok_or(BookingError::NotFound(NotFoundReason::Room))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ticket;
    use crate::store::memory::{MemoryBookings, MemoryRooms, MemoryTickets};
    use fake::faker::name::en::Name;
    use fake::Fake;
    use proptest::prelude::*;

    type TestService = BookingService<MemoryBookings, MemoryRooms, MemoryTickets>;

    fn setup() -> (TestService, MemoryBookings, MemoryRooms, MemoryTickets) {
        let bookings = MemoryBookings::new();
        let rooms = MemoryRooms::new();
        let tickets = MemoryTickets::new();
        let service = BookingService::new(bookings.clone(), rooms.clone(), tickets.clone());
        (service, bookings, rooms, tickets)
    }

    fn room(id: i64, capacity: i32) -> Room {
        Room {
            id,
            name: Name().fake(),
            capacity,
        }
    }

    fn paid_hotel_ticket(user_id: i64) -> Ticket {
        Ticket {
            id: user_id,
            user_id,
            status: "PAID".to_string(),
            is_remote: false,
            includes_hotel: true,
        }
    }

    /* ---------- retrieve ---------- */

    #[tokio::test]
    async fn retrieve_without_booking_is_not_found() {
        let (service, _, _, _) = setup();

        let err = service.booking_for_user(1).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::NotFound(NotFoundReason::Booking)
        ));
    }

    #[tokio::test]
    async fn retrieve_after_room_was_deleted_is_not_found() {
        let (service, _, rooms, tickets) = setup();
        rooms.insert(room(1, 3));
        tickets.issue(paid_hotel_ticket(7));
        service.create_booking(7, 1).await.unwrap();

        rooms.remove(1);

        let err = service.booking_for_user(7).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(NotFoundReason::Room)));
    }

    #[tokio::test]
    async fn retrieve_returns_booking_with_its_room() {
        let (service, _, rooms, tickets) = setup();
        let stored = room(1, 3);
        rooms.insert(stored.clone());
        tickets.issue(paid_hotel_ticket(7));
        let created = service.create_booking(7, 1).await.unwrap();

        let (booking, found) = service.booking_for_user(7).await.unwrap();
        assert_eq!(booking.id, created.id);
        assert_eq!(found.id, stored.id);
        assert_eq!(found.name, stored.name);
        assert_eq!(found.capacity, stored.capacity);
    }

    /* ---------- create ---------- */

    #[tokio::test]
    async fn create_without_ticket_is_not_found() {
        let (service, _, rooms, _) = setup();
        rooms.insert(room(1, 3));

        let err = service.create_booking(7, 1).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(NotFoundReason::Ticket)));
    }

    #[tokio::test]
    async fn create_with_ineligible_ticket_is_forbidden() {
        let (service, bookings, rooms, tickets) = setup();
        rooms.insert(room(1, 3));

        let mut unpaid = paid_hotel_ticket(7);
        unpaid.status = "RESERVED".to_string();
        let mut remote = paid_hotel_ticket(8);
        remote.is_remote = true;
        let mut hotelless = paid_hotel_ticket(9);
        hotelless.includes_hotel = false;

        for (user_id, ticket) in [(7, unpaid), (8, remote), (9, hotelless)] {
            tickets.issue(ticket);
            let err = service.create_booking(user_id, 1).await.unwrap_err();
            assert!(matches!(
                err,
                BookingError::Forbidden(ForbiddenReason::IneligibleTicket)
            ));
        }

        assert!(bookings.find_all_by_room(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_for_missing_room_is_not_found() {
        let (service, _, _, tickets) = setup();
        tickets.issue(paid_hotel_ticket(7));

        let err = service.create_booking(7, 99).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(NotFoundReason::Room)));
    }

    #[tokio::test]
    async fn create_when_room_is_full_is_forbidden_and_writes_nothing() {
        let (service, bookings, rooms, tickets) = setup();
        rooms.insert(room(1, 1));
        tickets.issue(paid_hotel_ticket(7));
        tickets.issue(paid_hotel_ticket(8));
        service.create_booking(7, 1).await.unwrap();

        let err = service.create_booking(8, 1).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::Forbidden(ForbiddenReason::RoomFull)
        ));
        assert_eq!(bookings.find_all_by_room(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_with_free_capacity_returns_new_booking() {
        let (service, bookings, rooms, tickets) = setup();
        rooms.insert(room(1, 2));
        tickets.issue(paid_hotel_ticket(7));

        let booking = service.create_booking(7, 1).await.unwrap();
        assert_eq!(booking.user_id, 7);
        assert_eq!(booking.room_id, 1);
        assert_eq!(bookings.find_all_by_room(1).await.unwrap().len(), 1);
    }

    // One-booking-per-user is not enforced anywhere; a repeated create just
    // adds a second record.
    #[tokio::test]
    async fn repeated_create_adds_a_second_record() {
        let (service, bookings, rooms, tickets) = setup();
        rooms.insert(room(1, 5));
        tickets.issue(paid_hotel_ticket(7));

        let first = service.create_booking(7, 1).await.unwrap();
        let second = service.create_booking(7, 1).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(bookings.find_all_by_user(7).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn capacity_one_room_admits_exactly_one_booking() {
        let (service, bookings, rooms, tickets) = setup();
        rooms.insert(room(1, 1));
        tickets.issue(paid_hotel_ticket(7));
        tickets.issue(paid_hotel_ticket(8));

        service.create_booking(7, 1).await.unwrap();
        let err = service.create_booking(8, 1).await.unwrap_err();

        assert!(matches!(
            err,
            BookingError::Forbidden(ForbiddenReason::RoomFull)
        ));
        assert_eq!(bookings.find_all_by_room(1).await.unwrap().len(), 1);
    }

    /* ---------- change room ---------- */

    #[tokio::test]
    async fn change_room_without_any_booking_is_not_found() {
        let (service, _, rooms, _) = setup();
        rooms.insert(room(1, 3));

        let err = service.change_room(7, 1, 1).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::NotFound(NotFoundReason::Booking)
        ));
    }

    #[tokio::test]
    async fn change_room_to_missing_room_is_not_found() {
        let (service, _, rooms, tickets) = setup();
        rooms.insert(room(1, 3));
        tickets.issue(paid_hotel_ticket(7));
        let booking = service.create_booking(7, 1).await.unwrap();

        let err = service.change_room(7, booking.id, 99).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(NotFoundReason::Room)));
    }

    #[tokio::test]
    async fn change_room_to_full_room_is_forbidden_and_leaves_booking_alone() {
        let (service, bookings, rooms, tickets) = setup();
        rooms.insert(room(1, 3));
        rooms.insert(room(2, 1));
        tickets.issue(paid_hotel_ticket(7));
        tickets.issue(paid_hotel_ticket(8));
        let moving = service.create_booking(7, 1).await.unwrap();
        service.create_booking(8, 2).await.unwrap();

        let err = service.change_room(7, moving.id, 2).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::Forbidden(ForbiddenReason::RoomFull)
        ));

        let unchanged = bookings.find_by_user(7).await.unwrap().unwrap();
        assert_eq!(unchanged.room_id, 1);
    }

    #[tokio::test]
    async fn change_room_keeps_the_booking_id_and_rewrites_the_room() {
        let (service, bookings, rooms, tickets) = setup();
        rooms.insert(room(1, 3));
        rooms.insert(room(2, 3));
        tickets.issue(paid_hotel_ticket(7));
        let booking = service.create_booking(7, 1).await.unwrap();

        let moved = service.change_room(7, booking.id, 2).await.unwrap();
        assert_eq!(moved.id, booking.id);
        assert_eq!(moved.room_id, 2);

        let stored = bookings.find_by_user(7).await.unwrap().unwrap();
        assert_eq!(stored.room_id, 2);
        assert_eq!(bookings.find_all_by_room(1).await.unwrap().len(), 0);
    }

    // The occupant count for the target room is taken as-is; a booking moved
    // within its own room still counts against that room's capacity.
    #[tokio::test]
    async fn change_room_counts_the_moving_booking_itself() {
        let (service, _, rooms, tickets) = setup();
        rooms.insert(room(1, 1));
        tickets.issue(paid_hotel_ticket(7));
        let booking = service.create_booking(7, 1).await.unwrap();

        let err = service.change_room(7, booking.id, 1).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::Forbidden(ForbiddenReason::RoomFull)
        ));
    }

    #[tokio::test]
    async fn change_room_with_vanished_booking_id_surfaces_a_store_error() {
        let (service, _, rooms, tickets) = setup();
        rooms.insert(room(1, 3));
        rooms.insert(room(2, 3));
        tickets.issue(paid_hotel_ticket(7));
        service.create_booking(7, 1).await.unwrap();

        let err = service.change_room(7, 999, 2).await.unwrap_err();
        assert!(matches!(err, BookingError::Database(_)));
    }

    /* ---------- capacity invariant ---------- */

    proptest! {
        // However many eligible users pile onto one room, occupancy never
        // exceeds capacity.
        #[test]
        fn occupancy_never_exceeds_capacity(capacity in 0i32..8, attempts in 0i64..32) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            rt.block_on(async {
                let (service, bookings, rooms, tickets) = setup();
                rooms.insert(room(1, capacity));

                for user_id in 1..=attempts {
                    tickets.issue(paid_hotel_ticket(user_id));
                    let _ = service.create_booking(user_id, 1).await;
                }

                let occupied = bookings.find_all_by_room(1).await.unwrap().len();
                prop_assert!(occupied <= capacity as usize);
                Ok(())
            })?;
        }
    }
}
