use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub user_id: i64,
    pub status: String, // RESERVED | PAID
    pub is_remote: bool,
    pub includes_hotel: bool,
}

impl Ticket {
    /// A ticket admits its holder to the hotel only when it is paid,
    /// in-person and sold with accommodation.
    pub fn grants_hotel_stay(&self) -> bool {
        self.status == "PAID" && !self.is_remote && self.includes_hotel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(status: &str, is_remote: bool, includes_hotel: bool) -> Ticket {
        Ticket {
            id: 1,
            user_id: 1,
            status: status.to_string(),
            is_remote,
            includes_hotel,
        }
    }

    #[test]
    fn paid_in_person_hotel_ticket_is_eligible() {
        assert!(ticket("PAID", false, true).grants_hotel_stay());
    }

    #[test]
    fn unpaid_remote_or_hotelless_tickets_are_not() {
        assert!(!ticket("RESERVED", false, true).grants_hotel_stay());
        assert!(!ticket("PAID", true, true).grants_hotel_stay());
        assert!(!ticket("PAID", false, false).grants_hotel_stay());
    }
}
