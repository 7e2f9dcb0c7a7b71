pub mod booking;
pub mod room;
pub mod ticket;

pub use booking::Booking;
pub use room::Room;
pub use ticket::Ticket;
