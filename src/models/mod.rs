pub mod section;
pub mod seat;
pub mod venue;

pub use section::{BookingRule, Section};
pub use seat::{Seat, SeatKey, SeatKeyParseError};
pub use venue::{Venue, VenueError};
