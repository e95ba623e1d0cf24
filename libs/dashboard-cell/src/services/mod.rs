pub mod bookings;
pub mod photo;
pub mod reminders;
pub mod wallet;
