pub mod login;
pub mod password_reset;
pub mod registration;
