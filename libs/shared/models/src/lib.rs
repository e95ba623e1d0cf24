pub mod error;
pub mod loose;
pub mod notice;
pub mod session;
