pub mod dates;
pub mod inventory;
pub mod on_behalf;
pub mod submission;
pub mod workflow;
