pub mod cascade;
pub mod lookup;
