pub mod directory;
pub mod filter;
