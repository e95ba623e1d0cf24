pub mod flow;
pub mod gateway;
pub mod ledger;
pub mod signature;
pub mod wallet;
