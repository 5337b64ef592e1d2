pub mod config;
pub mod ledger;
pub mod network;
pub mod wallet;
