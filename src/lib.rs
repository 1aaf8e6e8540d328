pub mod api;
pub mod config;
pub mod ledger;
pub mod observability;
pub mod pdf;
pub mod storage;
pub mod workflow;
