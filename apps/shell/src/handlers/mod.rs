pub mod config;
pub mod contract;
pub mod failed;
