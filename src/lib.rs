pub mod config;
pub mod idb;
pub mod logging;
