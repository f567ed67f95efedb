//! Shared test utilities

#![allow(dead_code)]

pub mod fetcher;
pub mod fixture;

pub use fetcher::FakeFetcher;
pub use fixture::{create_test_root, sqlite_bytes, utc};
