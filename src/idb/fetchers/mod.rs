//! Fetcher implementations for remote IDB repositories

pub mod http;

pub use http::HttpFetcher;
