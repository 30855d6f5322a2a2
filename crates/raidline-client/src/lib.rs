//! HTTP client for the RAID item-management API.
//!
//! Provides [`HttpItemApi`], the production [`ItemApi`](raidline_command::ItemApi)
//! implementation used by the terminal binary.

pub mod http;

pub use http::HttpItemApi;
