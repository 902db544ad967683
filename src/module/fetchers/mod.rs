//! Resource fetchers
//!
//! - [`StaticFetcher`]: resources held in memory, optionally delayed
//! - [`FsFetcher`]: static files under a root directory
//! - [`HttpFetcher`]: resources on an HTTP(S) origin (`http` feature)

pub mod fs;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;

pub use fs::FsFetcher;
#[cfg(feature = "http")]
pub use http::HttpFetcher;
pub use memory::StaticFetcher;
