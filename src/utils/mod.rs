pub mod attribute;
pub mod base64;
pub mod http;
pub mod query;
pub mod system;
pub mod url;

// Re-export common utilities
pub use http::{Fetch, HttpFetcher};
