pub mod codec;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod pad;
pub mod pipeline;
pub mod session;
pub mod snapshot;
pub mod tags;
pub mod utils;
pub mod worker;

// Re-export error types for convenience
pub use error::UrlPadError;
