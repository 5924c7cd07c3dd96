pub mod client;
pub mod error;
pub mod query;
pub mod transport;

pub use client::ApiClient;
pub use error::ApiError;
pub use query::{BuildFilters, ChangeFilters, Query};
pub use transport::{HttpTransport, Transport};
