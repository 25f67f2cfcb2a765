//! # TempoDB Client Library
//!
//! A synchronous client for the TempoDB hosted time-series database. It
//! builds authenticated HTTP requests, encodes query options as request
//! parameters and decodes (possibly paginated) responses into typed values.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tempodb::{Credentials, Filter, TempoDb};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TempoDb::new(Credentials::new("api-key", "api-secret"));
//!
//! // Single entity: a tagged success/failure response
//! let response = client.get_series_by_key("temp-1");
//! if let Some(series) = response.value() {
//!     println!("{} ({})", series.key, series.name);
//! }
//!
//! // Paginated: the first page is fetched now, later pages on demand
//! let filter = Filter::new().add_tag("outdoor");
//! for series in client.get_series_by_filter(&filter)? {
//!     println!("{}", series?.key);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`credentials`] - API key/secret pair
//! - [`model`] - Payload types (series, data points, summaries)
//! - [`query`] - Query options (interval, rollup, filter, ...)
//! - [`client`] - Request building, parameter encoding, transport, response
//!   wrapping, pagination and the [`TempoDb`] facade
//!
//! ## Logging
//!
//! The crate emits `tracing` events at debug (requests, page fetches) and
//! warn (failed requests) level. It never installs a subscriber.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// HTTP client, pagination and the API facade
pub mod client;

/// API credentials
pub mod credentials;

/// Payload types
pub mod model;

/// Query option value objects
pub mod query;

// Re-export commonly used types
pub use client::{
    ClientConfig, ClientError, ClientResult, Cursor, QueryResult, Response, State, TempoDb,
};
pub use credentials::Credentials;
pub use model::{
    DataPoint, DataPointFound, DeleteSummary, MultiDataPoint, MultiPoint, Nothing, Series,
    SingleValue, Summary, WriteRequest,
};
pub use query::{
    Aggregation, Direction, Filter, Fold, Interpolation, InterpolationFunction, Interval,
    MultiRollup, Period, Predicate, Rollup, Zone,
};
