//! Shared building blocks for the open market services.
//!
//! Response envelopes and paging, identifier generation, and the
//! tracing/metrics/shutdown plumbing every binary starts with.

pub mod ids;
pub mod observability;
pub mod shutdown;
pub mod telemetry;
pub mod types;

pub use ids::{generate_api_key, generate_id};
pub use observability::observability_router;
pub use shutdown::shutdown_signal;
pub use telemetry::{LogFormat, init_tracing, install_metrics_recorder};
pub use types::{ApiResponse, DEFAULT_PAGE_SIZE, PageRequest, PageResponse};
