//! oerex-core - Common infrastructure for the article acquisition pipeline
//!
//! Provides the HTTP fetcher with retry and rate-limit delays, logging,
//! progress reporting, and graceful-shutdown support shared by the
//! acquisition and extraction crates.

pub mod fetch;
pub mod logging;
pub mod progress;
pub mod shutdown;

// Re-exports for convenience
pub use fetch::{FetchError, Fetcher, FetcherConfig};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use shutdown::{is_shutdown_requested, register_signal_handlers, request_shutdown};
