//! oerex-nature - Acquisition pipeline for the Nature search source
//!
//! Walks listing pages of a search query, acquires candidate articles
//! through the rate-limited fetcher, classifies paywalls, extracts text
//! and features, and persists one checkpoint row per article.

pub mod article;
pub mod config;
pub mod coverage;
pub mod listing;
pub mod paywall;
pub mod runner;
pub mod stats;

pub use config::Config;
pub use runner::{Mode, parse_existing, run};
