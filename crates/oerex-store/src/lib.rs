//! oerex-store - Persistence for the feature table and raw documents
//!
//! The checkpoint table is the pipeline's resumption record: one CSV row
//! per article, reloaded at startup and flushed after every addition.
//! The raw cache keeps one fetched document per identifier so re-runs
//! never re-fetch.

pub mod checkpoint;
pub mod raw_cache;
pub mod record;

pub use checkpoint::Checkpoint;
pub use raw_cache::RawCache;
pub use record::FeatureRecord;
