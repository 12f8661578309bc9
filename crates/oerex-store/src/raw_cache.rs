//! On-disk cache of fetched documents, one file per identifier.
//!
//! Content-addressed by identifier (not content hash): an existing file
//! short-circuits re-fetching. Carries an advisory size cap so long runs
//! do not fill the disk unnoticed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Normalize an article identifier into a filesystem-safe file stem.
/// `/` and `:` become `_`; the mapping is deterministic.
pub fn safe_stem(identifier: &str) -> String {
    identifier.trim().replace(['/', ':'], "_")
}

pub struct RawCache {
    dir: PathBuf,
}

impl RawCache {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create raw dir {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, identifier: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{}.{ext}", safe_stem(identifier)))
    }

    /// Path of the cached document for this identifier, if any format
    /// is present.
    pub fn find(&self, identifier: &str) -> Option<PathBuf> {
        ["html", "pdf"]
            .iter()
            .map(|ext| self.path(identifier, ext))
            .find(|p| p.exists())
    }

    /// Store a fetched HTML document, returning its path.
    pub fn store_html(&self, identifier: &str, body: &str) -> Result<PathBuf> {
        let path = self.path(identifier, "html");
        std::fs::write(&path, body)
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(path)
    }

    /// Recursive size of the cache directory in megabytes.
    pub fn size_mb(&self) -> f64 {
        fn dir_size(path: &Path) -> u64 {
            let Ok(entries) = std::fs::read_dir(path) else {
                return 0;
            };
            entries
                .flatten()
                .map(|e| {
                    let p = e.path();
                    if p.is_dir() {
                        dir_size(&p)
                    } else {
                        e.metadata().map(|m| m.len()).unwrap_or(0)
                    }
                })
                .sum()
        }
        dir_size(&self.dir) as f64 / (1024.0 * 1024.0)
    }

    /// Advisory storage cap check. A run that exceeds the cap stops
    /// acquiring but keeps what it has.
    pub fn within_limit(&self, limit_mb: f64) -> bool {
        let size = self.size_mb();
        if size > limit_mb {
            log::warn!("raw cache at {size:.1} MB exceeds advisory limit {limit_mb:.1} MB");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn safe_stem_replaces_separators() {
        assert_eq!(
            safe_stem("10.1038/s41467-021-12345-z"),
            "10.1038_s41467-021-12345-z"
        );
        assert_eq!(safe_stem(" doi:abc "), "doi_abc");
    }

    #[test]
    fn store_then_find() {
        let dir = TempDir::new().unwrap();
        let cache = RawCache::new(dir.path()).unwrap();
        assert!(cache.find("s41467-1").is_none());
        let path = cache.store_html("s41467-1", "<html></html>").unwrap();
        assert_eq!(cache.find("s41467-1"), Some(path));
    }

    #[test]
    fn size_and_limit() {
        let dir = TempDir::new().unwrap();
        let cache = RawCache::new(dir.path()).unwrap();
        cache.store_html("a", &"x".repeat(2 * 1024 * 1024)).unwrap();
        assert!(cache.size_mb() >= 2.0);
        assert!(cache.within_limit(500.0));
        assert!(!cache.within_limit(1.0));
    }
}
