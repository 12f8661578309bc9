//! CSV-backed checkpoint table.
//!
//! The whole table lives in memory, keyed by identifier; `flush` writes it
//! atomically (tmp file + rename) so a killed process loses at most the
//! rows added since the last flush.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;

use crate::record::{self, FeatureRecord};

pub struct Checkpoint {
    path: PathBuf,
    rows: Vec<FeatureRecord>,
    index: FxHashMap<String, usize>,
}

impl Checkpoint {
    /// Load the table from `path`; a missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        let mut table = Self {
            path: path.to_path_buf(),
            rows: Vec::new(),
            index: FxHashMap::default(),
        };
        if !path.exists() {
            log::debug!("no checkpoint at {}, starting empty", path.display());
            return Ok(table);
        }

        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("cannot open checkpoint {}", path.display()))?;
        let header: FxHashMap<String, usize> = reader
            .headers()
            .context("checkpoint has no header row")?
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();

        for row in reader.records() {
            let row = row.context("malformed checkpoint row")?;
            let rec = FeatureRecord::from_row(&header, &row);
            if rec.identifier.is_empty() {
                log::warn!("skipping checkpoint row without identifier");
                continue;
            }
            table.upsert(rec);
        }
        log::info!(
            "loaded checkpoint: {} rows from {}",
            table.rows.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// Insert or replace by identifier (last write wins). The table never
    /// holds two rows for the same article.
    pub fn upsert(&mut self, record: FeatureRecord) {
        match self.index.get(&record.identifier) {
            Some(&pos) => self.rows[pos] = record,
            None => {
                self.index.insert(record.identifier.clone(), self.rows.len());
                self.rows.push(record);
            }
        }
    }

    /// Write the table to disk atomically.
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)
                .with_context(|| format!("cannot write {}", tmp.display()))?;
            writer.write_record(record::columns())?;
            for rec in &self.rows {
                writer.write_record(rec.to_row())?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("cannot replace {}", self.path.display()))?;
        log::debug!("checkpoint flushed: {} rows", self.rows.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, overpotential: Option<f64>) -> FeatureRecord {
        FeatureRecord {
            identifier: id.to_string(),
            url: format!("https://www.nature.com/articles/{id}"),
            title: format!("Article {id}"),
            text_length: 1000,
            quant: oerex_extract::features::QuantFeatures {
                overpotential_mv: overpotential,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let cp = Checkpoint::load(&dir.path().join("features.csv")).unwrap();
        assert!(cp.is_empty());
    }

    #[test]
    fn upsert_replaces_not_duplicates() {
        let dir = TempDir::new().unwrap();
        let mut cp = Checkpoint::load(&dir.path().join("features.csv")).unwrap();
        cp.upsert(record("a", Some(300.0)));
        cp.upsert(record("b", None));
        cp.upsert(record("a", Some(250.0)));
        assert_eq!(cp.len(), 2);
        let a = cp.records().iter().find(|r| r.identifier == "a").unwrap();
        assert_eq!(a.quant.overpotential_mv, Some(250.0));
    }

    #[test]
    fn flush_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("features.csv");
        let mut cp = Checkpoint::load(&path).unwrap();
        let mut rec = record("s41467-1", Some(198.25));
        rec.catalyst = Some("NiFe-LDH".into());
        rec.electrolyte = Some("KOH".into());
        cp.upsert(rec.clone());
        cp.upsert(record("s41467-2", None));
        cp.flush().unwrap();

        let reloaded = Checkpoint::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("s41467-1"));
        assert!(reloaded.contains("s41467-2"));
        let back = reloaded
            .records()
            .iter()
            .find(|r| r.identifier == "s41467-1")
            .unwrap();
        assert_eq!(back.quant.overpotential_mv, Some(198.25));
        assert_eq!(back.catalyst.as_deref(), Some("NiFe-LDH"));
        let two = reloaded
            .records()
            .iter()
            .find(|r| r.identifier == "s41467-2")
            .unwrap();
        assert_eq!(two.quant.overpotential_mv, None);
    }

    #[test]
    fn flush_overwrites_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("features.csv");
        let mut cp = Checkpoint::load(&path).unwrap();
        cp.upsert(record("a", None));
        cp.flush().unwrap();
        cp.upsert(record("b", None));
        cp.flush().unwrap();
        assert_eq!(Checkpoint::load(&path).unwrap().len(), 2);
    }
}
