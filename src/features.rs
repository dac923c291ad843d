//! The feature table: named reference sequences and their read counts.

use std::collections::HashMap;
use std::path::Path;

use crate::encode::encode;
use crate::error::{FeatureError, Result};

/// A named reference sequence to be counted (e.g., a guide RNA).
///
/// The sequence itself is the table key; the feature carries only its name
/// and the accumulated read count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub count: u64,
}

/// Mapping from encoded sequence to [`Feature`], unique keys.
///
/// Each worker owns its private copy for the duration of a file; counts are
/// exclusively mutated by the owning worker and read out at stream end.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    inner: HashMap<Vec<u8>, Feature>,
}

impl FeatureTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads features from a comma-separated file with at least two columns
    /// per line (`name,sequence`). Sequences are case-normalized and
    /// whitespace-stripped. Duplicate sequences collapse to the first-seen
    /// feature; the collision is logged and the run continues.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(FeatureError::MissingFile(path.to_path_buf()).into());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut table = Self::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let line = idx + 1;
            if record.len() < 2 {
                return Err(FeatureError::MalformedLine(path.to_path_buf(), line).into());
            }
            let name = record[0].trim().to_string();
            let sequence = encode(&record[1]);
            if sequence.is_empty() {
                return Err(FeatureError::MalformedLine(path.to_path_buf(), line).into());
            }
            if let Some(existing) = table.inner.get(&sequence) {
                log::warn!(
                    "{} and {} share the same sequence; only {} will be counted",
                    existing.name,
                    name,
                    existing.name
                );
            } else {
                table.inner.insert(sequence, Feature { name, count: 0 });
            }
        }

        if table.is_empty() {
            return Err(FeatureError::EmptyTable(path.to_path_buf()).into());
        }
        log::info!("loaded {} features from {:?}", table.len(), path);
        Ok(table)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates the encoded feature sequences, for the all-vs-all scan.
    pub fn sequences(&self) -> impl Iterator<Item = &[u8]> {
        self.inner.keys().map(Vec::as_slice)
    }

    /// Exact-lookup increment. Returns true on a hit.
    pub fn increment(&mut self, sequence: &[u8]) -> bool {
        if let Some(feature) = self.inner.get_mut(sequence) {
            feature.count += 1;
            true
        } else {
            false
        }
    }

    /// Extract-mode entry point: the observed window is the feature.
    /// Creates the entry on first sight (count = 1, named by its own
    /// sequence text) or increments the existing count.
    pub fn observe(&mut self, window: Vec<u8>) {
        if !self.increment(&window) {
            let name = String::from_utf8_lossy(&window).into_owned();
            self.inner.insert(window, Feature { name, count: 1 });
        }
    }

    /// `(name, count)` rows, sorted numerically when every feature name
    /// parses as an integer, lexically otherwise.
    #[must_use]
    pub fn sorted_rows(&self) -> Vec<(String, u64)> {
        let mut rows: Vec<(String, u64)> = self
            .inner
            .values()
            .map(|f| (f.name.clone(), f.count))
            .collect();
        if rows.iter().all(|(name, _)| name.parse::<i64>().is_ok()) {
            rows.sort_by_key(|(name, _)| name.parse::<i64>().unwrap_or_default());
        } else {
            rows.sort_by(|a, b| a.0.cmp(&b.0));
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_features(contents: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn loads_and_normalizes() -> Result<()> {
        let file = write_features("G1,aaaa\nG2, cc cc\n")?;
        let table = FeatureTable::from_csv(file.path())?;
        assert_eq!(table.len(), 2);
        let mut table = table;
        assert!(table.increment(b"AAAA"));
        assert!(table.increment(b"CCCC"));
        assert!(!table.increment(b"GGGG"));
        Ok(())
    }

    #[test]
    fn duplicate_sequence_keeps_first() -> Result<()> {
        let file = write_features("G1,AAAA\nG2,AAAA\n")?;
        let mut table = FeatureTable::from_csv(file.path())?;
        assert_eq!(table.len(), 1);
        table.increment(b"AAAA");
        assert_eq!(table.sorted_rows(), vec![("G1".to_string(), 1)]);
        Ok(())
    }

    #[test]
    fn malformed_line_is_fatal() -> Result<()> {
        let file = write_features("G1,AAAA\njustonecolumn\n")?;
        assert!(FeatureTable::from_csv(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn missing_file_is_fatal() {
        assert!(FeatureTable::from_csv("/nonexistent/features.csv").is_err());
    }

    #[test]
    fn empty_file_is_fatal() -> Result<()> {
        let file = write_features("")?;
        assert!(FeatureTable::from_csv(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn numeric_names_sort_numerically() -> Result<()> {
        let file = write_features("10,AAAA\n2,CCCC\n1,GGGG\n")?;
        let table = FeatureTable::from_csv(file.path())?;
        let names: Vec<String> = table.sorted_rows().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["1", "2", "10"]);
        Ok(())
    }

    #[test]
    fn mixed_names_sort_lexically() -> Result<()> {
        let file = write_features("10,AAAA\nG2,CCCC\n1,GGGG\n")?;
        let table = FeatureTable::from_csv(file.path())?;
        let names: Vec<String> = table.sorted_rows().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["1", "10", "G2"]);
        Ok(())
    }

    #[test]
    fn observe_creates_then_increments() {
        let mut table = FeatureTable::new();
        table.observe(b"ACGT".to_vec());
        table.observe(b"ACGT".to_vec());
        assert_eq!(table.sorted_rows(), vec![("ACGT".to_string(), 2)]);
    }
}
