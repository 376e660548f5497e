//! Shared data model for the disambig toolkit.
//!
//! A corpus is a stream of [`Record`]s: flat field-name -> value maps, one
//! per tagged token occurrence. Three fields matter here, selected by
//! [`CorpusKeys`]: the lemma, the secondary tag (part of speech, gender,
//! whatever is hypothesized to correlate with sense), and the
//! disambiguation index separating the senses of a lemma.
//!
//! Scanning a corpus produces a [`CoOccurrenceTable`]: per lemma, per
//! disambiguation index, how often each secondary tag was seen. The table
//! is built once and read-only afterwards; iteration order over its maps is
//! unspecified, so consumers that need determinism must sort.
//!
//! ```rust
//! use disambig_types::{CoOccurrenceTable, CorpusKeys, Record, index_is_set};
//!
//! let keys = CorpusKeys::new("pos");
//! let record = Record::from_iter([("lemma", "qui"), ("pos", "PROrel"), ("Dis", "1")]);
//! assert_eq!(record.get(&keys.lemma), Some("qui"));
//! assert!(index_is_set(record.get(&keys.index).unwrap()));
//!
//! let mut table = CoOccurrenceTable::new();
//! table.record("qui", "1", "PROrel");
//! assert_eq!(table.get("qui").unwrap()["1"]["PROrel"], 1);
//! ```

use std::collections::HashMap;

/// Default column holding the lemma.
pub const DEFAULT_LEMMA_KEY: &str = "lemma";

/// Default column holding the disambiguation index.
pub const DEFAULT_INDEX_KEY: &str = "Dis";

/// Placeholder used by annotators for "no disambiguation index".
pub const NULL_MARKER: &str = "_";

/// Token emitted for lemmas that are known but need manual review.
pub const DEFAULT_REVIEW_TOKEN: &str = "?";

/// True when a raw index value is an actual index rather than the null
/// marker or an empty cell.
pub fn index_is_set(raw: &str) -> bool {
    !raw.is_empty() && raw != NULL_MARKER
}

/// Column names selecting the three required fields of a corpus record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CorpusKeys {
    pub lemma: String,
    pub category: String,
    pub index: String,
}

impl CorpusKeys {
    /// Keys with the given secondary-tag column and the default lemma and
    /// index columns.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            lemma: DEFAULT_LEMMA_KEY.to_owned(),
            category: category.into(),
            index: DEFAULT_INDEX_KEY.to_owned(),
        }
    }
}

/// One tagged token occurrence: a flat field-name -> value mapping.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Per-index tag counters for one lemma: index -> tag -> occurrence count.
pub type SenseCounts = HashMap<String, HashMap<String, u64>>;

/// Per-lemma counts of (disambiguation index, secondary tag) co-occurrences.
///
/// Counts are always at least 1: a pair that was never observed is simply
/// absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoOccurrenceTable {
    counts: HashMap<String, SenseCounts>,
}

impl CoOccurrenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one observation of `lemma` under `index` with tag `category`.
    pub fn record(&mut self, lemma: &str, index: &str, category: &str) {
        *self
            .counts
            .entry(lemma.to_owned())
            .or_default()
            .entry(index.to_owned())
            .or_default()
            .entry(category.to_owned())
            .or_default() += 1;
    }

    pub fn get(&self, lemma: &str) -> Option<&SenseCounts> {
        self.counts.get(lemma)
    }

    /// Iterate over lemmas and their sense counters, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SenseCounts)> {
        self.counts.iter().map(|(lemma, senses)| (lemma.as_str(), senses))
    }

    pub fn lemma_count(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_markers_are_not_indices() {
        assert!(index_is_set("1"));
        assert!(index_is_set("2b"));
        assert!(!index_is_set(""));
        assert!(!index_is_set("_"));
    }

    #[test]
    fn keys_default_to_lemma_and_dis() {
        let keys = CorpusKeys::new("gend");
        assert_eq!(keys.lemma, "lemma");
        assert_eq!(keys.category, "gend");
        assert_eq!(keys.index, "Dis");
    }

    #[test]
    fn records_expose_fields_by_name() {
        let record = Record::from_iter([("lemma", "quis"), ("pos", "PROint")]);
        assert_eq!(record.get("lemma"), Some("quis"));
        assert_eq!(record.get("pos"), Some("PROint"));
        assert_eq!(record.get("Dis"), None);
    }

    #[test]
    fn table_accumulates_counts() {
        let mut table = CoOccurrenceTable::new();
        table.record("qui", "1", "PROrel");
        table.record("qui", "1", "PROrel");
        table.record("qui", "2", "PROint");

        let senses = table.get("qui").unwrap();
        assert_eq!(senses["1"]["PROrel"], 2);
        assert_eq!(senses["2"]["PROint"], 1);
        assert_eq!(table.lemma_count(), 1);
    }
}
