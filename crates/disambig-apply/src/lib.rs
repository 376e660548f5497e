//! Runtime lookup-table disambiguators.
//!
//! Four variants behind one [`Disambiguator`] trait, each an immutable
//! wrapper around a table the classifier produced:
//!
//! - [`StraightDisambiguator`]: lemma -> index, for lemmas with a single
//!   observed sense.
//! - [`CategoryDisambiguator`]: lemma -> (tag value -> index), for lemmas a
//!   secondary tag resolves.
//! - [`ReviewDisambiguator`]: a lemma set plus one fixed token, marking
//!   everything that still needs a human.
//! - [`DisambiguatorGroup`]: an ordered sequence of the above; the first
//!   member with an opinion wins, so callers put precise rules before
//!   catch-alls.
//!
//! A lookup miss (unknown lemma, unknown tag value, record without the
//! lemma field) is never an error; `resolve` simply has no opinion and
//! returns `None`. [`Disambiguator::resolve_many`] renders that as an
//! empty string so batch output stays aligned with its input.
//!
//! ```rust
//! use disambig_apply::{Disambiguator, DisambiguatorGroup, StraightDisambiguator};
//! use disambig_types::{DEFAULT_LEMMA_KEY, Record};
//!
//! let straight = StraightDisambiguator::new(
//!     [("quis".to_owned(), "1".to_owned())],
//!     DEFAULT_LEMMA_KEY,
//! );
//! let group = DisambiguatorGroup::new(vec![Box::new(straight)], DEFAULT_LEMMA_KEY);
//! let record = Record::from_iter([("lemma", "quis"), ("pos", "ADV")]);
//! assert_eq!(group.resolve(&record), Some("1"));
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use disambig_types::Record;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("a category-keyed disambiguator needs a category field name")]
    MissingCategoryKey,
    #[error("failed to read lookup table {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse lookup table {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Resolves the disambiguation index of single records, or declines to.
pub trait Disambiguator {
    /// Lemmas this disambiguator can say anything about.
    fn known_lemmas(&self) -> &HashSet<String>;

    /// The index token for this record, or `None` for "no opinion".
    fn resolve(&self, record: &Record) -> Option<&str>;

    /// Resolve a batch of records in order, one output per input, with the
    /// empty string standing in for "no opinion".
    fn resolve_many<'a, I>(&'a self, records: I) -> impl Iterator<Item = String>
    where
        I: IntoIterator<Item = &'a Record>,
        Self: Sized,
    {
        records
            .into_iter()
            .map(|record| self.resolve(record).map(str::to_owned).unwrap_or_default())
    }
}

/// Direct lemma -> index lookup, ignoring any tag on the record.
#[derive(Debug)]
pub struct StraightDisambiguator {
    lemma_key: String,
    table: BTreeMap<String, String>,
    known: HashSet<String>,
}

impl StraightDisambiguator {
    pub fn new<I>(table: I, lemma_key: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let table: BTreeMap<String, String> = table.into_iter().collect();
        let known = table.keys().cloned().collect();
        Self {
            lemma_key: lemma_key.into(),
            table,
            known,
        }
    }

    /// Load from a JSON object mapping lemma -> index.
    pub fn from_file(
        path: impl AsRef<Path>,
        lemma_key: impl Into<String>,
    ) -> Result<Self, ApplyError> {
        let path = path.as_ref();
        let table: BTreeMap<String, String> = load_json(path)?;
        info!("{}: {} straight lemmas", path.display(), table.len());
        Ok(Self::new(table, lemma_key))
    }
}

impl Disambiguator for StraightDisambiguator {
    fn known_lemmas(&self) -> &HashSet<String> {
        &self.known
    }

    fn resolve(&self, record: &Record) -> Option<&str> {
        let lemma = record.get(&self.lemma_key)?;
        self.table.get(lemma).map(String::as_str)
    }
}

/// Lemma -> (tag value -> index) lookup keyed by a category field.
#[derive(Debug)]
pub struct CategoryDisambiguator {
    lemma_key: String,
    category_key: String,
    table: BTreeMap<String, BTreeMap<String, String>>,
    known: HashSet<String>,
}

impl CategoryDisambiguator {
    /// `category_key` names the record field holding the tag; leaving it
    /// empty is a configuration error, not a lookup miss.
    pub fn new<I>(
        table: I,
        category_key: impl Into<String>,
        lemma_key: impl Into<String>,
    ) -> Result<Self, ApplyError>
    where
        I: IntoIterator<Item = (String, BTreeMap<String, String>)>,
    {
        let category_key = category_key.into();
        if category_key.is_empty() {
            return Err(ApplyError::MissingCategoryKey);
        }
        let table: BTreeMap<String, BTreeMap<String, String>> = table.into_iter().collect();
        let known = table.keys().cloned().collect();
        Ok(Self {
            lemma_key: lemma_key.into(),
            category_key,
            table,
            known,
        })
    }

    /// Load from a JSON object mapping lemma -> (tag value -> index).
    pub fn from_file(
        path: impl AsRef<Path>,
        category_key: impl Into<String>,
        lemma_key: impl Into<String>,
    ) -> Result<Self, ApplyError> {
        let path = path.as_ref();
        let table: BTreeMap<String, BTreeMap<String, String>> = load_json(path)?;
        info!("{}: {} tag-keyed lemmas", path.display(), table.len());
        Self::new(table, category_key, lemma_key)
    }
}

impl Disambiguator for CategoryDisambiguator {
    fn known_lemmas(&self) -> &HashSet<String> {
        &self.known
    }

    fn resolve(&self, record: &Record) -> Option<&str> {
        let lemma = record.get(&self.lemma_key)?;
        let senses = self.table.get(lemma)?;
        let category = record.get(&self.category_key)?;
        senses.get(category).map(String::as_str)
    }
}

/// Marks lemmas known to need manual review with one fixed token.
pub struct ReviewDisambiguator {
    lemma_key: String,
    token: String,
    known: HashSet<String>,
}

impl ReviewDisambiguator {
    pub fn new<I, S>(lemmas: I, token: impl Into<String>, lemma_key: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lemma_key: lemma_key.into(),
            token: token.into(),
            known: lemmas.into_iter().map(Into::into).collect(),
        }
    }

    /// Load from a JSON array of lemma strings.
    pub fn from_file(
        path: impl AsRef<Path>,
        token: impl Into<String>,
        lemma_key: impl Into<String>,
    ) -> Result<Self, ApplyError> {
        let path = path.as_ref();
        let lemmas: Vec<String> = load_json(path)?;
        info!("{}: {} lemmas flagged for review", path.display(), lemmas.len());
        Ok(Self::new(lemmas, token, lemma_key))
    }
}

impl Disambiguator for ReviewDisambiguator {
    fn known_lemmas(&self) -> &HashSet<String> {
        &self.known
    }

    fn resolve(&self, record: &Record) -> Option<&str> {
        let lemma = record.get(&self.lemma_key)?;
        self.known.contains(lemma).then_some(self.token.as_str())
    }
}

/// Ordered composition of disambiguators; the first opinion wins.
///
/// Member order is a contract, not a detail: callers put the straight
/// table before the tag-keyed one and the review catch-all last, and a
/// later member is never consulted once an earlier one answers.
pub struct DisambiguatorGroup {
    lemma_key: String,
    members: Vec<Box<dyn Disambiguator>>,
    known: HashSet<String>,
}

impl DisambiguatorGroup {
    pub fn new(members: Vec<Box<dyn Disambiguator>>, lemma_key: impl Into<String>) -> Self {
        let known = members
            .iter()
            .flat_map(|member| member.known_lemmas().iter().cloned())
            .collect();
        Self {
            lemma_key: lemma_key.into(),
            members,
            known,
        }
    }
}

impl Disambiguator for DisambiguatorGroup {
    fn known_lemmas(&self) -> &HashSet<String> {
        &self.known
    }

    fn resolve(&self, record: &Record) -> Option<&str> {
        let lemma = record.get(&self.lemma_key)?;
        if !self.known.contains(lemma) {
            return None;
        }
        self.members.iter().find_map(|member| member.resolve(record))
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ApplyError> {
    let file = File::open(path).map_err(|source| ApplyError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ApplyError::Json {
        path: path.display().to_string(),
        source,
    })
}
