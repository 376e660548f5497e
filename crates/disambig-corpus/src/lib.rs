//! Scan lemmatized, tagged corpora into co-occurrence counts.
//!
//! Input files are tab-separated with a header row naming the columns; the
//! three columns that matter are selected by [`CorpusKeys`]. A row only
//! contributes to the counts when its disambiguation-index cell passes the
//! validity predicate (by default [`index_is_set`], which rejects empty
//! cells and the `_` placeholder), since annotators leave the index unset
//! on the vast majority of tokens.
//!
//! Missing *fields* are a different matter from unset *values*: a header
//! that lacks a configured column, or a row that drops a required cell, is
//! a malformed corpus and fails the scan immediately rather than being
//! skipped.
//!
//! ```no_run
//! use disambig_corpus::read_corpus;
//! use disambig_types::{CorpusKeys, index_is_set};
//!
//! # fn main() -> Result<(), disambig_corpus::CorpusError> {
//! let keys = CorpusKeys::new("pos");
//! let table = read_corpus(&["corpus/a.tsv", "corpus/b.tsv"], &keys, index_is_set)?;
//! println!("{} lemmas carry at least one index", table.lemma_count());
//! # Ok(()) }
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use disambig_types::{CoOccurrenceTable, CorpusKeys, Record};

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("record is missing required field `{0}`")]
    MissingField(String),
    #[error("{path}: header has no `{key}` column")]
    MissingColumn { path: String, key: String },
    #[error("{path}:{line}: row has no value for `{key}`")]
    ShortRow {
        path: String,
        line: usize,
        key: String,
    },
    #[error("failed to read corpus file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Aggregate already-parsed records into a [`CoOccurrenceTable`].
///
/// Records whose index value fails `is_valid_index` are skipped. The index
/// field must be present on every record; the lemma and category fields are
/// only required once a record passes the predicate, mirroring the scan
/// order of the corpus reader.
pub fn aggregate<I, F>(
    records: I,
    keys: &CorpusKeys,
    is_valid_index: F,
) -> Result<CoOccurrenceTable, CorpusError>
where
    I: IntoIterator<Item = Record>,
    F: Fn(&str) -> bool,
{
    let mut table = CoOccurrenceTable::new();
    for record in records {
        let index = require(&record, &keys.index)?;
        if !is_valid_index(index) {
            continue;
        }
        let lemma = require(&record, &keys.lemma)?;
        let category = require(&record, &keys.category)?;
        table.record(lemma, index, category);
    }
    Ok(table)
}

fn require<'a>(record: &'a Record, key: &str) -> Result<&'a str, CorpusError> {
    record
        .get(key)
        .ok_or_else(|| CorpusError::MissingField(key.to_owned()))
}

/// Scan one or more TSV corpus files into a single [`CoOccurrenceTable`].
pub fn read_corpus<P, F>(
    files: &[P],
    keys: &CorpusKeys,
    is_valid_index: F,
) -> Result<CoOccurrenceTable, CorpusError>
where
    P: AsRef<Path>,
    F: Fn(&str) -> bool,
{
    let mut table = CoOccurrenceTable::new();
    for path in files {
        scan_file(path.as_ref(), keys, &is_valid_index, &mut table)?;
    }
    Ok(table)
}

fn scan_file<F>(
    path: &Path,
    keys: &CorpusKeys,
    is_valid_index: &F,
    table: &mut CoOccurrenceTable,
) -> Result<(), CorpusError>
where
    F: Fn(&str) -> bool,
{
    let io_err = |source| CorpusError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let mut lines = BufReader::new(file).lines();

    let header_line = match lines.next() {
        Some(line) => line.map_err(io_err)?,
        None => {
            warn!("{}: empty corpus file", path.display());
            return Ok(());
        }
    };
    let header: Vec<&str> = split_row(&header_line).collect();
    let lemma_col = column(&header, &keys.lemma, path)?;
    let category_col = column(&header, &keys.category, path)?;
    let index_col = column(&header, &keys.index, path)?;

    let mut rows = 0u64;
    let mut kept = 0u64;
    for (lineno, line) in lines.enumerate() {
        let line = line.map_err(io_err)?;
        if line.is_empty() {
            continue;
        }
        rows += 1;
        let cells: Vec<&str> = split_row(&line).collect();

        // An absent index cell reads as unset, same as an explicit `_`.
        let index = cells.get(index_col).copied().unwrap_or("");
        if !is_valid_index(index) {
            continue;
        }
        let short_row = |key: &String| CorpusError::ShortRow {
            path: path.display().to_string(),
            line: lineno + 2,
            key: key.clone(),
        };
        let lemma = cells
            .get(lemma_col)
            .copied()
            .ok_or_else(|| short_row(&keys.lemma))?;
        let category = cells
            .get(category_col)
            .copied()
            .ok_or_else(|| short_row(&keys.category))?;
        table.record(lemma, index, category);
        kept += 1;
    }

    info!(
        "{}: {} rows scanned, {} with a disambiguation index",
        path.display(),
        rows,
        kept
    );
    Ok(())
}

fn column(header: &[&str], key: &str, path: &Path) -> Result<usize, CorpusError> {
    header
        .iter()
        .position(|name| *name == key)
        .ok_or_else(|| CorpusError::MissingColumn {
            path: path.display().to_string(),
            key: key.to_owned(),
        })
}

fn split_row(line: &str) -> impl Iterator<Item = &str> {
    line.trim_end_matches('\r').split('\t')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    use disambig_types::index_is_set;

    fn keys() -> CorpusKeys {
        CorpusKeys::new("pos")
    }

    fn record(lemma: &str, pos: &str, dis: &str) -> Record {
        Record::from_iter([("lemma", lemma), ("pos", pos), ("Dis", dis)])
    }

    #[test]
    fn aggregates_records_with_an_index() {
        let records = vec![
            record("qui", "PROrel", "1"),
            record("qui", "PROrel", "1"),
            record("qui", "PROint", "2"),
            record("est", "VER", "_"),
            record("et", "CON", ""),
        ];
        let table = aggregate(records, &keys(), index_is_set).unwrap();
        assert_eq!(table.lemma_count(), 1);
        let senses = table.get("qui").unwrap();
        assert_eq!(senses["1"]["PROrel"], 2);
        assert_eq!(senses["2"]["PROint"], 1);
    }

    #[test]
    fn missing_index_field_fails_fast() {
        let records = vec![Record::from_iter([("lemma", "qui"), ("pos", "PROrel")])];
        let err = aggregate(records, &keys(), index_is_set).unwrap_err();
        assert!(matches!(err, CorpusError::MissingField(key) if key == "Dis"));
    }

    #[test]
    fn skipped_records_do_not_need_lemma_or_category() {
        // The index cell is checked first; a record the predicate rejects
        // never has its other fields read.
        let records = vec![Record::from_iter([("Dis", "_")])];
        let table = aggregate(records, &keys(), index_is_set).unwrap();
        assert!(table.is_empty());
    }

    fn write_corpus(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_tsv_with_header() {
        let file = write_corpus(
            "token\tlemma\tpos\tDis\n\
             qui\tqui\tPROrel\t1\n\
             qui\tqui\tPROint\t2\n\
             est\tsum\tVER\t_\n\
             \n\
             qui\tqui\tPROrel\t1\n",
        );
        let table = read_corpus(&[file.path()], &keys(), index_is_set).unwrap();
        let senses = table.get("qui").unwrap();
        assert_eq!(senses["1"]["PROrel"], 2);
        assert_eq!(senses["2"]["PROint"], 1);
        assert!(table.get("sum").is_none());
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let file = write_corpus("lemma\tpos\tDis\r\nqui\tPROrel\t1\r\n");
        let table = read_corpus(&[file.path()], &keys(), index_is_set).unwrap();
        assert_eq!(table.get("qui").unwrap()["1"]["PROrel"], 1);
    }

    #[test]
    fn merges_counts_across_files() {
        let first = write_corpus("lemma\tpos\tDis\nqui\tPROrel\t1\n");
        let second = write_corpus("lemma\tpos\tDis\nqui\tPROrel\t1\n");
        let table = read_corpus(&[first.path(), second.path()], &keys(), index_is_set).unwrap();
        assert_eq!(table.get("qui").unwrap()["1"]["PROrel"], 2);
    }

    #[test]
    fn header_without_required_column_is_an_error() {
        let file = write_corpus("lemma\tDis\nqui\t1\n");
        let err = read_corpus(&[file.path()], &keys(), index_is_set).unwrap_err();
        assert!(matches!(err, CorpusError::MissingColumn { key, .. } if key == "pos"));
    }

    #[test]
    fn short_row_with_set_index_is_an_error() {
        // Columns: Dis first so the index is present while pos is not.
        let file = write_corpus("Dis\tlemma\tpos\n1\tqui\n");
        let err = read_corpus(&[file.path()], &keys(), index_is_set).unwrap_err();
        assert!(matches!(err, CorpusError::ShortRow { key, line, .. } if key == "pos" && line == 2));
    }

    #[test]
    fn short_row_without_index_is_skipped() {
        let file = write_corpus("lemma\tpos\tDis\nqui\tPROrel\n");
        let table = read_corpus(&[file.path()], &keys(), index_is_set).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn empty_file_yields_empty_table() {
        let file = write_corpus("");
        let table = read_corpus(&[file.path()], &keys(), index_is_set).unwrap();
        assert!(table.is_empty());
    }
}
