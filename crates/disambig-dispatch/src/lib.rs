//! Partition lemmas by whether their secondary tag predicts their sense.
//!
//! [`classify`] consumes a [`CoOccurrenceTable`] and sorts every lemma into
//! one of four outcomes:
//!
//! - **single answer**: one index observed corpus-wide; the lemma is not
//!   actually ambiguous and maps straight to that index.
//! - **auto**: several indices, but after noise filtering every tag value
//!   belongs to exactly one index; a tag -> index table resolves the lemma
//!   with no semantic judgment.
//! - **partial**: some tag values are exclusive to one index and the rest
//!   are shared; the exclusive ones still get table entries and the full
//!   breakdown is kept for manual review.
//! - **uncategorizable**: tags carry no signal; the lemma needs real
//!   word-sense disambiguation.
//!
//! Noise filtering treats a tag seen at most `noise_threshold` times under
//! an index as a probable tagging error, with one deliberate exception: an
//! index that only ever co-occurred with a single tag keeps that tag even
//! at a low count, since there is no competing evidence against it.
//!
//! The classifier is a pure function. The input maps iterate in arbitrary
//! order, so every comparison here runs over sorted sequences and the
//! output is identical no matter how the table was assembled.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use disambig_types::{CoOccurrenceTable, SenseCounts};

type TagCounter = HashMap<String, u64>;

/// Counts at or below this are treated as tagging noise by default.
pub const DEFAULT_NOISE_THRESHOLD: u64 = 1;

/// Totals for lemmas sharing the same number of distinct indices.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CardinalityStats {
    pub total: u64,
    pub auto: u64,
    pub lemmas: Vec<String>,
}

/// Raw per-index breakdown kept when a lemma is only partially
/// categorizable, for manual review.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartialLemma {
    pub lemma: String,
    pub breakdown: BTreeMap<String, BTreeMap<String, u64>>,
}

/// The four-way partition produced by [`classify`], plus per-cardinality
/// statistics for reporting.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DispatchResult {
    /// Keyed by number of distinct indices a lemma was observed under.
    pub per_cardinality: BTreeMap<usize, CardinalityStats>,
    pub partial: Vec<PartialLemma>,
    pub uncategorizable: Vec<String>,
    /// Lemma -> index for lemmas with a single observed index.
    pub single_answer: BTreeMap<String, String>,
    /// Lemma -> (tag -> index). Holds the full tables of auto lemmas and the
    /// partial tables of partially categorizable ones.
    pub category_table: BTreeMap<String, BTreeMap<String, String>>,
}

impl DispatchResult {
    /// Every lemma that needs some entry in a downstream review tool:
    /// the uncategorizable ones plus everything either lookup table covers.
    pub fn review_pool(&self) -> Vec<String> {
        let mut pool: Vec<String> = self
            .uncategorizable
            .iter()
            .chain(self.single_answer.keys())
            .chain(self.category_table.keys())
            .cloned()
            .collect();
        pool.sort_unstable();
        pool.dedup();
        pool
    }
}

/// Classify every lemma of `table`. Pure; see the module docs for the
/// outcome taxonomy and the role of `noise_threshold`.
pub fn classify(table: &CoOccurrenceTable, noise_threshold: u64) -> DispatchResult {
    let mut result = DispatchResult::default();

    let mut entries: Vec<(&str, &SenseCounts)> = table.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    for (lemma, senses) in entries {
        classify_lemma(lemma, senses, noise_threshold, &mut result);
    }
    result
}

fn classify_lemma(
    lemma: &str,
    senses: &SenseCounts,
    threshold: u64,
    result: &mut DispatchResult,
) {
    let mut indices: Vec<(&str, &TagCounter)> = senses
        .iter()
        .map(|(index, counter)| (index.as_str(), counter))
        .collect();
    indices.sort_unstable_by(|a, b| a.0.cmp(b.0));

    // One kept-tag list per index that still says anything after noise
    // filtering. An index whose tags all sit at or below the threshold is
    // dropped here but still present in `indices` for the re-scans below.
    let mut cats: Vec<Vec<&str>> = Vec::new();
    for (_, counter) in &indices {
        if counter.len() > 1 {
            let mut kept: Vec<&str> = counter
                .iter()
                .filter(|(_, count)| **count > threshold)
                .map(|(tag, _)| tag.as_str())
                .collect();
            if kept.is_empty() {
                continue;
            }
            kept.sort_unstable();
            cats.push(kept);
        } else {
            cats.push(counter.keys().map(String::as_str).collect());
        }
    }

    let bucket = result.per_cardinality.entry(senses.len()).or_default();
    bucket.total += 1;
    bucket.lemmas.push(lemma.to_owned());
    if senses.len() == 1 {
        // A single observed index resolves itself, anomalous tags or not.
        bucket.auto += 1;
    }

    if cats.len() > 1 {
        let mut flat: Vec<&str> = cats.iter().flatten().copied().collect();
        flat.sort_unstable();
        let mut set = flat.clone();
        set.dedup();

        if flat == set {
            // No tag value repeats across indices: the senses are split by
            // tag, not by meaning.
            let mapping = confident_mapping(&indices, threshold);
            if mapping.is_empty() {
                match low_count_fallback(&indices, threshold) {
                    Some(fallback) => {
                        bump_auto(result, senses.len());
                        result.category_table.insert(lemma.to_owned(), fallback);
                    }
                    None => {
                        warn!(
                            "lemma `{lemma}`: tag evidence too thin to trust, \
                             needs manual disambiguation"
                        );
                        result.uncategorizable.push(lemma.to_owned());
                    }
                }
            } else {
                bump_auto(result, senses.len());
                result.category_table.insert(lemma.to_owned(), mapping);
            }
        } else if set.len() != 1 {
            // Mixed signal: some tags are exclusive to one index, some are
            // shared. Keep the exclusive ones and flag the rest for review.
            let mapping = exclusive_mapping(&indices, threshold, &flat);
            if mapping.is_empty() {
                warn!("lemma `{lemma}`: no tag is unambiguous, partial table is empty");
            }
            result.partial.push(PartialLemma {
                lemma: lemma.to_owned(),
                breakdown: sorted_breakdown(senses),
            });
            result.category_table.insert(lemma.to_owned(), mapping);
        } else {
            // Every contributing index collapsed onto the same lone tag.
            result.uncategorizable.push(lemma.to_owned());
        }
    } else if senses.len() == 1 {
        let (index, counter) = indices[0];
        if counter.len() > 1 {
            warn!(
                "lemma `{lemma}`: single sense `{index}` observed under {} tag values",
                counter.len()
            );
            result.uncategorizable.push(lemma.to_owned());
        } else {
            result
                .single_answer
                .insert(lemma.to_owned(), index.to_owned());
        }
    } else {
        // Several indices, but at most one survived noise filtering.
        result.uncategorizable.push(lemma.to_owned());
    }
}

fn bump_auto(result: &mut DispatchResult, cardinality: usize) {
    if let Some(bucket) = result.per_cardinality.get_mut(&cardinality) {
        bucket.auto += 1;
    }
}

/// Tag -> index over pairs whose raw count clears the threshold. In the
/// auto branch each surviving tag belongs to exactly one index, so the
/// insertion order cannot matter.
fn confident_mapping(indices: &[(&str, &TagCounter)], threshold: u64) -> BTreeMap<String, String> {
    let mut mapping = BTreeMap::new();
    for (index, counter) in indices {
        for (tag, count) in *counter {
            if *count > threshold {
                mapping.insert(tag.clone(), (*index).to_owned());
            }
        }
    }
    mapping
}

/// When nothing cleared the threshold: admit the low-count tags anyway,
/// but only if every index carries exactly one tag, since a lone
/// observation with no competing evidence is still usable. An index with
/// several all-noise tags (even one skipped during filtering) vetoes this.
fn low_count_fallback(
    indices: &[(&str, &TagCounter)],
    threshold: u64,
) -> Option<BTreeMap<String, String>> {
    let mut possible = BTreeMap::new();
    for (index, counter) in indices {
        if counter.len() > 1 {
            return None;
        }
        for (tag, count) in *counter {
            if *count > threshold {
                return None;
            }
            possible.insert(tag.clone(), (*index).to_owned());
        }
    }
    Some(possible)
}

/// Tag -> index restricted to pairs that clear the threshold and whose tag
/// occurs exactly once in the flattened kept-tag multiset.
fn exclusive_mapping(
    indices: &[(&str, &TagCounter)],
    threshold: u64,
    flat: &[&str],
) -> BTreeMap<String, String> {
    let mut mapping = BTreeMap::new();
    for (index, counter) in indices {
        for (tag, count) in *counter {
            if *count > threshold && flat.iter().filter(|&t| *t == tag.as_str()).count() == 1 {
                mapping.insert(tag.clone(), (*index).to_owned());
            }
        }
    }
    mapping
}

fn sorted_breakdown(senses: &SenseCounts) -> BTreeMap<String, BTreeMap<String, u64>> {
    senses
        .iter()
        .map(|(index, counter)| {
            (
                index.clone(),
                counter
                    .iter()
                    .map(|(tag, count)| (tag.clone(), *count))
                    .collect(),
            )
        })
        .collect()
}
