use std::path::PathBuf;

use disambig_corpus::read_corpus;
use disambig_types::{CorpusKeys, index_is_set};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("chronicle.tsv")
}

#[test]
fn scans_fixture_corpus() {
    let keys = CorpusKeys::new("pos");
    let table = read_corpus(&[fixture()], &keys, index_is_set).unwrap();

    // Tokens whose Dis cell is `_` never reach the table.
    assert!(table.get("sum").is_none());
    assert!(table.get("do").is_none());

    let qui = table.get("qui").unwrap();
    assert_eq!(qui["1"]["PROrel"], 2);
    assert_eq!(qui["2"]["PROint"], 1);

    let cum = table.get("cum").unwrap();
    assert_eq!(cum["1"]["CONsub"], 2);
    assert_eq!(cum["2"]["PRE"], 2);

    assert_eq!(table.lemma_count(), 4);
}

#[test]
fn custom_predicate_controls_what_counts() {
    let keys = CorpusKeys::new("pos");
    // Only index "1" is admitted.
    let table = read_corpus(&[fixture()], &keys, |raw| raw == "1").unwrap();
    let qui = table.get("qui").unwrap();
    assert_eq!(qui.len(), 1);
    assert_eq!(qui["1"]["PROrel"], 2);
}
