use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tempfile::tempdir;

use disambig_cli::{RunConfig, run};

const CORPUS: &str = "token\tlemma\tpos\tDis\n\
    qui\tqui\tPROrel\t1\n\
    qui\tqui\tPROrel\t1\n\
    qui\tqui\tPROint\t2\n\
    qui\tqui\tPROint\t2\n\
    quis\tquis\tPROint\t1\n\
    suus\tsuus\tADJ\t1\n\
    suus\tsuus\tADJ\t1\n\
    suus\tsuus\tADJ\t2\n\
    suus\tsuus\tADJ\t2\n\
    est\tsum\tVER\t_\n";

fn config(dir: &Path, corpus: &Path) -> RunConfig {
    RunConfig {
        category_key: "pos".to_owned(),
        files: vec![corpus.to_path_buf()],
        lemma_key: "lemma".to_owned(),
        index_key: "Dis".to_owned(),
        prefix: format!("{}/", dir.display()),
        noise_threshold: 1,
    }
}

#[test]
fn writes_the_three_artifacts() {
    let dir = tempdir().expect("temp dir");
    let corpus = dir.path().join("corpus.tsv");
    fs::write(&corpus, CORPUS).unwrap();

    run(&config(dir.path(), &corpus)).unwrap();

    let pos: BTreeMap<String, BTreeMap<String, String>> =
        serde_json::from_str(&fs::read_to_string(dir.path().join("pos.json")).unwrap()).unwrap();
    assert_eq!(pos["qui"]["PROrel"], "1");
    assert_eq!(pos["qui"]["PROint"], "2");

    let straight: BTreeMap<String, String> =
        serde_json::from_str(&fs::read_to_string(dir.path().join("straight.json")).unwrap())
            .unwrap();
    assert_eq!(straight["quis"], "1");
    // The skipped `_` row contributes nothing.
    assert!(straight.get("sum").is_none());

    let needs: Vec<String> =
        serde_json::from_str(&fs::read_to_string(dir.path().join("needs.json")).unwrap()).unwrap();
    assert_eq!(needs, vec!["qui", "quis", "suus"]);
}

#[test]
fn artifacts_are_stable_across_row_order() {
    let dir = tempdir().expect("temp dir");

    let forward = dir.path().join("forward.tsv");
    fs::write(&forward, CORPUS).unwrap();

    let mut lines: Vec<&str> = CORPUS.trim_end().lines().collect();
    let header = lines.remove(0);
    lines.reverse();
    let shuffled_corpus = format!("{header}\n{}\n", lines.join("\n"));
    let shuffled = dir.path().join("shuffled.tsv");
    fs::write(&shuffled, shuffled_corpus).unwrap();

    let first = dir.path().join("first");
    let second = dir.path().join("second");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();

    run(&config(&first, &forward)).unwrap();
    run(&config(&second, &shuffled)).unwrap();

    for name in ["pos.json", "straight.json", "needs.json"] {
        let a = fs::read(first.join(name)).unwrap();
        let b = fs::read(second.join(name)).unwrap();
        assert_eq!(a, b, "{name} differs between row orders");
    }
}

#[test]
fn missing_column_aborts_the_run() {
    let dir = tempdir().expect("temp dir");
    let corpus = dir.path().join("corpus.tsv");
    fs::write(&corpus, "token\tlemma\tDis\nqui\tqui\t1\n").unwrap();
    assert!(run(&config(dir.path(), &corpus)).is_err());
}
