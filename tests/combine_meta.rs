//! Combining datasets from a pre-seeded cache.
//!
//! Every archive here already sits in the cache, so no request is made and
//! URLs may point anywhere.

use nli_datasets::{
    Combiner, Config, DatasetSpec, Error, MetaLoader, Pipeline, Registry, Split,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Lay out `<archive>` plus its extracted files under `root`.
fn seed(root: &Path, archive: &str, files: &[(&str, String)]) {
    fs::create_dir_all(root).unwrap();
    fs::write(root.join(archive), b"").unwrap();
    let stem = archive.trim_end_matches(".zip");
    for (path, content) in files {
        let path = root.join(stem).join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

fn jsonl(rows: &[(&str, &str, &str)], premise: &str) -> String {
    rows.iter()
        .map(|(p, h, l)| {
            let mut row = serde_json::Map::new();
            row.insert(premise.to_string(), (*p).into());
            row.insert("hypothesis".to_string(), (*h).into());
            row.insert("label".to_string(), (*l).into());
            serde_json::Value::Object(row).to_string() + "\n"
        })
        .collect()
}

fn pipeline(root: &Path) -> Pipeline {
    Pipeline::new(
        &Config::default()
            .with_cache_dir(root)
            .with_workers(3)
            .with_progress(false),
    )
    .unwrap()
}

#[test]
fn test_combine_all_takes_union_of_splits() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    seed(
        root,
        "one.zip",
        &[
            ("one/train.jsonl", jsonl(&[("a", "b", "e"), ("c", "d", "n")], "premise")),
            ("one/dev.jsonl", jsonl(&[("e", "f", "c")], "premise")),
        ],
    );
    seed(
        root,
        "two.zip",
        &[
            ("two/train.jsonl", jsonl(&[("g", "h", "c")], "premise")),
            ("two/test.jsonl", jsonl(&[("i", "j", "e"), ("k", "l", "x")], "premise")),
        ],
    );

    let one = DatasetSpec::ternary("http://127.0.0.1:9/one.zip")
        .train("one/train.jsonl")
        .validation("one/dev.jsonl")
        .entailment("e")
        .neutral("n")
        .contradiction("c")
        .build()
        .unwrap();
    let two = DatasetSpec::ternary("http://127.0.0.1:9/two.zip")
        .train("two/train.jsonl")
        .test("two/test.jsonl")
        .entailment("e")
        .neutral("n")
        .contradiction("c")
        .build()
        .unwrap();

    let pipeline = pipeline(root);
    let combiner = Combiner::new(vec![pipeline.loader("one", one), pipeline.loader("two", two)])
        .unwrap();
    let dict = combiner.combine_all().unwrap();

    assert_eq!(dict.splits(), vec![Split::Train, Split::Validation, Split::Test]);

    let train = &dict[Split::Train];
    let premises: Vec<&str> = train.iter().map(|r| r.premise.as_str()).collect();
    assert_eq!(premises, vec!["a", "c", "g"]);
    let labels: Vec<usize> = train.iter().map(|r| r.label).collect();
    assert_eq!(labels, vec![0, 1, 2]);

    assert_eq!(dict[Split::Validation].len(), 1);
    // "x" is outside the vocabulary
    assert_eq!(dict[Split::Test].len(), 1);
    assert_eq!(dict[Split::Test][0].premise, "i");

    let single = combiner.combine(Split::Train).unwrap();
    assert_eq!(single.len(), 3);
    assert!(matches!(
        combiner.combine(Split::Validation),
        Err(Error::UnknownSplit { .. })
    ));
}

fn seed_anli_and_rte(root: &Path) {
    let anli: Vec<(String, String)> = (1..=3)
        .map(|n| {
            let premise = format!("r{n}");
            (
                format!("anli_v0.1/R{n}/train.jsonl"),
                jsonl(&[(premise.as_str(), "h", "e"), ("x", "y", "c")], "context"),
            )
        })
        .collect();
    let anli: Vec<(&str, String)> = anli.iter().map(|(p, c)| (p.as_str(), c.clone())).collect();
    seed(root, "anli_v0.1.zip", &anli);
    seed(
        root,
        "RTE.zip",
        &[(
            "RTE/dev.tsv",
            "index\tsentence1\tsentence2\tlabel\n\
             0\trte premise\trte hypothesis\tnot_entailment\n\
             1\tanother\tone\tentailment\n"
                .to_string(),
        )],
    );
}

#[test]
fn test_meta_loader_anli_group_with_rte() {
    let tmp = TempDir::new().unwrap();
    seed_anli_and_rte(tmp.path());

    let registry = Registry::builtin().unwrap();
    let meta = MetaLoader::new(&registry, &pipeline(tmp.path()), &["anli", "glue/rte"]).unwrap();
    assert_eq!(meta.names().len(), 4);

    assert!(matches!(
        meta.load([Split::Train, Split::Validation]),
        Err(Error::SplitCountMismatch {
            expected: 4,
            actual: 2
        })
    ));

    let records = meta
        .load([Split::Train, Split::Train, Split::Train, Split::Validation])
        .unwrap();
    assert_eq!(records.len(), 8);
    assert_eq!(records[0].premise, "r1");
    assert_eq!(records[2].premise, "r2");
    assert_eq!(records[4].premise, "r3");
    assert_eq!(records[6].premise, "rte premise");

    // ternary names first, the binary-only label appended
    assert_eq!(
        records.label_names(),
        &["entailment", "neutral", "contradiction", "not_entailment"]
    );
    assert_eq!(records.decode_label(records[6].label), Some("not_entailment"));
    assert_eq!(records.decode_label(records[7].label), Some("entailment"));
    assert_eq!(records.decode_label(records[1].label), Some("contradiction"));
}

#[test]
fn test_meta_loader_single_split_for_every_dataset() {
    let tmp = TempDir::new().unwrap();
    seed_anli_and_rte(tmp.path());

    let registry = Registry::builtin().unwrap();
    let meta = MetaLoader::new(&registry, &pipeline(tmp.path()), &["anli"]).unwrap();
    let train = meta.load(Split::Train).unwrap();
    assert_eq!(train.len(), 6);
    assert_eq!(train.label_counts()["entailment"], 3);
    assert_eq!(train.label_counts()["contradiction"], 3);
}

#[test]
fn test_write_jsonl_output() {
    let tmp = TempDir::new().unwrap();
    seed_anli_and_rte(tmp.path());

    let registry = Registry::builtin().unwrap();
    let meta = MetaLoader::new(&registry, &pipeline(tmp.path()), &["anli/r2"]).unwrap();
    let train = meta.load(Split::Train).unwrap();

    let mut out = Vec::new();
    train.write_jsonl(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["premise"], "r2");
    assert_eq!(lines[0]["label"], 0);
    assert_eq!(lines[1]["label"], 2);
}
