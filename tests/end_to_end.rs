use std::fs;
use std::path::{Path, PathBuf};

use ingredient_tagger_clean::{
    CleanConfig, CleanError, IdScheme, clean_file, clean_files_batch, load_config_from_file,
};
use tempfile::TempDir;

const TWO_PHRASES: &str = "\
1\tI1\tL9\tNoCAP\tNoPAREN\tB-QTY
(\tI2\tL9\tNoCAP\tYesPAREN\tB-COMMENT
14\tI3\tL9\tNoCAP\tYesPAREN\tI-COMMENT
oz.\tI4\tL9\tNoCAP\tYesPAREN\tI-COMMENT
)\tI5\tL9\tNoCAP\tYesPAREN\tI-COMMENT
can\tI6\tL9\tNoCAP\tNoPAREN\tB-UNIT
tomatoes\tI7\tL9\tNoCAP\tNoPAREN\tB-NAME
2\tI1\tL4\tNoCAP\tNoPAREN\tB-QTY
(\tI2\tL4\tNoCAP\tYesPAREN\tB-COMMENT
large\tI3\tL4\tNoCAP\tYesPAREN\tI-COMMENT
eggs\tI4\tL4\tNoCAP\tNoPAREN\tB-NAME
";

fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn only_balanced_phrase_survives() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "train.tsv", TWO_PHRASES);
    let output = dir.path().join("clean.csv");

    let report = clean_file(&input, &output, None, &CleanConfig::default()).unwrap();
    assert_eq!(report.rows_in(), 11);
    assert_eq!(report.phrases_out(), 1);

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "phrase_id,text,label\n\
         000001,1,QTY\n\
         000001,(,COMMENT\n\
         000001,14,COMMENT\n\
         000001,ounce,UNIT\n\
         000001,),COMMENT\n\
         000001,can,UNIT\n\
         000001,tomatoes,NAME\n"
    );
    assert!(!dir.path().join("clean.csv.tmp").exists());
}

#[test]
fn malformed_stream_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        dir.path(),
        "broken.tsv",
        "cup\tI2\tL3\tNoCAP\tNoPAREN\tB-UNIT\nsugar\tI1\tL3\tNoCAP\tNoPAREN\tB-NAME\n",
    );
    let output = dir.path().join("clean.csv");
    let grouped = dir.path().join("grouped.csv");

    let err = clean_file(&input, &output, Some(&grouped), &CleanConfig::default()).unwrap_err();
    assert!(matches!(err, CleanError::MalformedStream { line: 1, .. }));
    assert!(!output.exists());
    assert!(!grouped.exists());
}

#[test]
fn grouped_table_keeps_every_input_column() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "train.tsv", TWO_PHRASES);
    let output = dir.path().join("clean.csv");
    let grouped = dir.path().join("grouped.csv");

    clean_file(&input, &output, Some(&grouped), &CleanConfig::default()).unwrap();

    let text = fs::read_to_string(&grouped).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "text,position_marker,token_length,capitalization,bracket_flag,label,phrase_id"
    );
    assert_eq!(lines.len(), 12);
    assert_eq!(lines[1], "1,I1,L9,NoCAP,NoPAREN,B-QTY,000001");
    assert_eq!(lines[11], "eggs,I4,L4,NoCAP,NoPAREN,B-NAME,000002");
}

#[test]
fn config_file_selects_hash_ids() {
    let dir = TempDir::new().unwrap();
    let config_path = write_input(
        dir.path(),
        "clean.toml",
        "[grouping]\nid_scheme = \"hash\"\n\n[io]\noutput_delimiter = \"\\t\"\n",
    );
    let config = load_config_from_file(&config_path).unwrap();
    assert_eq!(config.grouping.id_scheme, IdScheme::Hash);

    let input = write_input(dir.path(), "train.tsv", TWO_PHRASES);
    let output = dir.path().join("clean.tsv");
    clean_file(&input, &output, None, &config).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("phrase_id\ttext\tlabel"));
    for line in lines {
        let id = line.split('\t').next().unwrap();
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn batch_isolates_failing_files() {
    let dir = TempDir::new().unwrap();
    let good = write_input(dir.path(), "good.tsv", TWO_PHRASES);
    let also_good = write_input(
        dir.path(),
        "more.tsv",
        "salt\tI1\tL1\tNoCAP\tNoPAREN\tB-NAME\n",
    );
    let bad = write_input(
        dir.path(),
        "bad.tsv",
        "salt\tI1\tL1\tNoCAP\tNoPAREN\tB-SPICE\n",
    );
    let out_dir = dir.path().join("out");

    let outcomes = clean_files_batch(
        &[good, bad, also_good],
        &out_dir,
        &CleanConfig::default(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(CleanError::UnknownLabel { line: 1, .. })
    ));
    assert!(outcomes[2].is_ok());

    assert!(out_dir.join("good.cleaned.csv").exists());
    assert!(!out_dir.join("bad.cleaned.csv").exists());
    let more = fs::read_to_string(out_dir.join("more.cleaned.csv")).unwrap();
    assert_eq!(more, "phrase_id,text,label\n000001,salt,NAME\n");
}

#[test]
fn batch_rejects_inputs_sharing_a_stem() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();
    let salt = write_input(
        dir.path(),
        "a/train.tsv",
        "salt\tI1\tL1\tNoCAP\tNoPAREN\tB-NAME\n",
    );
    let pepper = write_input(
        dir.path(),
        "b/train.tsv",
        "pepper\tI1\tL1\tNoCAP\tNoPAREN\tB-NAME\n",
    );
    let out_dir = dir.path().join("out");

    let err = clean_files_batch(&[salt, pepper], &out_dir, &CleanConfig::default()).unwrap_err();
    match err {
        CleanError::Config(msg) => assert!(msg.contains("train.cleaned.csv")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!out_dir.join("train.cleaned.csv").exists());
}

#[test]
fn failed_clean_write_leaves_no_grouped_table() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "train.tsv", TWO_PHRASES);
    let output = dir.path().join("clean.csv");
    fs::create_dir_all(output.join("occupied")).unwrap();
    let grouped = dir.path().join("grouped.csv");

    let result = clean_file(&input, &output, Some(&grouped), &CleanConfig::default());
    assert!(matches!(result, Err(CleanError::Io { .. })));
    assert!(!grouped.exists());
    assert!(!dir.path().join("grouped.csv.tmp").exists());
    assert!(!dir.path().join("clean.csv.tmp").exists());
    assert!(output.join("occupied").is_dir());
}
