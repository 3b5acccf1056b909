use std::path::PathBuf;

use scriptcheck::error::Error;
use scriptcheck::runtime::collect_files;

fn patterns(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn glob_matches_files() {
    let files = collect_files(&patterns(&["tests/fixtures/b*.yml"])).unwrap();
    assert_eq!(files, vec![PathBuf::from("tests/fixtures/basic.yml")]);
}

#[test]
fn directories_are_walked_for_pipeline_files() {
    let files = collect_files(&patterns(&["tests/fixtures/pipelines"])).unwrap();
    assert_eq!(
        files,
        vec![
            PathBuf::from("tests/fixtures/pipelines/a.yml"),
            PathBuf::from("tests/fixtures/pipelines/nested/b.yaml"),
        ]
    );
}

#[test]
fn duplicates_are_removed_keeping_first_position() {
    let files = collect_files(&patterns(&[
        "tests/fixtures/clean.yml",
        "tests/fixtures/basic.yml",
        "tests/fixtures/clean.yml",
    ]))
    .unwrap();
    assert_eq!(
        files,
        vec![
            PathBuf::from("tests/fixtures/clean.yml"),
            PathBuf::from("tests/fixtures/basic.yml"),
        ]
    );
}

#[test]
fn unmatched_pattern_yields_nothing() {
    let files = collect_files(&patterns(&["tests/fixtures/*.json"])).unwrap();
    assert!(files.is_empty());
}

#[test]
fn malformed_pattern_is_an_error() {
    let err = collect_files(&patterns(&["tests/fixtures/[.yml"])).unwrap_err();
    assert!(matches!(err, Error::Pattern(_)));
}
