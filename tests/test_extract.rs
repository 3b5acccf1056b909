use std::path::{Path, PathBuf};

use scriptcheck::error::Error;
use scriptcheck::reader::{ExtractError, PipelineType, ScriptBlock, ScriptDecoder};
use scriptcheck::yaml;

/// Helper: decode a GitLab pipeline snippet with the given default shell.
fn decode_with_shell(content: &str, shell: &str) -> Vec<ScriptBlock> {
    let file = yaml::parse_file("ci.yml", content).unwrap();
    ScriptDecoder::new(PipelineType::Gitlab, shell)
        .decode(&file)
        .unwrap()
}

fn decode(content: &str) -> Vec<ScriptBlock> {
    decode_with_shell(content, "")
}

fn decode_err(content: &str) -> Error {
    let file = yaml::parse_file("ci.yml", content).unwrap();
    ScriptDecoder::new(PipelineType::Gitlab, "")
        .decode(&file)
        .unwrap_err()
}

fn names(blocks: &[ScriptBlock]) -> Vec<&str> {
    blocks.iter().map(|b| b.block_name.as_str()).collect()
}

// ── plain jobs ────────────────────────────────────────────────────────────────

#[test]
fn flow_sequence_yields_one_block_per_element() {
    let blocks = decode("build:\n  script: [\"echo start\", \"make\"]\n");

    assert_eq!(names(&blocks), vec!["build_script", "build_script_1"]);
    assert_eq!(blocks[0].script, "echo start");
    assert_eq!(blocks[1].script, "make");
    assert_eq!(blocks[0].start_line, 2);
    assert_eq!(blocks[1].start_line, 2);
    assert!(blocks.iter().all(|b| b.shell.is_empty()));
    assert!(blocks.iter().all(|b| b.directive.is_none()));
}

#[test]
fn block_sequence_elements_keep_their_own_lines() {
    let blocks = decode("build:\n  script:\n    - echo start\n    - make\n    - make install\n");

    assert_eq!(
        names(&blocks),
        vec!["build_script", "build_script_1", "build_script_2"]
    );
    let lines: Vec<usize> = blocks.iter().map(|b| b.start_line).collect();
    assert_eq!(lines, vec![3, 4, 5]);
    assert!(blocks.iter().all(|b| b.path == "$.build.script"));
    assert!(blocks.iter().all(|b| b.file_name == "ci.yml"));
}

#[test]
fn plain_scalar_section_starts_on_its_own_line() {
    let blocks = decode("stages:\n  - test\n\ntest:\n  script: make test\n");
    assert_eq!(names(&blocks), vec!["test_script"]);
    assert_eq!(blocks[0].start_line, 5);
}

#[test]
fn all_three_sections_are_extracted() {
    let blocks = decode(
        "job:\n  before_script: echo before\n  script: echo main\n  after_script: echo after\n  image: alpine\n",
    );
    assert_eq!(
        names(&blocks),
        vec!["job_before_script", "job_script", "job_after_script"]
    );
}

#[test]
fn default_shell_applies_without_directive() {
    let blocks = decode_with_shell("build:\n  script: make\n", "sh");
    assert_eq!(blocks[0].shell, "sh");
}

#[test]
fn non_mapping_top_level_entries_are_not_jobs() {
    let blocks = decode("stages:\n  - build\nvariables:\n  A: b\ninclude: other.yml\n");
    assert!(blocks.is_empty());
}

#[test]
fn empty_document_yields_no_blocks() {
    assert!(decode("").is_empty());
    assert!(decode("# only a comment\n").is_empty());
}

// ── block scalars ─────────────────────────────────────────────────────────────

#[test]
fn literal_block_starts_line_after_indicator() {
    let blocks = decode("job:\n  script: |\n    echo one\n    echo two\n");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].start_line, 3);
    assert_eq!(blocks[0].script, "echo one\necho two\n");
}

#[test]
fn literal_block_in_sequence_starts_line_after_indicator() {
    let blocks = decode("job:\n  script:\n    - echo first\n    - |\n      echo second\n");
    assert_eq!(blocks[1].start_line, 5);
    assert_eq!(blocks[1].script, "echo second\n");
}

#[test]
fn folded_block_is_rebuilt_with_continuations() {
    let blocks = decode("job:\n  script: >\n    docker build\n    --pull\n    .\n");
    assert_eq!(blocks[0].script, "docker build \\\n--pull \\\n.\n");
    assert_eq!(blocks[0].start_line, 3);
}

// ── hidden jobs and references ────────────────────────────────────────────────

#[test]
fn hidden_jobs_are_not_extracted() {
    let blocks = decode(".hidden:\n  script: echo hidden\nvisible:\n  script: echo visible\n");
    assert_eq!(names(&blocks), vec!["visible_script"]);
}

#[test]
fn reference_is_attributed_to_referencing_job() {
    let content = std::fs::read_to_string("tests/fixtures/template.yml").unwrap();
    let blocks = decode(&content);

    assert_eq!(names(&blocks), vec!["deploy_script", "deploy_script_1"]);
    assert_eq!(blocks[0].script, "echo deploying");
    assert_eq!(blocks[1].script, "./deploy.sh \"$TARGET\"");
    assert_eq!(blocks[0].start_line, 3);
    assert_eq!(blocks[1].start_line, 4);
    assert_eq!(blocks[0].path, "$.deploy.script");
}

#[test]
fn unresolved_reference_yields_nothing() {
    let blocks = decode("job:\n  before_script: !reference [.missing, script]\n  script: make\n");
    assert_eq!(names(&blocks), vec!["job_script"]);
}

#[test]
fn reference_inside_sequence_is_flattened() {
    let blocks = decode(
        ".setup:\n  script:\n    - echo a\n    - echo b\njob:\n  script:\n    - !reference [.setup, script]\n    - echo c\n",
    );
    let scripts: Vec<&str> = blocks.iter().map(|b| b.script.as_str()).collect();
    assert_eq!(scripts, vec!["echo a", "echo b", "echo c"]);
    assert_eq!(names(&blocks), vec!["job_script", "job_script_1", "job_script_2"]);
}

#[test]
fn reference_cycle_is_an_error() {
    let content = std::fs::read_to_string("tests/fixtures/cycle.yml").unwrap();
    match decode_err(&content) {
        Error::Extract { file, source } => {
            assert_eq!(file, "ci.yml");
            assert!(matches!(source, ExtractError::ReferenceCycle { .. }));
        }
        other => panic!("expected an extraction error, got {other:?}"),
    }
}

// ── anchors, aliases and merge keys ───────────────────────────────────────────

#[test]
fn aliased_section_resolves_to_anchor() {
    let blocks = decode(".tpl:\n  script: &build\n    - make\njob:\n  script: *build\n");
    assert_eq!(names(&blocks), vec!["job_script"]);
    assert_eq!(blocks[0].script, "make");
    assert_eq!(blocks[0].start_line, 3);
    assert_eq!(blocks[0].path, "$.job.script");
}

#[test]
fn aliased_job_value_is_unwrapped() {
    let blocks = decode(".tpl: &tpl\n  script: echo hi\njob: *tpl\n");
    assert_eq!(names(&blocks), vec!["job_script"]);
    assert_eq!(blocks[0].start_line, 2);
}

#[test]
fn anchored_job_is_extracted() {
    let blocks = decode("job: &job\n  script: echo hi\n");
    assert_eq!(names(&blocks), vec!["job_script"]);
}

#[test]
fn merge_key_contributes_missing_sections() {
    let blocks = decode(
        ".base: &base\n  before_script:\n    - echo setup\n  script:\n    - echo base\njob:\n  <<: *base\n  script:\n    - echo job\n",
    );
    assert_eq!(names(&blocks), vec!["job_script", "job_before_script"]);
    assert_eq!(blocks[0].script, "echo job");
    assert_eq!(blocks[1].script, "echo setup");
    assert_eq!(blocks[1].start_line, 3);
}

// ── directives ────────────────────────────────────────────────────────────────

#[test]
fn section_directive_overrides_default_shell() {
    let content = std::fs::read_to_string("tests/fixtures/directives.yml").unwrap();
    let blocks = decode_with_shell(&content, "sh");

    assert_eq!(names(&blocks), vec!["build_before_script", "build_script"]);
    let before = &blocks[0];
    assert_eq!(before.shell, "bash");
    let directive = before.directive.as_ref().unwrap();
    assert_eq!(directive.shell(), "bash");
    assert_eq!(directive.get("disable"), Some("SC2086,SC2046"));
    assert_eq!(before.disabled_rules(), vec!["SC2086", "SC2046"]);

    assert_eq!(blocks[1].shell, "sh");
    assert!(blocks[1].directive.is_none());
}

#[test]
fn element_directive_merges_with_section_directive() {
    let blocks = decode(
        "job:\n  # scriptcheck shell=bash disable=SC2086\n  script:\n    # scriptcheck shell=zsh disable=SC2046\n    - echo $A\n    - echo $B\n",
    );
    assert_eq!(blocks[0].shell, "zsh");
    assert_eq!(blocks[0].disabled_rules(), vec!["SC2086", "SC2046"]);
    assert_eq!(blocks[1].shell, "bash");
    assert_eq!(blocks[1].disabled_rules(), vec!["SC2086"]);
}

#[test]
fn directive_annotated_entries_outside_jobs_are_extracted() {
    let blocks = decode(
        "variables:\n  # scriptcheck shell=bash\n  SETUP: echo $HOME\njob:\n  script: echo hi\n",
    );
    assert_eq!(names(&blocks), vec!["job_script", "directive_SETUP"]);
    let setup = &blocks[1];
    assert_eq!(setup.shell, "bash");
    assert_eq!(setup.start_line, 3);
    assert_eq!(setup.path, "$.variables.SETUP");
}

#[test]
fn directive_in_hidden_job_is_extracted() {
    let blocks = decode(".tpl:\n  # scriptcheck shell=bash\n  script: echo $X\n");
    assert_eq!(names(&blocks), vec!["directive_script"]);
}

#[test]
fn annotated_job_sections_are_not_extracted_twice() {
    let blocks = decode("job:\n  # scriptcheck shell=bash\n  script: echo $X\n");
    assert_eq!(names(&blocks), vec!["job_script"]);
}

#[test]
fn block_names_are_unique() {
    let blocks = decode(
        "directive:\n  script: echo job\n.tpl:\n  # scriptcheck shell=bash\n  script: echo tpl\n",
    );
    let mut seen = names(&blocks);
    assert_eq!(seen.len(), 2);
    seen.dedup();
    assert_eq!(seen.len(), 2);
    assert_eq!(names(&blocks)[0], "directive_script");
}

// ── inputs and documents ──────────────────────────────────────────────────────

#[test]
fn second_document_is_the_pipeline() {
    let content = std::fs::read_to_string("tests/fixtures/inputs.yml").unwrap();
    let blocks = decode(&content);

    assert_eq!(names(&blocks), vec!["deploy_script", "deploy_script_1"]);
    assert_eq!(blocks[0].start_line, 8);
    assert_eq!(blocks[0].script, "./deploy.sh ${ENVIRONMENT}");
    assert_eq!(blocks[1].script, "echo 'environment'");
}

// ── files ─────────────────────────────────────────────────────────────────────

#[test]
fn decode_file_uses_the_path_as_file_name() {
    let decoder = ScriptDecoder::new(PipelineType::Gitlab, "");
    let blocks = decoder
        .decode_file(Path::new("tests/fixtures/basic.yml"))
        .unwrap();

    assert_eq!(names(&blocks), vec!["build_script", "build_script_1"]);
    assert_eq!(blocks[0].file_name, "tests/fixtures/basic.yml");
    assert_eq!(blocks[0].start_line, 7);
    assert_eq!(blocks[1].start_line, 8);
}

#[test]
fn decode_file_reports_missing_file() {
    let decoder = ScriptDecoder::new(PipelineType::Gitlab, "");
    let err = decoder
        .decode_file(Path::new("tests/fixtures/missing.yml"))
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn merged_files_resolve_references_across_files() {
    let decoder = ScriptDecoder::new(PipelineType::Gitlab, "");
    let files = vec![
        PathBuf::from("tests/fixtures/pipelines/a.yml"),
        PathBuf::from("tests/fixtures/pipelines/nested/b.yaml"),
    ];
    let blocks = decoder.merge_and_decode(&files).unwrap();

    assert_eq!(names(&blocks), vec!["job_before_script", "job_script"]);
    assert_eq!(blocks[0].script, "echo setup");
    assert_eq!(blocks[0].file_name, "tests/fixtures/pipelines/a.yml");
    assert_eq!(blocks[0].start_line, 3);
    assert_eq!(blocks[1].file_name, "tests/fixtures/pipelines/nested/b.yaml");
    assert_eq!(blocks[1].start_line, 4);
}

#[test]
fn unmerged_file_leaves_cross_file_reference_unresolved() {
    let decoder = ScriptDecoder::new(PipelineType::Gitlab, "");
    let blocks = decoder
        .decode_file(Path::new("tests/fixtures/pipelines/nested/b.yaml"))
        .unwrap();
    assert_eq!(names(&blocks), vec!["job_script"]);
}

#[test]
fn merged_files_resolve_aliases_across_files() {
    let decoder = ScriptDecoder::new(PipelineType::Gitlab, "");
    let files = vec![
        PathBuf::from("tests/fixtures/aliases/a.yml"),
        PathBuf::from("tests/fixtures/aliases/b.yaml"),
    ];
    let blocks = decoder.merge_and_decode(&files).unwrap();

    assert_eq!(names(&blocks), vec!["job_script"]);
    assert_eq!(blocks[0].script, "echo common");
    assert_eq!(blocks[0].file_name, "tests/fixtures/aliases/a.yml");
    assert_eq!(blocks[0].start_line, 2);
    assert_eq!(blocks[0].path, "$.job.script");
}

#[test]
fn merged_alias_without_any_anchor_names_it() {
    let decoder = ScriptDecoder::new(PipelineType::Gitlab, "");
    let files = vec![PathBuf::from("tests/fixtures/aliases/b.yaml")];
    let err = decoder.merge_and_decode(&files).unwrap_err();

    assert!(matches!(
        &err,
        Error::Extract {
            source: ExtractError::UnresolvedAlias { anchor, .. },
            ..
        } if anchor == "common"
    ));
}

// ── unknown anchors ───────────────────────────────────────────────────────────

#[test]
fn unmerged_cross_file_alias_names_the_anchor() {
    let decoder = ScriptDecoder::new(PipelineType::Gitlab, "");
    let err = decoder
        .decode_file(Path::new("tests/fixtures/aliases/b.yaml"))
        .unwrap_err();

    match err {
        Error::Extract { file, source } => {
            assert_eq!(file, "tests/fixtures/aliases/b.yaml");
            assert_eq!(
                source,
                ExtractError::UnresolvedAlias {
                    anchor: "common".to_string(),
                    line: 2,
                }
            );
        }
        other => panic!("expected an extract error, got {other:?}"),
    }
}

#[test]
fn unknown_anchor_error_names_the_anchor() {
    let err = yaml::parse_file("ci.yml", "job:\n  script: *missing\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("'missing'"), "{message}");
    assert!(message.contains("ci.yml"), "{message}");
}

#[test]
fn alias_before_its_anchor_is_unresolved() {
    let err = yaml::parse_file(
        "ci.yml",
        "job:\n  script: *later\n.tpl:\n  script: &later\n    - make\n",
    )
    .unwrap_err();

    assert!(matches!(
        err,
        Error::Extract {
            source: ExtractError::UnresolvedAlias { ref anchor, line: 2 },
            ..
        } if anchor == "later"
    ));
}
