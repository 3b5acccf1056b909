use std::path::Path;

use scriptcheck::reader::{Directive, ScriptBlock, ScriptNode};
use scriptcheck::runtime::{DirScriptWriter, ScriptWriter, TempScriptWriter};

fn block(file_name: &str, script: &str, shell: &str, directive: Option<&str>) -> ScriptBlock {
    let node = ScriptNode {
        text: script.to_string(),
        source_line: 3,
        directive: None,
        source: 0,
    };
    ScriptBlock::new(
        file_name,
        "build_script".to_string(),
        shell,
        node,
        "$.build.script",
        directive.map(Directive::parse),
    )
}

// ── script content ────────────────────────────────────────────────────────────

#[test]
fn header_carries_shell_and_disabled_rules() {
    let b = block(
        "ci.yml",
        "echo $A\n",
        "sh",
        Some("scriptcheck shell=bash disable=SC2086,SC2046"),
    );
    assert_eq!(b.shell, "bash");
    assert_eq!(
        b.script_string(),
        "# shellcheck shell=bash disable=SC2086,SC2046\necho $A\n"
    );
    assert_eq!(b.header_lines(), 1);
}

#[test]
fn default_shell_applies_without_directive_shell() {
    let b = block("ci.yml", "make\n", "sh", None);
    assert_eq!(b.script_string(), "# shellcheck shell=sh\nmake\n");
}

#[test]
fn no_shell_and_no_rules_means_no_header() {
    let b = block("ci.yml", "make\n", "", None);
    assert_eq!(b.header(), None);
    assert_eq!(b.script_string(), "make\n");
    assert_eq!(b.header_lines(), 0);
}

#[test]
fn shebang_suppresses_header() {
    let b = block("ci.yml", "#!/bin/bash\nmake\n", "sh", Some("disable=SC2086"));
    assert!(b.has_shebang());
    assert_eq!(b.script_string(), "#!/bin/bash\nmake\n");
    assert_eq!(b.disabled_rules(), vec!["SC2086"]);
}

#[test]
fn output_file_name_keeps_pipeline_directory() {
    assert_eq!(
        block("ci/.gitlab-ci.yml", "make", "", None).output_file_name(),
        Path::new("ci")
            .join(".gitlab-ci-build_script.sh")
            .to_string_lossy()
    );
    assert_eq!(
        block("pipeline.yaml", "make", "", None).output_file_name(),
        "pipeline-build_script.sh"
    );
}

// ── writers ───────────────────────────────────────────────────────────────────

#[test]
fn temp_writer_creates_unique_files() {
    let mut writer = TempScriptWriter::new().unwrap();
    let b = block("ci.yml", "echo hi\n", "bash", None);

    let first = writer.write(&b).unwrap();
    let second = writer.write(&b).unwrap();

    assert_ne!(first, second);
    assert!(Path::new(&first).starts_with(writer.path()));
    assert!(first.ends_with(".sh"));
    assert_eq!(
        std::fs::read_to_string(&first).unwrap(),
        "# shellcheck shell=bash\necho hi\n"
    );
}

#[test]
fn temp_writer_removes_its_directory_on_drop() {
    let writer = TempScriptWriter::new().unwrap();
    let dir = writer.path().to_path_buf();
    assert!(dir.is_dir());
    drop(writer);
    assert!(!dir.exists());
}

#[test]
fn dir_writer_mirrors_pipeline_layout() {
    let out = tempfile::tempdir().unwrap();
    let mut writer = DirScriptWriter::new(out.path());
    let b = block("ci/pipeline.yml", "make\n", "", None);

    let written = writer.write(&b).unwrap();

    let expected = out.path().join("ci").join("pipeline-build_script.sh");
    assert_eq!(Path::new(&written), expected);
    assert_eq!(std::fs::read_to_string(expected).unwrap(), "make\n");
}

#[test]
fn dir_writer_keeps_absolute_and_parent_paths_inside_root() {
    let writer = DirScriptWriter::new("out");

    let absolute = block("/srv/ci/pipeline.yml", "make", "", None);
    assert_eq!(
        writer.target(&absolute),
        Path::new("out").join("srv").join("ci").join("pipeline-build_script.sh")
    );

    let parent = block("../pipeline.yml", "make", "", None);
    assert_eq!(
        writer.target(&parent),
        Path::new("out").join("pipeline-build_script.sh")
    );
}
