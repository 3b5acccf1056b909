use scriptcheck::error::Error;
use scriptcheck::reader::{ScriptBlock, ScriptNode};
use scriptcheck::report::{remap, BlockMap};
use scriptcheck::runtime::shellcheck::{self, flag_args, parse_report, which_exists, SHELLCHECK};
use scriptcheck::runtime::{ScriptWriter, TempScriptWriter};

fn block(script: &str, shell: &str) -> ScriptBlock {
    let node = ScriptNode {
        text: script.to_string(),
        source_line: 5,
        directive: None,
        source: 0,
    };
    ScriptBlock::new("ci.yml", "lint_script".to_string(), shell, node, "$.lint.script", None)
}

// ── flags ─────────────────────────────────────────────────────────────────────

#[test]
fn flags_get_leading_dashes_when_missing() {
    let flags = vec![
        "severity=warning".to_string(),
        "--exclude=SC1091".to_string(),
        "-x".to_string(),
    ];
    assert_eq!(
        flag_args(&flags),
        vec!["--severity=warning", "--exclude=SC1091", "-x"]
    );
}

// ── JSON output ───────────────────────────────────────────────────────────────

#[test]
fn parses_json_report() {
    let json = r#"[
      {"file":"/tmp/script-1.sh","line":2,"endLine":2,"column":6,"endColumn":10,
       "level":"info","code":2086,"message":"Double quote to prevent globbing and word splitting.",
       "fix":{"replacements":[]}},
      {"file":"/tmp/script-2.sh","line":1,"endLine":1,"column":1,"endColumn":1,
       "level":"error","code":2148,"message":"Tips depend on target shell and yours is unknown.",
       "fix":null}
    ]"#;
    let findings = parse_report(json).unwrap();

    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].file, "/tmp/script-1.sh");
    assert_eq!(findings[0].code, 2086);
    assert_eq!(findings[0].end_column, 10);
    assert_eq!(findings[1].level, "error");
}

#[test]
fn empty_output_means_no_findings() {
    assert!(parse_report("").unwrap().is_empty());
    assert!(parse_report("  \n").unwrap().is_empty());
    assert!(parse_report("[]").unwrap().is_empty());
}

#[test]
fn malformed_output_is_a_report_error() {
    assert!(matches!(parse_report("not json"), Err(Error::Report(_))));
}

// ── running shellcheck ────────────────────────────────────────────────────────

#[test]
fn no_files_never_runs_shellcheck() {
    assert!(shellcheck::run(&[], &[]).unwrap().is_empty());
}

#[test]
fn missing_shellcheck_is_an_error() {
    if which_exists(SHELLCHECK) {
        return;
    }
    let files = vec!["script.sh".to_string()];
    assert!(matches!(
        shellcheck::run(&files, &[]),
        Err(Error::Shellcheck(_))
    ));
}

#[test]
fn clean_script_has_no_findings() {
    if !which_exists(SHELLCHECK) {
        return;
    }
    let mut writer = TempScriptWriter::new().unwrap();
    let file = writer.write(&block("echo \"hello\"\n", "sh")).unwrap();

    assert!(shellcheck::run(&[file], &[]).unwrap().is_empty());
}

#[test]
fn unquoted_variable_maps_to_pipeline_line() {
    if !which_exists(SHELLCHECK) {
        return;
    }
    let mut writer = TempScriptWriter::new().unwrap();
    let b = block("echo $FOO\n", "sh");
    let file = writer.write(&b).unwrap();

    let findings = shellcheck::run(std::slice::from_ref(&file), &[]).unwrap();
    let mut blocks = BlockMap::new();
    blocks.insert(file, b);
    let reports = remap(&findings, &blocks);

    let report = reports
        .iter()
        .find(|r| r.reason == "SC2086")
        .expect("SC2086 should be reported");
    assert_eq!(report.line, 5);
    assert_eq!(report.file, "ci.yml");
    assert_eq!(report.source_line.as_deref(), Some("echo $FOO"));
}

#[test]
fn configured_flags_are_passed_through() {
    if !which_exists(SHELLCHECK) {
        return;
    }
    let mut writer = TempScriptWriter::new().unwrap();
    let file = writer.write(&block("echo $FOO\n", "sh")).unwrap();

    let flags = vec!["exclude=SC2086".to_string()];
    let findings = shellcheck::run(&[file], &flags).unwrap();
    assert!(findings.iter().all(|f| f.code != 2086));
}
