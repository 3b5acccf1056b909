//! JSON output formatter.

use crate::report::{CheckReport, FileError, ScriptCheckReport};

#[derive(serde::Serialize)]
struct JsonOutput<'a> {
    checked_at: &'a str,
    files: usize,
    scripts: usize,
    passed: bool,
    summary: Summary,
    reports: &'a [ScriptCheckReport],
    errors: &'a [FileError],
}

#[derive(serde::Serialize)]
struct Summary {
    errors: usize,
    warnings: usize,
    info: usize,
    style: usize,
    failed_files: usize,
}

/// Formats a [`CheckReport`] as pretty-printed JSON.
///
/// # Panics
///
/// Panics if the report cannot be serialized (should not happen with valid data).
pub fn format(report: &CheckReport) -> String {
    let (errors, warnings, info, style) = report.count_by_level();
    let output = JsonOutput {
        checked_at: &report.checked_at,
        files: report.files,
        scripts: report.scripts,
        passed: report.passed,
        summary: Summary {
            errors,
            warnings,
            info,
            style,
            failed_files: report.errors.len(),
        },
        reports: &report.reports,
        errors: &report.errors,
    };

    serde_json::to_string_pretty(&output).expect("JSON serialization failed")
}
