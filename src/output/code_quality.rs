//! GitLab Code Quality (code climate) formatter.
//!
//! Each report becomes one issue. The fingerprint hashes the location and
//! the finding, so the same finding keeps its identity between pipelines.

use crate::report::{CheckReport, Level, ScriptCheckReport};

#[derive(serde::Serialize)]
struct Issue<'a> {
    description: String,
    check_name: &'a str,
    fingerprint: String,
    severity: &'static str,
    location: Location<'a>,
}

#[derive(serde::Serialize)]
struct Location<'a> {
    path: &'a str,
    lines: Lines,
}

#[derive(serde::Serialize)]
struct Lines {
    begin: usize,
}

/// Code Quality severity of a shellcheck level.
pub fn severity(level: Level) -> &'static str {
    match level {
        Level::Error => "major",
        Level::Warning => "minor",
        Level::Info => "info",
        Level::Style => "minor",
    }
}

/// Stable identity of a report.
pub fn fingerprint(report: &ScriptCheckReport) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in [
        report.file.as_str(),
        report.path.as_str(),
        &report.line.to_string(),
        report.reason.as_str(),
        report.message.as_str(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize().to_hex().to_string()
}

/// Formats a [`CheckReport`] as a Code Quality JSON array.
///
/// # Panics
///
/// Panics if the report cannot be serialized (should not happen with valid data).
pub fn format(report: &CheckReport) -> String {
    let issues: Vec<Issue<'_>> = report
        .reports
        .iter()
        .map(|r| Issue {
            description: format!("{}/{}", r.reason, r.message),
            check_name: &r.reason,
            fingerprint: fingerprint(r),
            severity: severity(r.level),
            location: Location {
                path: &r.file,
                lines: Lines { begin: r.line },
            },
        })
        .collect();

    serde_json::to_string_pretty(&issues).expect("JSON serialization failed")
}
