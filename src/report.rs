use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::reader::ScriptBlock;

/// Severity levels reported by shellcheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
    Info,
    Style,
}

impl Level {
    /// Unknown level names are treated as errors.
    pub fn parse(level: &str) -> Self {
        match level {
            "warning" => Level::Warning,
            "info" => Level::Info,
            "style" => Level::Style,
            _ => Level::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Info => write!(f, "info"),
            Level::Style => write!(f, "style"),
        }
    }
}

/// One entry of `shellcheck --format json`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellcheckFinding {
    pub file: String,
    pub line: usize,
    pub end_line: usize,
    pub column: usize,
    pub end_column: usize,
    pub level: String,
    pub code: u32,
    pub message: String,
}

/// A shellcheck finding located in the pipeline file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScriptCheckReport {
    pub file: String,
    pub path: String,
    pub level: Level,
    pub line: usize,
    pub column: usize,
    pub end_column: usize,
    /// `SC` followed by the shellcheck code.
    pub reason: String,
    pub message: String,
    /// The offending script line, when it lies inside the script.
    #[serde(skip)]
    pub source_line: Option<String>,
}

/// Generated file name to the block written into it.
pub type BlockMap = HashMap<String, ScriptBlock>;

/// Maps raw shellcheck findings back onto the pipeline files.
///
/// A generated file starts with the block's header line when it has one,
/// so finding line `n` is script line `n - offset` and lands on pipeline
/// line `start_line + n - 1 - offset`. A finding on the header itself maps
/// to the line above the script. Scripts with a shebang get no header and
/// an offset of 0.
///
/// The result is filtered as well as remapped: findings for unknown files
/// and findings whose code the block disables are dropped, so it may hold
/// fewer reports than `findings`.
pub fn remap(findings: &[ShellcheckFinding], blocks: &BlockMap) -> Vec<ScriptCheckReport> {
    findings
        .iter()
        .filter_map(|finding| {
            let Some(block) = blocks.get(&finding.file) else {
                warn!(file = %finding.file, "dropping finding for unknown script file");
                return None;
            };

            let reason = format!("SC{}", finding.code);
            if block.disabled_rules().contains(&reason) {
                return None;
            }

            let offset = block.header_lines();
            let line = (block.start_line + finding.line).saturating_sub(1 + offset);
            let source_line = finding
                .line
                .checked_sub(1 + offset)
                .and_then(|i| block.script.lines().nth(i))
                .map(str::to_string);

            Some(ScriptCheckReport {
                file: block.file_name.clone(),
                path: block.path.clone(),
                level: Level::parse(&finding.level),
                line,
                column: finding.column,
                end_column: finding.end_column,
                reason,
                message: finding.message.clone(),
                source_line,
            })
        })
        .collect()
}

/// A pipeline file that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileError {
    pub file: String,
    pub message: String,
}

/// Result of checking a set of pipeline files.
#[derive(Debug, serde::Serialize)]
pub struct CheckReport {
    pub checked_at: String,
    pub files: usize,
    pub scripts: usize,
    pub reports: Vec<ScriptCheckReport>,
    pub errors: Vec<FileError>,
    /// No finding remains and every file was decoded.
    pub passed: bool,
}

impl CheckReport {
    pub fn new(
        files: usize,
        scripts: usize,
        reports: Vec<ScriptCheckReport>,
        errors: Vec<FileError>,
    ) -> Self {
        let passed = reports.is_empty() && errors.is_empty();
        CheckReport {
            checked_at: chrono::Utc::now().to_rfc3339(),
            files,
            scripts,
            reports,
            errors,
            passed,
        }
    }

    /// Counts `(errors, warnings, info, style)` in a single pass.
    pub fn count_by_level(&self) -> (usize, usize, usize, usize) {
        self.reports
            .iter()
            .fold((0, 0, 0, 0), |(e, w, i, s), r| match r.level {
                Level::Error => (e + 1, w, i, s),
                Level::Warning => (e, w + 1, i, s),
                Level::Info => (e, w, i + 1, s),
                Level::Style => (e, w, i, s + 1),
            })
    }
}
