//! Output formatting for check reports.
//!
//! | Format | Module | Use case |
//! |--------|--------|----------|
//! | [`Pretty`](OutputFormat::Pretty)           | [`pretty`]       | Terminal / human review |
//! | [`Json`](OutputFormat::Json)               | [`json`]         | Automation / scripting  |
//! | [`CodeQuality`](OutputFormat::CodeQuality) | [`code_quality`] | GitLab merge requests   |
//! | [`Sarif`](OutputFormat::Sarif)             | [`sarif`]        | CI/CD integration       |

pub mod code_quality;
pub mod json;
pub mod pretty;
pub mod sarif;

use crate::report::CheckReport;

/// Supported output formats for check reports.
#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored text.
    Pretty,
    /// Machine-readable JSON.
    Json,
    /// [GitLab Code Quality](https://docs.gitlab.com/ee/ci/testing/code_quality.html) report.
    CodeQuality,
    /// [SARIF 2.1.0](https://sarifweb.azurewebsites.net/) for CI/CD tool integration.
    Sarif,
}

/// Formats a [`CheckReport`] in the requested [`OutputFormat`].
///
/// ```rust,no_run
/// use scriptcheck::output::{format_report, OutputFormat};
/// # use scriptcheck::report::CheckReport;
/// # fn example(report: &CheckReport) {
/// let json = format_report(report, &OutputFormat::Json);
/// println!("{json}");
/// # }
/// ```
pub fn format_report(report: &CheckReport, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => pretty::format(report),
        OutputFormat::Json => json::format(report),
        OutputFormat::CodeQuality => code_quality::format(report),
        OutputFormat::Sarif => sarif::format(report),
    }
}
