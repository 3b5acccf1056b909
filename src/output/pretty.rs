//! Human-readable colored text formatter.
//!
//! Findings are listed per pipeline file in line order. Each finding shows
//! its location, the offending script line when known, a caret marker
//! under the reported columns and a link to the ShellCheck wiki.

use std::collections::BTreeMap;

use colored::{ColoredString, Colorize};

use super::sarif::wiki_url;
use crate::report::{CheckReport, Level, ScriptCheckReport};

/// Formats a [`CheckReport`] as human-readable, ANSI-colored text.
pub fn format(report: &CheckReport) -> String {
    let mut out = String::new();

    let mut by_file: BTreeMap<&str, Vec<&ScriptCheckReport>> = BTreeMap::new();
    for r in &report.reports {
        by_file.entry(r.file.as_str()).or_default().push(r);
    }

    for (file, mut reports) in by_file {
        reports.sort_by_key(|r| (r.line, r.column));
        out.push_str(&format!("\n{}\n", file.bold().underline()));
        for r in reports {
            out.push_str(&format_report(r));
        }
    }

    if !report.errors.is_empty() {
        out.push_str(&format!("\n{}\n", "Errors".bold().underline()));
        for e in &report.errors {
            out.push_str(&format!(
                "  [{}] {}\n         {}\n",
                "FAIL".red().bold(),
                e.file,
                e.message.dimmed()
            ));
        }
    }

    let status = if report.passed {
        "PASSED".green().bold().to_string()
    } else {
        "FAILED".red().bold().to_string()
    };
    let (errors, warnings, info, style) = report.count_by_level();
    out.push_str(&format!(
        "\nResult: {status}  |  {} files, {} scripts  |  {} errors, {} warnings, {} info, {} style\n",
        report.files, report.scripts, errors, warnings, info, style,
    ));

    out
}

fn format_report(r: &ScriptCheckReport) -> String {
    let mut out = format!(
        "  {} [{}] {} {}\n",
        format!("{}:{}:{}", r.file, r.line, r.column).dimmed(),
        paint(r.level, &r.level.to_string()),
        r.reason.dimmed(),
        r.message,
    );
    out.push_str(&format!("         {}\n", r.path.dimmed()));

    if let Some(ref source) = r.source_line {
        out.push_str(&format!("         > {source}\n"));
        if r.column > 0 {
            let width = r.end_column.saturating_sub(r.column).max(1);
            let marker = format!("{}{}", " ".repeat(r.column - 1), "^".repeat(width));
            out.push_str(&format!("           {}\n", paint(r.level, &marker)));
        }
    }
    out.push_str(&format!("         {}\n", wiki_url(&r.reason).dimmed()));
    out
}

fn paint(level: Level, text: &str) -> ColoredString {
    match level {
        Level::Error => text.red().bold(),
        Level::Warning => text.yellow().bold(),
        Level::Info => text.blue(),
        Level::Style => text.green(),
    }
}
