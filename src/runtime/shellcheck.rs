//! Runs [ShellCheck](https://www.shellcheck.net/) over generated scripts.
//!
//! The `shellcheck` binary must be on `PATH`. All scripts of one check are
//! passed to a single invocation with `--format json`; shellcheck exits
//! with 0 when it has nothing to report and with 1 when it reports
//! findings.

use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};
use crate::report::ShellcheckFinding;

pub const SHELLCHECK: &str = "shellcheck";

/// Returns `true` if an executable named `cmd` exists on `PATH`.
///
/// On Unix the file must also have an executable permission bit set.
pub fn which_exists(cmd: &str) -> bool {
    std::env::var_os("PATH")
        .map(|path| {
            std::env::split_paths(&path).any(|dir| {
                let candidate = dir.join(cmd);
                if !candidate.is_file() {
                    return false;
                }
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    std::fs::metadata(&candidate)
                        .map(|m| m.permissions().mode() & 0o111 != 0)
                        .unwrap_or(false)
                }
                #[cfg(not(unix))]
                {
                    true
                }
            })
        })
        .unwrap_or(false)
}

/// Turns `severity=style` style flags into `--severity=style`.
pub fn flag_args(flags: &[String]) -> Vec<String> {
    flags
        .iter()
        .map(|flag| {
            if flag.starts_with('-') {
                flag.clone()
            } else {
                format!("--{flag}")
            }
        })
        .collect()
}

/// Runs shellcheck once over `files`.
///
/// # Errors
///
/// [`Error::Shellcheck`] when shellcheck is missing, cannot be spawned or
/// exits with anything but 0 or 1; [`Error::Report`] when its JSON output
/// cannot be decoded.
pub fn run(files: &[String], flags: &[String]) -> Result<Vec<ShellcheckFinding>> {
    if files.is_empty() {
        return Ok(Vec::new());
    }
    if !which_exists(SHELLCHECK) {
        return Err(Error::Shellcheck(format!("{SHELLCHECK} not found on PATH")));
    }

    let args = flag_args(flags);
    debug!(files = files.len(), ?args, "running shellcheck");
    let output = Command::new(SHELLCHECK)
        .args(&args)
        .arg("--format")
        .arg("json")
        .args(files)
        .output()
        .map_err(|e| Error::Shellcheck(format!("failed to run {SHELLCHECK}: {e}")))?;

    match output.status.code() {
        Some(0) => Ok(Vec::new()),
        Some(1) => parse_report(&String::from_utf8_lossy(&output.stdout)),
        code => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let status = code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}"));
            Err(Error::Shellcheck(format!(
                "exited with {status}: {}",
                stderr.trim()
            )))
        }
    }
}

/// Decodes `shellcheck --format json` output.
pub fn parse_report(json: &str) -> Result<Vec<ShellcheckFinding>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(json)?)
}
