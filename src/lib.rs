//! # scriptcheck
//!
//! Runs [shellcheck] over the shell scripts embedded in CI pipeline files
//! and reports every finding at its line in the pipeline file.
//!
//! Scripts may be written as plain or quoted scalars, literal or folded
//! block scalars, sequences, anchors and aliases, merge keys or GitLab
//! `!reference` tags. Each script is written to its own file, checked, and
//! the findings are mapped back through the synthetic header line to the
//! pipeline source.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use scriptcheck::{config::Config, output, runtime};
//!
//! let config = Config::load(None).expect("failed to load config");
//! let report = runtime::check(&config, &[".gitlab-ci.yml".to_string()])
//!     .expect("check failed");
//!
//! print!("{}", output::format_report(&report, &output::OutputFormat::Pretty));
//! std::process::exit(if report.passed { 0 } else { 1 });
//! ```
//!
//! ## Architecture
//!
//! 1. **[`yaml`]**: position-aware YAML tree with comments and anchors.
//! 2. **[`reader`]**: resolves aliases and references and extracts
//!    [`reader::ScriptBlock`]s per pipeline dialect.
//! 3. **[`runtime`]**: file discovery, script files and the shellcheck run.
//! 4. **[`report`]**: maps shellcheck findings back to pipeline lines.
//! 5. **[`output`]**: pretty text, JSON, GitLab Code Quality or [SARIF].
//!
//! ## Directives
//!
//! A comment starting with `scriptcheck` above a script section, a
//! sequence element or any other mapping entry sets the shell and
//! disables rules for that script:
//!
//! ```yaml
//! build:
//!   # scriptcheck shell=bash disable=SC2086
//!   script:
//!     - echo $HOME
//! ```
//!
//! [shellcheck]: https://www.shellcheck.net/
//! [SARIF]: https://sarifweb.azurewebsites.net/

pub mod config;
pub mod error;
pub mod output;
pub mod reader;
pub mod report;
pub mod runtime;
pub mod yaml;
