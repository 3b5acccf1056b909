//! The `check` and `extract` pipelines.
//!
//! Both start by expanding file patterns with [`collect_files`] and
//! decoding the files into [`ScriptBlock`]s. Independent files are decoded
//! in parallel via [rayon]; a file that fails to decode is reported and
//! skipped. In merge mode all files are decoded as one pipeline and any
//! failure aborts the run.

pub mod files;
pub mod shellcheck;
pub mod writer;

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::reader::{ScriptBlock, ScriptDecoder};
use crate::report::{remap, BlockMap, CheckReport, FileError};

pub use files::collect_files;
pub use writer::{DirScriptWriter, ScriptWriter, TempScriptWriter};

/// Scripts decoded from a set of files.
#[derive(Debug)]
pub struct Extraction {
    pub files: usize,
    pub blocks: Vec<ScriptBlock>,
    pub errors: Vec<FileError>,
}

/// Decodes `files` with the configured dialect and shell.
///
/// # Errors
///
/// Any decoding error in merge mode, and [`Error::NoScripts`] in strict
/// mode when nothing was extracted.
pub fn extract_scripts(config: &Config, files: &[PathBuf]) -> Result<Extraction> {
    let decoder = ScriptDecoder::new(config.pipeline, config.shell.clone());

    let (blocks, errors) = if config.merge {
        (decoder.merge_and_decode(files)?, Vec::new())
    } else {
        let results: Vec<_> = files
            .par_iter()
            .map(|file| (file, decoder.decode_file(file)))
            .collect();

        let mut blocks = Vec::new();
        let mut errors = Vec::new();
        for (file, result) in results {
            match result {
                Ok(decoded) => blocks.extend(decoded),
                Err(e) => {
                    warn!(file = %file.display(), "{e}");
                    errors.push(FileError {
                        file: file.display().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        (blocks, errors)
    };

    if config.strict && blocks.is_empty() {
        return Err(Error::NoScripts(files.len()));
    }

    info!(
        files = files.len(),
        scripts = blocks.len(),
        failed = errors.len(),
        "extracted scripts"
    );
    Ok(Extraction {
        files: files.len(),
        blocks,
        errors,
    })
}

/// Extracts the scripts of every matched file and checks them with
/// shellcheck.
pub fn check(config: &Config, patterns: &[String]) -> Result<CheckReport> {
    let files = collect_files(patterns)?;
    let extraction = extract_scripts(config, &files)?;

    let mut writer = TempScriptWriter::new()?;
    let mut names = Vec::with_capacity(extraction.blocks.len());
    let mut blocks = BlockMap::new();
    for block in extraction.blocks {
        let name = writer.write(&block)?;
        names.push(name.clone());
        blocks.insert(name, block);
    }

    let findings = shellcheck::run(&names, &config.shellcheck.args)?;
    let reports = remap(&findings, &blocks);
    info!(findings = findings.len(), reports = reports.len(), "checked scripts");

    Ok(CheckReport::new(
        extraction.files,
        blocks.len(),
        reports,
        extraction.errors,
    ))
}

/// Result of writing extracted scripts to a directory.
#[derive(Debug)]
pub struct ExtractSummary {
    pub files: usize,
    pub written: Vec<PathBuf>,
    pub errors: Vec<FileError>,
}

/// Writes the scripts of every matched file below `output_dir`.
pub fn extract(config: &Config, patterns: &[String], output_dir: &Path) -> Result<ExtractSummary> {
    let files = collect_files(patterns)?;
    let extraction = extract_scripts(config, &files)?;

    let mut writer = DirScriptWriter::new(output_dir);
    let written = extraction
        .blocks
        .iter()
        .map(|block| writer.write(block).map(PathBuf::from))
        .collect::<Result<Vec<_>>>()?;

    info!(scripts = written.len(), dir = %output_dir.display(), "wrote scripts");
    Ok(ExtractSummary {
        files: extraction.files,
        written,
        errors: extraction.errors,
    })
}
