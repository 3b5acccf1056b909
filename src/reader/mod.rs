//! Script extraction from pipeline documents.
//!
//! A [`ScriptReader`] knows the layout of one pipeline dialect: which
//! document of a file is effective, where jobs and their script sections
//! live and how templated input tokens look. The [`ScriptDecoder`] runs the
//! dialect reader over a parsed file and adds the blocks marked with
//! `# scriptcheck` directives anywhere else in the file.

pub mod anchors;
pub mod directive;
mod directive_reader;
pub mod folding;
mod gitlab;
pub mod inputs;
pub mod reference;
pub mod resolve;
pub mod script;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::{Error, Result};
use crate::yaml::{self, NodeId, NodeKind, YamlFile};

pub use anchors::AliasTargetMap;
pub use directive::Directive;
pub use directive_reader::DirectiveReader;
pub use gitlab::{GitlabReader, HIDDEN_JOB_MARKER, SECTIONS};
pub use resolve::Resolver;
pub use script::{ScriptBlock, ScriptNode};

/// Errors that abort extraction for a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("unknown anchor '{anchor}' referenced at line {line}")]
    UnresolvedAlias { anchor: String, line: usize },

    #[error("reference cycle through '{path}'")]
    ReferenceCycle { path: String },
}

/// Supported pipeline dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineType {
    #[default]
    Gitlab,
}

impl PipelineType {
    pub fn reader(self) -> Box<dyn ScriptReader> {
        match self {
            PipelineType::Gitlab => Box::new(GitlabReader),
        }
    }
}

/// Dialect-specific script extraction.
pub trait ScriptReader: Send + Sync {
    fn name(&self) -> &'static str;

    /// Index of the document holding the pipeline, `None` for an empty file.
    fn effective_document(&self, file: &YamlFile) -> Option<usize>;

    /// Rewrites dialect syntax that is not valid shell.
    fn transform(&self, script: &str) -> String {
        script.to_string()
    }

    /// Extracts the script sections of every job.
    fn read_scripts(
        &self,
        file: &YamlFile,
        default_shell: &str,
        names: &mut BlockNames,
    ) -> Result<Vec<ScriptBlock>, ExtractError>;
}

/// Hands out block names that are unique within one file.
#[derive(Debug, Default)]
pub struct BlockNames {
    taken: HashSet<String>,
}

impl BlockNames {
    /// Returns `base`, or `base_{index}` (counting up from `index`) when the
    /// name is already taken.
    pub fn claim(&mut self, base: String, index: usize) -> String {
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut suffix = index;
        loop {
            let candidate = format!("{base}_{suffix}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Block name for the `index`-th fragment of a section.
pub(crate) fn fragment_name(base: &str, index: usize) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{base}_{index}")
    }
}

/// Resolves the value of one mapping entry into blocks named after
/// `base`. The entry's directive applies to every fragment and is merged
/// with the directive of each sequence element.
pub(crate) fn entry_blocks(
    reader: &dyn ScriptReader,
    resolver: &Resolver<'_>,
    entry: NodeId,
    base: &str,
    index: usize,
    default_shell: &str,
    names: &mut BlockNames,
) -> Result<Vec<ScriptBlock>, ExtractError> {
    let file = resolver.file();
    let NodeKind::MappingEntry { value, comment, .. } = file.kind(entry) else {
        return Ok(Vec::new());
    };
    let section = Directive::from_comment(comment.as_ref());
    let path = file.node(*value).path.as_str();

    let nodes = resolver.resolve(*value)?;
    let blocks = nodes
        .into_iter()
        .enumerate()
        .map(|(i, mut node)| {
            node.text = reader.transform(&node.text);
            let directive = Directive::combine(section.as_ref(), node.directive.as_ref());
            let name = names.claim(fragment_name(base, i), index);
            let file_name = file
                .sources
                .get(node.source)
                .map_or(file.name.as_str(), String::as_str);
            debug!(block = %name, line = node.source_line, "extracted script");
            ScriptBlock::new(file_name, name, default_shell, node, path, directive)
                .with_entry(entry)
        })
        .collect();
    Ok(blocks)
}

/// Reads every script of a pipeline file.
pub struct ScriptDecoder {
    reader: Box<dyn ScriptReader>,
    default_shell: String,
}

impl ScriptDecoder {
    pub fn new(pipeline: PipelineType, default_shell: impl Into<String>) -> Self {
        ScriptDecoder {
            reader: pipeline.reader(),
            default_shell: default_shell.into(),
        }
    }

    /// Reads and decodes one file.
    pub fn decode_file(&self, path: &Path) -> Result<Vec<ScriptBlock>> {
        let file = read_yaml(path, yaml::parse_file)?;
        self.decode(&file)
    }

    /// Merges all files into one document, then decodes it. Aliases may
    /// name anchors defined in any of the files.
    pub fn merge_and_decode(&self, paths: &[PathBuf]) -> Result<Vec<ScriptBlock>> {
        let files = paths
            .iter()
            .map(|path| read_yaml(path, yaml::parse_fragment))
            .collect::<Result<Vec<_>>>()?;
        let merged = yaml::merge_files(files)?;
        self.decode(&merged)
    }

    /// Extracts the dialect's job scripts, then the directive-annotated
    /// blocks not covered by them.
    pub fn decode(&self, file: &YamlFile) -> Result<Vec<ScriptBlock>> {
        let wrap = |source| Error::Extract {
            file: file.name.clone(),
            source,
        };

        let mut names = BlockNames::default();
        let mut blocks = self
            .reader
            .read_scripts(file, &self.default_shell, &mut names)
            .map_err(wrap)?;

        let covered: HashSet<NodeId> = blocks.iter().filter_map(|b| b.entry).collect();
        let annotated = DirectiveReader::new(self.reader.as_ref())
            .read_scripts(file, &self.default_shell, &covered, &mut names)
            .map_err(wrap)?;
        blocks.extend(annotated);

        debug!(
            file = %file.name,
            reader = self.reader.name(),
            blocks = blocks.len(),
            "decoded pipeline file"
        );
        Ok(blocks)
    }
}

fn read_yaml(path: &Path, parse: fn(&str, &str) -> Result<YamlFile>) -> Result<YamlFile> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse(&path.to_string_lossy(), &content)
}
