use std::path::Path;

use super::directive::Directive;
use crate::yaml::NodeId;

/// A resolved script fragment: one per scalar or sequence element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptNode {
    pub text: String,
    /// Line of the first script line in its source file.
    pub source_line: usize,
    /// Directive written on the sequence element itself, if any.
    pub directive: Option<Directive>,
    /// Index of the file the text was read from, see
    /// [`YamlFile::sources`](crate::yaml::YamlFile::sources).
    pub source: usize,
}

/// A fully resolved script ready to be written out and checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    /// Pipeline file the script was read from.
    pub file_name: String,
    /// `{job}_{section}`, suffixed `_{i}` for later sequence elements.
    pub block_name: String,
    pub script: String,
    /// Directive shell, else the configured default, else empty.
    pub shell: String,
    /// Locator of the section inside the pipeline file.
    pub path: String,
    /// Line of the first script line in the pipeline file.
    pub start_line: usize,
    pub directive: Option<Directive>,
    /// Mapping entry the script was extracted from.
    pub(crate) entry: Option<NodeId>,
}

impl ScriptBlock {
    pub fn new(
        file_name: &str,
        block_name: String,
        default_shell: &str,
        node: ScriptNode,
        path: &str,
        directive: Option<Directive>,
    ) -> Self {
        let shell = directive
            .as_ref()
            .map(Directive::shell)
            .filter(|shell| !shell.is_empty())
            .unwrap_or(default_shell)
            .to_string();

        ScriptBlock {
            file_name: file_name.to_string(),
            block_name,
            script: node.text,
            shell,
            path: path.to_string(),
            start_line: node.source_line,
            directive,
            entry: None,
        }
    }

    pub(crate) fn with_entry(mut self, entry: NodeId) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn has_shebang(&self) -> bool {
        self.script.starts_with("#!")
    }

    pub fn disabled_rules(&self) -> Vec<String> {
        self.directive
            .as_ref()
            .map(Directive::disabled_rules)
            .unwrap_or_default()
    }

    /// The synthetic `# shellcheck` line written before the script, if any.
    ///
    /// Scripts with their own shebang never get one. With a directive, the
    /// line carries the shell and the disabled rules; without one, only a
    /// configured shell produces a line.
    pub fn header(&self) -> Option<String> {
        if self.has_shebang() {
            return None;
        }

        let mut parts = Vec::new();
        if !self.shell.is_empty() {
            parts.push(format!("shell={}", self.shell));
        }
        let disabled = self.disabled_rules();
        if !disabled.is_empty() {
            parts.push(format!("disable={}", disabled.join(",")));
        }

        if parts.is_empty() {
            None
        } else {
            Some(format!("# shellcheck {}\n", parts.join(" ")))
        }
    }

    /// Number of synthetic lines preceding the script in generated files.
    pub fn header_lines(&self) -> usize {
        usize::from(self.header().is_some())
    }

    /// Content of the generated file.
    pub fn script_string(&self) -> String {
        let mut out = self.header().unwrap_or_default();
        out.push_str(&self.script);
        out
    }

    /// `{file stem}-{block}.sh`, keeping the pipeline file's directory.
    pub fn output_file_name(&self) -> String {
        let path = Path::new(&self.file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file_name.clone());
        let file = format!("{stem}-{}.sh", self.block_name);
        match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.join(file).to_string_lossy().to_string(),
            None => file,
        }
    }
}
