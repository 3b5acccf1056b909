//! Sinks for extracted scripts.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::reader::ScriptBlock;

/// Writes each block to its own file.
pub trait ScriptWriter {
    /// Writes `block` and returns the name of the generated file, as
    /// shellcheck will report it.
    fn write(&mut self, block: &ScriptBlock) -> Result<String>;
}

/// Writes scripts as uniquely named `script-*.sh` files inside a temporary
/// directory that is removed when the writer is dropped.
pub struct TempScriptWriter {
    dir: TempDir,
}

impl TempScriptWriter {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("scriptcheck-")
            .tempdir()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;
        Ok(TempScriptWriter { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl ScriptWriter for TempScriptWriter {
    fn write(&mut self, block: &ScriptBlock) -> Result<String> {
        let dir = self.dir.path();
        let mut file = tempfile::Builder::new()
            .prefix("script-")
            .suffix(".sh")
            .tempfile_in(dir)
            .map_err(|e| Error::io(dir, e))?;
        file.write_all(block.script_string().as_bytes())
            .map_err(|e| Error::io(file.path(), e))?;
        let (_, path) = file.keep().map_err(|e| Error::io(dir, e.error))?;
        Ok(path.to_string_lossy().to_string())
    }
}

/// Writes scripts to `{root}/{pipeline dir}/{file stem}-{block}.sh`,
/// creating directories as needed.
pub struct DirScriptWriter {
    root: PathBuf,
}

impl DirScriptWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirScriptWriter { root: root.into() }
    }

    /// Target path of `block`. Root and parent components of the pipeline
    /// path are dropped so every file stays under the output directory.
    pub fn target(&self, block: &ScriptBlock) -> PathBuf {
        let name = block.output_file_name();
        let relative: PathBuf = Path::new(&name)
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        self.root.join(relative)
    }
}

impl ScriptWriter for DirScriptWriter {
    fn write(&mut self, block: &ScriptBlock) -> Result<String> {
        let path = self.target(block);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        std::fs::write(&path, block.script_string()).map_err(|e| Error::io(&path, e))?;
        Ok(path.to_string_lossy().to_string())
    }
}
