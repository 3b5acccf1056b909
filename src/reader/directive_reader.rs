use std::collections::HashSet;

use super::anchors::AliasTargetMap;
use super::directive::Directive;
use super::resolve::Resolver;
use super::{entry_blocks, BlockNames, ExtractError, ScriptBlock, ScriptReader};
use crate::yaml::{NodeId, NodeKind, YamlFile};

/// Extracts every mapping entry annotated with a `# scriptcheck` directive,
/// in any document of the file, as a block named `directive_{key}`.
pub struct DirectiveReader<'r> {
    reader: &'r dyn ScriptReader,
}

impl<'r> DirectiveReader<'r> {
    /// `reader` supplies the dialect's script transform.
    pub fn new(reader: &'r dyn ScriptReader) -> Self {
        DirectiveReader { reader }
    }

    /// Entries listed in `covered` were already extracted and are skipped
    /// along with everything below them.
    pub fn read_scripts(
        &self,
        file: &YamlFile,
        default_shell: &str,
        covered: &HashSet<NodeId>,
        names: &mut BlockNames,
    ) -> Result<Vec<ScriptBlock>, ExtractError> {
        let mut blocks = Vec::new();
        for root in file.documents.iter().filter_map(|doc| doc.root) {
            let aliases = AliasTargetMap::build(file, root)?;
            let mut walk = Walk {
                reader: self.reader,
                resolver: Resolver::new(file, root, &aliases),
                default_shell,
                covered,
                names: &mut *names,
                blocks: &mut blocks,
            };
            walk.visit(root)?;
        }
        Ok(blocks)
    }
}

struct Walk<'a> {
    reader: &'a dyn ScriptReader,
    resolver: Resolver<'a>,
    default_shell: &'a str,
    covered: &'a HashSet<NodeId>,
    names: &'a mut BlockNames,
    blocks: &'a mut Vec<ScriptBlock>,
}

impl Walk<'_> {
    fn visit(&mut self, id: NodeId) -> Result<(), ExtractError> {
        let file = self.resolver.file();
        match file.kind(id) {
            NodeKind::Mapping { entries } => {
                entries.iter().try_for_each(|entry| self.visit(*entry))
            }
            NodeKind::Sequence { items, .. } => items.iter().try_for_each(|item| self.visit(*item)),
            NodeKind::Anchor { value, .. } | NodeKind::Tagged { value, .. } => self.visit(*value),
            NodeKind::MappingEntry { value, comment, .. } => {
                if self.covered.contains(&id) {
                    return Ok(());
                }
                if Directive::from_comment(comment.as_ref()).is_none() {
                    return self.visit(*value);
                }
                let key = file.entry_key(id).unwrap_or_default();
                let base = format!("directive_{key}");
                let blocks = entry_blocks(
                    self.reader,
                    &self.resolver,
                    id,
                    &base,
                    self.blocks.len(),
                    self.default_shell,
                    self.names,
                )?;
                if blocks.is_empty() {
                    return self.visit(*value);
                }
                self.blocks.extend(blocks);
                Ok(())
            }
            NodeKind::Scalar { .. } | NodeKind::BlockScalar { .. } | NodeKind::Alias { .. } => {
                Ok(())
            }
        }
    }
}
