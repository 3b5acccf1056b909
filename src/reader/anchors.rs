//! Alias resolution.

use std::collections::HashMap;

use super::ExtractError;
use crate::yaml::{NodeId, NodeKind, YamlFile};

/// Maps every alias occurrence of a document to the node its anchor names.
///
/// Aliases are keyed by node identity, not by name: when an anchor name is
/// defined twice, each alias binds to the definition seen last before it.
#[derive(Debug, Default)]
pub struct AliasTargetMap {
    targets: HashMap<NodeId, NodeId>,
}

impl AliasTargetMap {
    /// Walks the tree under `root` once, in document order.
    ///
    /// # Errors
    ///
    /// [`ExtractError::UnresolvedAlias`] for an alias whose anchor was not
    /// defined before it.
    pub fn build(file: &YamlFile, root: NodeId) -> Result<Self, ExtractError> {
        let mut walker = AnchorWalker {
            file,
            anchors: HashMap::new(),
            targets: HashMap::new(),
        };
        walker.visit(root)?;
        Ok(AliasTargetMap {
            targets: walker.targets,
        })
    }

    pub fn target(&self, alias: NodeId) -> Option<NodeId> {
        self.targets.get(&alias).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

struct AnchorWalker<'a> {
    file: &'a YamlFile,
    anchors: HashMap<&'a str, NodeId>,
    targets: HashMap<NodeId, NodeId>,
}

impl<'a> AnchorWalker<'a> {
    fn visit(&mut self, id: NodeId) -> Result<(), ExtractError> {
        let file = self.file;
        match file.kind(id) {
            NodeKind::Anchor { name, value } => {
                self.anchors.insert(name.as_str(), *value);
                self.visit(*value)
            }
            NodeKind::Alias { name } => {
                let Some(target) = self.anchors.get(name.as_str()).copied() else {
                    return Err(ExtractError::UnresolvedAlias {
                        anchor: name.clone(),
                        line: file.node(id).position.line,
                    });
                };
                self.targets.entry(id).or_insert(target);
                Ok(())
            }
            NodeKind::Sequence { items, .. } => items.iter().try_for_each(|item| self.visit(*item)),
            NodeKind::Mapping { entries } => {
                entries.iter().try_for_each(|entry| self.visit(*entry))
            }
            NodeKind::MappingEntry { key, value, .. } => {
                self.visit(*key)?;
                self.visit(*value)
            }
            NodeKind::Tagged { value, .. } => self.visit(*value),
            NodeKind::Scalar { .. } | NodeKind::BlockScalar { .. } => Ok(()),
        }
    }
}
