//! Turns a section value into script fragments.

use std::collections::HashSet;

use tracing::debug;

use super::anchors::AliasTargetMap;
use super::directive::Directive;
use super::folding::fold_literal;
use super::reference::{reference_path, resolve_path, unwrap, REFERENCE_TAG};
use super::script::ScriptNode;
use super::ExtractError;
use crate::yaml::{NodeId, NodeKind, YamlFile};

/// Resolves nodes of one document through anchors, aliases, references
/// and sequences.
pub struct Resolver<'a> {
    file: &'a YamlFile,
    root: NodeId,
    aliases: &'a AliasTargetMap,
}

/// Reference paths and aliases currently being expanded.
#[derive(Default)]
struct InProgress {
    references: HashSet<String>,
    aliases: HashSet<NodeId>,
}

impl<'a> Resolver<'a> {
    pub fn new(file: &'a YamlFile, root: NodeId, aliases: &'a AliasTargetMap) -> Self {
        Resolver {
            file,
            root,
            aliases,
        }
    }

    pub fn file(&self) -> &'a YamlFile {
        self.file
    }

    pub(crate) fn aliases(&self) -> &'a AliasTargetMap {
        self.aliases
    }

    /// Resolves `node` into script fragments in document order.
    ///
    /// # Errors
    ///
    /// [`ExtractError::UnresolvedAlias`] for an alias missing from the alias
    /// map, [`ExtractError::ReferenceCycle`] when a reference leads back
    /// into itself.
    pub fn resolve(&self, node: NodeId) -> Result<Vec<ScriptNode>, ExtractError> {
        let mut out = Vec::new();
        self.resolve_into(node, None, &mut InProgress::default(), &mut out)?;
        Ok(out)
    }

    fn resolve_into(
        &self,
        node: NodeId,
        directive: Option<&Directive>,
        in_progress: &mut InProgress,
        out: &mut Vec<ScriptNode>,
    ) -> Result<(), ExtractError> {
        let file = self.file;
        match file.kind(node) {
            NodeKind::Tagged { tag, value } => {
                if tag != REFERENCE_TAG {
                    return self.resolve_into(*value, directive, in_progress, out);
                }
                let Some(segments) = reference_path(file, node) else {
                    debug!(line = file.node(node).position.line, "malformed reference");
                    return Ok(());
                };
                let key = segments.join(".");
                let Some(target) = resolve_path(file, self.root, self.aliases, &segments) else {
                    debug!(reference = %key, "reference target not found");
                    return Ok(());
                };
                if !in_progress.references.insert(key.clone()) {
                    return Err(ExtractError::ReferenceCycle { path: key });
                }
                self.resolve_into(target, directive, in_progress, out)?;
                in_progress.references.remove(&key);
                Ok(())
            }
            NodeKind::Anchor { value, .. } => {
                self.resolve_into(*value, directive, in_progress, out)
            }
            NodeKind::Alias { name } => {
                let Some(target) = self.aliases.target(node) else {
                    return Err(ExtractError::UnresolvedAlias {
                        anchor: name.clone(),
                        line: file.node(node).position.line,
                    });
                };
                if !in_progress.aliases.insert(node) {
                    return Err(ExtractError::ReferenceCycle {
                        path: format!("*{name}"),
                    });
                }
                self.resolve_into(target, directive, in_progress, out)?;
                in_progress.aliases.remove(&node);
                Ok(())
            }
            NodeKind::Sequence {
                items,
                item_comments,
            } => {
                for (i, item) in items.iter().enumerate() {
                    let element = Directive::from_comment(item_comments.get(i).and_then(Option::as_ref));
                    let directive = match (&element, directive) {
                        (Some(element), Some(outer)) => Some(outer.merge(element)),
                        (Some(element), None) => Some(element.clone()),
                        (None, outer) => outer.cloned(),
                    };
                    self.resolve_into(*item, directive.as_ref(), in_progress, out)?;
                }
                Ok(())
            }
            NodeKind::Scalar { value, .. } => {
                out.push(ScriptNode {
                    text: value.clone(),
                    source_line: file.node(node).position.line,
                    directive: directive.cloned(),
                    source: file.node(node).source,
                });
                Ok(())
            }
            NodeKind::BlockScalar { folded, value, raw } => {
                let text = if *folded {
                    fold_literal(raw)
                } else {
                    value.clone()
                };
                out.push(ScriptNode {
                    text,
                    source_line: file.node(node).position.line + 1,
                    directive: directive.cloned(),
                    source: file.node(node).source,
                });
                Ok(())
            }
            NodeKind::Mapping { .. } | NodeKind::MappingEntry { .. } => Ok(()),
        }
    }

    /// Entries of the mapping behind `node`, looking through anchors and
    /// aliases. `None` when `node` is not a mapping.
    pub fn mapping_entries(&self, node: NodeId) -> Option<&'a [NodeId]> {
        let file = self.file;
        match file.kind(unwrap(file, self.aliases, node)) {
            NodeKind::Mapping { entries } => Some(entries.as_slice()),
            _ => None,
        }
    }
}
