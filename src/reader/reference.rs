//! `!reference [job, section]` resolution.

use super::anchors::AliasTargetMap;
use crate::yaml::{NodeId, NodeKind, YamlFile};

/// Tag marking an indirect reference.
pub const REFERENCE_TAG: &str = "!reference";

/// Path segments of a reference node, or `None` when `node` is not a
/// reference whose value is a sequence of scalars.
pub fn reference_path(file: &YamlFile, node: NodeId) -> Option<Vec<String>> {
    let NodeKind::Tagged { tag, value } = file.kind(node) else {
        return None;
    };
    if tag != REFERENCE_TAG {
        return None;
    }
    let NodeKind::Sequence { items, .. } = file.kind(*value) else {
        return None;
    };
    items
        .iter()
        .map(|item| file.scalar_text(*item).map(str::to_string))
        .collect()
}

/// Follows `segments` from `root` by mapping key, looking through anchors
/// and aliases on the way. Returns `None` when any segment is missing.
pub fn resolve_path(
    file: &YamlFile,
    root: NodeId,
    aliases: &AliasTargetMap,
    segments: &[String],
) -> Option<NodeId> {
    segments.iter().try_fold(root, |current, segment| {
        let NodeKind::Mapping { entries } = file.kind(unwrap(file, aliases, current)) else {
            return None;
        };
        entries.iter().rev().find_map(|entry| match file.kind(*entry) {
            NodeKind::MappingEntry { key, value, .. }
                if file.scalar_text(*key) == Some(segment.as_str()) =>
            {
                Some(*value)
            }
            _ => None,
        })
    })
}

/// Resolves a reference node to its target.
pub fn resolve_reference(
    file: &YamlFile,
    root: NodeId,
    aliases: &AliasTargetMap,
    node: NodeId,
) -> Option<NodeId> {
    let segments = reference_path(file, node)?;
    resolve_path(file, root, aliases, &segments)
}

/// Strips anchor wrappers and follows aliases.
pub(crate) fn unwrap(file: &YamlFile, aliases: &AliasTargetMap, id: NodeId) -> NodeId {
    let mut current = id;
    // Bounded by the arena size.
    for _ in 0..=file.len() {
        current = match file.kind(current) {
            NodeKind::Anchor { value, .. } => *value,
            NodeKind::Alias { .. } => match aliases.target(current) {
                Some(target) => target,
                None => return current,
            },
            _ => return current,
        };
    }
    current
}
