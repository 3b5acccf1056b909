use super::{Document, NodeId, NodeKind, YamlFile};
use crate::error::{Error, Result};

/// Name given to the single file produced by [`merge_files`].
pub const MERGED_FILE_NAME: &str = "merged_pipeline_yaml.yml";

/// Merges all documents of `files` into one single-document file.
///
/// The first document of the first file is the destination. Every other
/// document, including the remaining documents of the first file, has its
/// root mapping entries appended to the destination root mapping. Nodes
/// keep the name of the file they came from.
///
/// # Errors
///
/// Returns [`Error::Merge`] when a document root is not a mapping while the
/// destination is.
pub fn merge_files(files: Vec<YamlFile>) -> Result<YamlFile> {
    let mut merged = YamlFile {
        name: MERGED_FILE_NAME.to_string(),
        ..YamlFile::default()
    };
    let mut destination: Option<NodeId> = None;

    for file in files {
        let roots = append_arena(&mut merged, file);
        for (file_name, root) in roots {
            let Some(root) = root else {
                continue;
            };
            match destination {
                None => destination = Some(root),
                Some(dst) => merge_into(&mut merged, dst, root, &file_name)?,
            }
        }
    }

    merged.documents = vec![Document { root: destination }];
    Ok(merged)
}

/// Moves every node of `file` into `merged`, returning the relocated
/// document roots.
fn append_arena(merged: &mut YamlFile, file: YamlFile) -> Vec<(String, Option<NodeId>)> {
    let offset = merged.len();
    let source_offset = merged.sources.len();
    merged.sources.extend(file.sources.iter().cloned());

    let shift = |id: NodeId| NodeId(id.0 + offset);
    for mut node in file.nodes {
        node.source += source_offset;
        node.kind = match node.kind {
            NodeKind::Sequence {
                items,
                item_comments,
            } => NodeKind::Sequence {
                items: items.into_iter().map(shift).collect(),
                item_comments,
            },
            NodeKind::Mapping { entries } => NodeKind::Mapping {
                entries: entries.into_iter().map(shift).collect(),
            },
            NodeKind::MappingEntry {
                key,
                value,
                comment,
            } => NodeKind::MappingEntry {
                key: shift(key),
                value: shift(value),
                comment,
            },
            NodeKind::Tagged { tag, value } => NodeKind::Tagged {
                tag,
                value: shift(value),
            },
            NodeKind::Anchor { name, value } => NodeKind::Anchor {
                name,
                value: shift(value),
            },
            kind @ (NodeKind::Scalar { .. }
            | NodeKind::BlockScalar { .. }
            | NodeKind::Alias { .. }) => kind,
        };
        merged.push(node);
    }

    file.documents
        .into_iter()
        .map(|doc| (file.name.clone(), doc.root.map(shift)))
        .collect()
}

fn merge_into(merged: &mut YamlFile, dst: NodeId, src: NodeId, file_name: &str) -> Result<()> {
    let src_entries = match merged.kind(unwrap_anchor(merged, src)) {
        NodeKind::Mapping { entries } => entries.clone(),
        _ => {
            return Err(Error::Merge {
                file: file_name.to_string(),
                message: "document root is not a mapping".to_string(),
            })
        }
    };

    let dst = unwrap_anchor(merged, dst);
    match &mut merged.node_mut(dst).kind {
        NodeKind::Mapping { entries } => {
            entries.extend(src_entries);
            Ok(())
        }
        _ => Err(Error::Merge {
            file: file_name.to_string(),
            message: "destination document root is not a mapping".to_string(),
        }),
    }
}

fn unwrap_anchor(file: &YamlFile, id: NodeId) -> NodeId {
    match file.kind(id) {
        NodeKind::Anchor { value, .. } => unwrap_anchor(file, *value),
        _ => id,
    }
}
