//! GitLab CI pipelines.
//!
//! Jobs are the top-level mapping entries whose value is a mapping. Jobs
//! whose name starts with `.` are templates: they are never extracted but
//! stay reachable through anchors, merge keys and `!reference` tags.
//! A file with a `spec:` header keeps the pipeline in its second document.

use super::anchors::AliasTargetMap;
use super::inputs::replace_input_references;
use super::reference::unwrap;
use super::resolve::Resolver;
use super::{entry_blocks, BlockNames, ExtractError, ScriptBlock, ScriptReader};
use crate::yaml::{NodeId, NodeKind, YamlFile};

/// Job keys holding shell source.
pub const SECTIONS: [&str; 3] = ["before_script", "script", "after_script"];

/// Name prefix of hidden template jobs.
pub const HIDDEN_JOB_MARKER: &str = ".";

const MERGE_KEY: &str = "<<";

#[derive(Debug, Clone, Copy, Default)]
pub struct GitlabReader;

impl ScriptReader for GitlabReader {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    fn effective_document(&self, file: &YamlFile) -> Option<usize> {
        match file.documents.len() {
            0 => None,
            1 => Some(0),
            _ => Some(1),
        }
    }

    fn transform(&self, script: &str) -> String {
        replace_input_references(script)
    }

    fn read_scripts(
        &self,
        file: &YamlFile,
        default_shell: &str,
        names: &mut BlockNames,
    ) -> Result<Vec<ScriptBlock>, ExtractError> {
        let Some(root) = self
            .effective_document(file)
            .and_then(|i| file.documents[i].root)
        else {
            return Ok(Vec::new());
        };

        let aliases = AliasTargetMap::build(file, root)?;
        let resolver = Resolver::new(file, root, &aliases);
        let Some(jobs) = resolver.mapping_entries(root) else {
            return Ok(Vec::new());
        };

        let mut blocks = Vec::new();
        for &job_entry in jobs {
            let NodeKind::MappingEntry { value, .. } = file.kind(job_entry) else {
                continue;
            };
            let Some(job) = file.entry_key(job_entry) else {
                continue;
            };
            if job.starts_with(HIDDEN_JOB_MARKER) || job == MERGE_KEY {
                continue;
            }
            let Some(entries) = resolver.mapping_entries(*value) else {
                continue;
            };

            for (index, section_entry) in job_sections(&resolver, entries).into_iter().enumerate() {
                let Some(section) = file.entry_key(section_entry) else {
                    continue;
                };
                let base = format!("{job}_{section}");
                blocks.extend(entry_blocks(
                    self,
                    &resolver,
                    section_entry,
                    &base,
                    index,
                    default_shell,
                    names,
                )?);
            }
        }
        Ok(blocks)
    }
}

/// Script section entries of a job: its own, followed by those pulled in
/// through `<<` merge keys that the job does not define itself.
fn job_sections(resolver: &Resolver<'_>, entries: &[NodeId]) -> Vec<NodeId> {
    let file = resolver.file();
    let mut sections: Vec<NodeId> = entries
        .iter()
        .copied()
        .filter(|entry| is_section(file, *entry))
        .collect();

    for &entry in entries {
        if file.entry_key(entry) != Some(MERGE_KEY) {
            continue;
        }
        let NodeKind::MappingEntry { value, .. } = file.kind(entry) else {
            continue;
        };
        for source in merge_sources(resolver, *value) {
            let Some(inherited) = resolver.mapping_entries(source) else {
                continue;
            };
            for &candidate in inherited {
                if !is_section(file, candidate) {
                    continue;
                }
                let key = file.entry_key(candidate);
                if sections.iter().all(|s| file.entry_key(*s) != key) {
                    sections.push(candidate);
                }
            }
        }
    }
    sections
}

/// `<<: *a` names one mapping, `<<: [*a, *b]` several.
fn merge_sources(resolver: &Resolver<'_>, value: NodeId) -> Vec<NodeId> {
    let file = resolver.file();
    let value = unwrap(file, resolver.aliases(), value);
    match file.kind(value) {
        NodeKind::Sequence { items, .. } => items.clone(),
        _ => vec![value],
    }
}

fn is_section(file: &YamlFile, entry: NodeId) -> bool {
    file.entry_key(entry)
        .is_some_and(|key| SECTIONS.contains(&key))
}
