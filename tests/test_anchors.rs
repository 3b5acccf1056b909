use scriptcheck::reader::anchors::AliasTargetMap;
use scriptcheck::reader::reference::{reference_path, resolve_path, resolve_reference};
use scriptcheck::reader::ExtractError;
use scriptcheck::yaml::{self, NodeId, NodeKind, YamlFile};

fn parse(content: &str) -> (YamlFile, NodeId) {
    let file = yaml::parse_file("ci.yml", content).unwrap();
    let root = file.documents[0].root.unwrap();
    (file, root)
}

fn value_of(file: &YamlFile, mapping: NodeId, key: &str) -> NodeId {
    let NodeKind::Mapping { entries } = file.kind(mapping) else {
        panic!("not a mapping");
    };
    entries
        .iter()
        .find_map(|e| match file.kind(*e) {
            NodeKind::MappingEntry { value, .. } if file.entry_key(*e) == Some(key) => {
                Some(*value)
            }
            _ => None,
        })
        .unwrap()
}

// ── alias map ─────────────────────────────────────────────────────────────────

#[test]
fn every_alias_is_bound_to_its_anchor_value() {
    let (file, root) = parse("a: &x hello\nb: *x\nc: [*x, *x]\n");
    let map = AliasTargetMap::build(&file, root).unwrap();
    assert_eq!(map.len(), 3);

    let alias = value_of(&file, root, "b");
    let target = map.target(alias).unwrap();
    assert_eq!(file.scalar_text(target), Some("hello"));
}

#[test]
fn redefined_anchor_binds_by_occurrence() {
    let (file, root) = parse("a: &x first\nb: *x\nc: &x second\nd: *x\n");
    let map = AliasTargetMap::build(&file, root).unwrap();

    let b = map.target(value_of(&file, root, "b")).unwrap();
    let d = map.target(value_of(&file, root, "d")).unwrap();
    assert_eq!(file.scalar_text(b), Some("first"));
    assert_eq!(file.scalar_text(d), Some("second"));
}

#[test]
fn document_without_aliases_has_empty_map() {
    let (file, root) = parse("a: &x hello\nb: world\n");
    assert!(AliasTargetMap::build(&file, root).unwrap().is_empty());
}

#[test]
fn alias_outside_the_walked_tree_is_unresolved() {
    let (file, root) = parse("a: &x hello\nb: *x\n");
    let alias = value_of(&file, root, "b");

    let err = AliasTargetMap::build(&file, alias).unwrap_err();
    assert_eq!(
        err,
        ExtractError::UnresolvedAlias {
            anchor: "x".to_string(),
            line: 2,
        }
    );
    assert!(err.to_string().contains("'x'"));
}

// ── references ────────────────────────────────────────────────────────────────

#[test]
fn reference_path_reads_segments() {
    let (file, root) = parse("job:\n  script: !reference [.tpl, script]\n");
    let job = value_of(&file, root, "job");
    let reference = value_of(&file, job, "script");

    assert_eq!(
        reference_path(&file, reference),
        Some(vec![".tpl".to_string(), "script".to_string()])
    );
}

#[test]
fn other_tags_are_not_references() {
    let (file, root) = parse("job:\n  script: !custom [a, b]\n");
    let job = value_of(&file, root, "job");
    assert_eq!(reference_path(&file, value_of(&file, job, "script")), None);
}

#[test]
fn resolve_path_descends_through_anchors_and_aliases() {
    let (file, root) = parse(".base: &base\n  script: echo base\n.alias: *base\n");
    let map = AliasTargetMap::build(&file, root).unwrap();

    let segments = vec![".alias".to_string(), "script".to_string()];
    let target = resolve_path(&file, root, &map, &segments).unwrap();
    assert_eq!(file.scalar_text(target), Some("echo base"));
}

#[test]
fn resolve_path_missing_segment_is_none() {
    let (file, root) = parse(".tpl:\n  script: echo\n");
    let map = AliasTargetMap::build(&file, root).unwrap();

    let segments = vec![".tpl".to_string(), "after_script".to_string()];
    assert_eq!(resolve_path(&file, root, &map, &segments), None);

    let too_deep = vec![".tpl".to_string(), "script".to_string(), "x".to_string()];
    assert_eq!(resolve_path(&file, root, &map, &too_deep), None);
}

#[test]
fn resolve_reference_finds_target_node() {
    let (file, root) =
        parse(".tpl:\n  script:\n    - echo a\njob:\n  script: !reference [.tpl, script]\n");
    let map = AliasTargetMap::build(&file, root).unwrap();
    let job = value_of(&file, root, "job");
    let reference = value_of(&file, job, "script");

    let target = resolve_reference(&file, root, &map, reference).unwrap();
    assert!(matches!(file.kind(target), NodeKind::Sequence { .. }));
    assert_eq!(file.node(target).path, "$.'.tpl'.script");
}
