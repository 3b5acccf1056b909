use std::collections::HashMap;

use serde_sarif::sarif::{
    ArtifactLocation, Location, LogicalLocation, Message, MultiformatMessageString,
    PhysicalLocation, Region, ReportingDescriptor, Result as SarifResult, ResultLevel, Run, Sarif,
    Tool, ToolComponent,
};

use crate::report::{CheckReport, Level, ScriptCheckReport};

pub fn format(report: &CheckReport) -> String {
    let mut rule_map: HashMap<&str, &ScriptCheckReport> = HashMap::new();
    for r in &report.reports {
        rule_map.entry(r.reason.as_str()).or_insert(r);
    }

    let mut rule_ids: Vec<&str> = rule_map.keys().copied().collect();
    rule_ids.sort();

    let rule_index: HashMap<&str, i64> = rule_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as i64))
        .collect();

    let rules: Vec<ReportingDescriptor> = rule_ids
        .iter()
        .map(|id| {
            let r = rule_map[id];
            let mut rule = ReportingDescriptor::builder().id(id.to_string()).build();
            rule.short_description = Some(
                MultiformatMessageString::builder()
                    .text(r.message.clone())
                    .build(),
            );
            rule.help = Some(
                MultiformatMessageString::builder()
                    .text(format!("See {}", wiki_url(id)))
                    .build(),
            );
            rule
        })
        .collect();

    let results: Vec<SarifResult> = report
        .reports
        .iter()
        .map(|r| {
            let level = match r.level {
                Level::Error => ResultLevel::Error,
                Level::Warning => ResultLevel::Warning,
                Level::Info | Level::Style => ResultLevel::Note,
            };

            let mut result = SarifResult::builder()
                .message(Message::builder().text(r.message.clone()).build())
                .build();

            result.rule_id = Some(r.reason.clone());
            result.level = Some(level);
            result.rule_index = rule_index.get(r.reason.as_str()).copied();

            let mut region = Region::builder().start_line(r.line as i64).build();
            if r.column > 0 {
                region.start_column = Some(r.column as i64);
            }
            if r.end_column > 0 {
                region.end_column = Some(r.end_column as i64);
            }

            let mut physical = PhysicalLocation::builder().build();
            physical.artifact_location = Some(
                ArtifactLocation::builder()
                    .uri(r.file.replace('\\', "/"))
                    .build(),
            );
            physical.region = Some(region);

            let mut location = Location::builder().build();
            location.physical_location = Some(physical);
            location.logical_locations = Some(vec![LogicalLocation::builder()
                .fully_qualified_name(r.path.clone())
                .build()]);
            result.locations = Some(vec![location]);

            result
        })
        .collect();

    let driver = ToolComponent::builder()
        .name("scriptcheck")
        .version(env!("CARGO_PKG_VERSION").to_string())
        .rules(rules)
        .build();

    let tool = Tool::builder().driver(driver).build();

    let run = Run::builder().tool(tool).results(results).build();

    let sarif = Sarif::builder().version("2.1.0").runs(vec![run]).build();

    serde_json::to_string_pretty(&sarif).expect("SARIF serialization failed")
}

/// ShellCheck wiki page of a rule.
pub fn wiki_url(reason: &str) -> String {
    format!("https://www.shellcheck.net/wiki/{reason}")
}
