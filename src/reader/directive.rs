//! `# scriptcheck` comment directives.
//!
//! A comment whose text starts with `scriptcheck` configures the script it
//! is attached to:
//!
//! ```yaml
//! build:
//!   # scriptcheck shell=bash disable=SC2086,SC2046
//!   before_script:
//!     - echo $HOME
//! ```

use std::collections::BTreeMap;

use crate::yaml::CommentGroup;

/// Marker word introducing a directive comment.
pub const DIRECTIVE_MARKER: &str = "scriptcheck";

const SHELL_KEY: &str = "shell";
const DISABLE_KEY: &str = "disable";

/// Parsed `key[=value]` pairs of a directive comment.
///
/// A missing key means "not specified"; a key written without a value maps
/// to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    entries: BTreeMap<String, String>,
}

impl Directive {
    /// Parses directive text such as `scriptcheck shell=bash disable=SC2086`.
    /// The marker word is optional. The last write of a key wins.
    pub fn parse(text: &str) -> Self {
        let data = text.trim();
        let data = data.strip_prefix(DIRECTIVE_MARKER).unwrap_or(data);

        let entries = data
            .split(' ')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (part.to_string(), String::new()),
            })
            .collect();
        Directive { entries }
    }

    /// Reads the directive of the first comment starting with the marker.
    pub fn from_comment(comment: Option<&CommentGroup>) -> Option<Self> {
        comment?
            .iter()
            .map(|c| c.text.trim())
            .find(|text| text.starts_with(DIRECTIVE_MARKER))
            .map(Directive::parse)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Shell override, or `""` when none is given.
    pub fn shell(&self) -> &str {
        self.get(SHELL_KEY).unwrap_or_default()
    }

    /// Rule codes listed in `disable=`, in the order written.
    pub fn disabled_rules(&self) -> Vec<String> {
        self.get(DISABLE_KEY)
            .map(|rules| {
                rules
                    .split(',')
                    .map(str::trim)
                    .filter(|rule| !rule.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combines this directive with a more specific one.
    ///
    /// The specific `shell` wins when set; `disable` lists are unioned with
    /// duplicates removed. Other keys follow last-write-wins.
    pub fn merge(&self, specific: &Directive) -> Directive {
        let mut entries = self.entries.clone();
        for (key, value) in &specific.entries {
            if key == SHELL_KEY && value.is_empty() {
                continue;
            }
            entries.insert(key.clone(), value.clone());
        }

        if self.entries.contains_key(DISABLE_KEY) || specific.entries.contains_key(DISABLE_KEY) {
            let mut rules = self.disabled_rules();
            for rule in specific.disabled_rules() {
                if !rules.contains(&rule) {
                    rules.push(rule);
                }
            }
            entries.insert(DISABLE_KEY.to_string(), rules.join(","));
        }

        Directive { entries }
    }

    /// Merges an optional section directive with an optional element one.
    pub fn combine(section: Option<&Directive>, element: Option<&Directive>) -> Option<Directive> {
        match (section, element) {
            (Some(section), Some(element)) => Some(section.merge(element)),
            (Some(d), None) | (None, Some(d)) => Some(d.clone()),
            (None, None) => None,
        }
    }
}
