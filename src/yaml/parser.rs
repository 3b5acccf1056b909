//! Builds the node arena from `saphyr-parser` events.
//!
//! The event stream carries values, styles and spans but not anchor names,
//! tag text, block scalar bodies or comments. Those are recovered from the
//! source text around each event span.

use std::collections::{HashMap, HashSet};

use saphyr_parser::{Event, Parser, ScalarStyle as EventStyle, ScanError, Span};

use super::comments::{comment_start, SourceComments};
use super::{Document, Node, NodeId, NodeKind, Position, ScalarStyle, YamlFile};
use crate::error::{Error, Result};
use crate::reader::ExtractError;

/// Stands in for the `*` of an alias whose anchor the stream does not
/// define, turning the alias into a plain scalar of the same length.
const ALIAS_PLACEHOLDER: &str = "_";

/// Parses `content` into a [`YamlFile`] named `name`.
///
/// # Errors
///
/// [`Error::Extract`] with [`ExtractError::UnresolvedAlias`] for an alias
/// naming an anchor not defined earlier in the stream, and [`Error::Parse`]
/// when the content is not valid YAML.
pub fn parse_file(name: &str, content: &str) -> Result<YamlFile> {
    parse(name, content, false)
}

/// Parses one of several files that are merged before extraction.
///
/// Aliases whose anchor is not defined in `content` are kept as
/// [`NodeKind::Alias`] nodes, so they can bind to anchors of the other
/// files once the trees are merged.
///
/// # Errors
///
/// [`Error::Parse`] when the content is not valid YAML.
pub fn parse_fragment(name: &str, content: &str) -> Result<YamlFile> {
    parse(name, content, true)
}

fn parse(name: &str, content: &str, keep_unknown_aliases: bool) -> Result<YamlFile> {
    let parse_error = |message: String| Error::Parse {
        file: name.to_string(),
        message,
    };

    let mut source = content.to_string();
    let mut unknown_aliases = HashMap::new();
    while let Err(e) = scan(&source) {
        let Some((star, anchor)) = unknown_alias(&source, &e) else {
            return Err(parse_error(e.to_string()));
        };
        if !keep_unknown_aliases {
            return Err(Error::Extract {
                file: name.to_string(),
                source: ExtractError::UnresolvedAlias {
                    anchor,
                    line: e.marker().line(),
                },
            });
        }
        source.replace_range(star..star + 1, ALIAS_PLACEHOLDER);
        unknown_aliases.insert(star, anchor);
    }

    let events = collect_events(&source).map_err(|e| parse_error(e.to_string()))?;
    let mut builder = TreeBuilder::new(name, &source, &events, unknown_aliases);
    let documents = builder.build_documents().map_err(parse_error)?;
    builder.attach_comments();

    let mut file = builder.file;
    file.documents = documents;
    Ok(file)
}

fn scan(content: &str) -> Result<(), ScanError> {
    Parser::new_from_str(content).try_for_each(|result| result.map(drop))
}

fn collect_events(content: &str) -> Result<Vec<(Event<'_>, Span)>, ScanError> {
    Parser::new_from_str(content).collect()
}

/// Locates the alias behind an unknown-anchor error: the byte offset of
/// its `*` and the anchor name.
fn unknown_alias(source: &str, error: &ScanError) -> Option<(usize, String)> {
    if !error.to_string().contains("unknown anchor") {
        return None;
    }
    let at = source
        .char_indices()
        .nth(error.marker().index())
        .map_or(source.len(), |(byte, _)| byte);
    alias_at(source, at)
}

/// Finds the alias at or next to byte offset `at` on the same line.
fn alias_at(source: &str, at: usize) -> Option<(usize, String)> {
    let at = at.min(source.len());
    let line_start = source[..at].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[at..].find('\n').map_or(source.len(), |i| at + i);

    let star = if source[at..].starts_with('*') {
        at
    } else {
        source[line_start..at]
            .rfind('*')
            .map(|i| line_start + i)
            .or_else(|| source[at..line_end].find('*').map(|i| at + i))?
    };
    let name: String = source[star + 1..]
        .chars()
        .take_while(|c| is_anchor_char(*c))
        .collect();
    (!name.is_empty()).then_some((star, name))
}

struct TreeBuilder<'a> {
    source: &'a str,
    source_lines: Vec<&'a str>,
    char_to_byte: Vec<usize>,
    events: &'a [(Event<'a>, Span)],
    pos: usize,
    /// Byte offset where the previously consumed event ended. Node
    /// properties (`&anchor`, `!tag`) sit between it and the next node.
    prev_end: usize,
    file: YamlFile,
    /// Lines holding scalar content rather than YAML structure.
    content_lines: HashSet<usize>,
    entry_lines: Vec<(NodeId, usize)>,
    sequence_lines: Vec<(NodeId, Vec<usize>)>,
    /// Placeholder scalars by byte offset, with the anchor they name.
    unknown_aliases: HashMap<usize, String>,
}

impl<'a> TreeBuilder<'a> {
    fn new(
        name: &str,
        source: &'a str,
        events: &'a [(Event<'a>, Span)],
        unknown_aliases: HashMap<usize, String>,
    ) -> Self {
        let mut char_to_byte: Vec<usize> = source.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(source.len());
        TreeBuilder {
            source,
            source_lines: source.lines().collect(),
            char_to_byte,
            events,
            pos: 0,
            prev_end: 0,
            file: YamlFile {
                name: name.to_string(),
                sources: vec![name.to_string()],
                ..YamlFile::default()
            },
            content_lines: HashSet::new(),
            entry_lines: Vec::new(),
            sequence_lines: Vec::new(),
            unknown_aliases,
        }
    }

    fn to_byte(&self, char_idx: usize) -> usize {
        self.char_to_byte
            .get(char_idx)
            .copied()
            .unwrap_or(self.source.len())
    }

    fn line(&self, line: usize) -> Option<&'a str> {
        line.checked_sub(1)
            .and_then(|idx| self.source_lines.get(idx))
            .copied()
    }

    fn peek(&self) -> Option<&'a (Event<'a>, Span)> {
        let events = self.events;
        events.get(self.pos)
    }

    fn next_event(&mut self) -> Option<&'a (Event<'a>, Span)> {
        let events = self.events;
        let item = events.get(self.pos)?;
        self.pos += 1;
        self.prev_end = self.prev_end.max(self.to_byte(item.1.end.index()));
        Some(item)
    }

    fn build_documents(&mut self) -> Result<Vec<Document>, String> {
        let mut documents = Vec::new();
        while let Some((event, _)) = self.next_event() {
            match event {
                Event::StreamEnd => break,
                Event::DocumentStart(..) => {
                    let root = match self.peek() {
                        Some((Event::DocumentEnd, _)) | Some((Event::StreamEnd, _)) | None => None,
                        Some(_) => Some(self.build_node("$")?),
                    };
                    documents.push(Document { root });
                }
                _ => {}
            }
        }
        Ok(documents)
    }

    fn build_node(&mut self, path: &str) -> Result<NodeId, String> {
        let Some((event, span)) = self.peek() else {
            return Err("unexpected end of event stream".to_string());
        };
        let start = self.to_byte(span.start.index());
        let from = self.prev_end;
        let position = Position {
            line: span.start.line(),
            column: span.start.col() + 1,
        };

        let (inner, anchored, tagged) = match event {
            Event::Alias(_) => {
                self.next_event();
                let name = self.alias_name(span);
                return Ok(self.push(NodeKind::Alias { name }, position, path));
            }
            Event::Scalar(..) if self.unknown_aliases.contains_key(&start) => {
                self.next_event();
                let name = self.unknown_aliases.get(&start).cloned().unwrap_or_default();
                return Ok(self.push(NodeKind::Alias { name }, position, path));
            }
            Event::Scalar(value, style, anchor_id, tag) => {
                self.next_event();
                let (kind, position) = self.scalar(value.to_string(), *style, span, position);
                (self.push(kind, position, path), *anchor_id > 0, tag.is_some())
            }
            Event::SequenceStart(anchor_id, tag) => {
                self.next_event();
                (self.build_sequence(path, position)?, *anchor_id > 0, tag.is_some())
            }
            Event::MappingStart(anchor_id, tag) => {
                self.next_event();
                (self.build_mapping(path, position)?, *anchor_id > 0, tag.is_some())
            }
            _ => return Err(format!("unexpected event at line {}", position.line)),
        };

        let (anchor, tag) = self.properties(from, start, anchored, tagged);
        let mut id = inner;
        if let Some(tag) = tag {
            id = self.push(NodeKind::Tagged { tag, value: id }, position, path);
        }
        if let Some(name) = anchor {
            id = self.push(NodeKind::Anchor { name, value: id }, position, path);
        }
        Ok(id)
    }

    fn build_sequence(&mut self, path: &str, position: Position) -> Result<NodeId, String> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some((Event::SequenceEnd, _)) => {
                    self.next_event();
                    break;
                }
                Some(_) => {
                    let item_path = format!("{path}[{}]", items.len());
                    items.push(self.build_node(&item_path)?);
                }
                None => return Err("unterminated sequence".to_string()),
            }
        }

        let lines = items
            .iter()
            .map(|item| self.file.node(*item).position.line)
            .collect();
        let id = self.push(
            NodeKind::Sequence {
                item_comments: vec![None; items.len()],
                items,
            },
            position,
            path,
        );
        self.sequence_lines.push((id, lines));
        Ok(id)
    }

    fn build_mapping(&mut self, path: &str, position: Position) -> Result<NodeId, String> {
        let mut entries = Vec::new();
        loop {
            match self.peek() {
                Some((Event::MappingEnd, _)) => {
                    self.next_event();
                    break;
                }
                Some(_) => {
                    let key = self.build_node(path)?;
                    let key_text = self.file.scalar_text(key).unwrap_or_default().to_string();
                    let value_path = child_path(path, &key_text);
                    let value = self.build_node(&value_path)?;

                    let key_position = self.file.node(key).position;
                    let entry = self.push(
                        NodeKind::MappingEntry {
                            key,
                            value,
                            comment: None,
                        },
                        key_position,
                        &value_path,
                    );
                    self.entry_lines.push((entry, key_position.line));
                    entries.push(entry);
                }
                None => return Err("unterminated mapping".to_string()),
            }
        }
        Ok(self.push(NodeKind::Mapping { entries }, position, path))
    }

    fn scalar(
        &mut self,
        value: String,
        style: EventStyle,
        span: &Span,
        position: Position,
    ) -> (NodeKind, Position) {
        match style {
            EventStyle::Literal | EventStyle::Folded => {
                let folded = matches!(style, EventStyle::Folded);
                let (indicator_line, raw) = self.block_body(span, if folded { '>' } else { '|' });
                let position = Position {
                    line: indicator_line,
                    ..position
                };
                (NodeKind::BlockScalar { folded, value, raw }, position)
            }
            EventStyle::SingleQuoted | EventStyle::DoubleQuoted => {
                self.content_lines
                    .extend(span.start.line() + 1..=span.end.line());
                let style = if matches!(style, EventStyle::SingleQuoted) {
                    ScalarStyle::SingleQuoted
                } else {
                    ScalarStyle::DoubleQuoted
                };
                (NodeKind::Scalar { value, style }, position)
            }
            _ => (
                NodeKind::Scalar {
                    value,
                    style: ScalarStyle::Plain,
                },
                position,
            ),
        }
    }

    /// Finds the indicator line of a block scalar and returns it with the
    /// body as written, block indentation removed.
    fn block_body(&mut self, span: &Span, indicator: char) -> (usize, String) {
        let start_line = span.start.line().max(1);
        let indicator_line = (0..4)
            .filter_map(|back| start_line.checked_sub(back).filter(|l| *l >= 1))
            .find(|l| {
                self.line(*l)
                    .is_some_and(|text| has_block_indicator(text, indicator))
            })
            .unwrap_or(start_line);
        let header_indent = self.line(indicator_line).map_or(0, indent_of);

        let mut body: Vec<&str> = Vec::new();
        let mut body_indent: Option<usize> = None;
        let mut last_content = 0;
        let mut line_no = indicator_line + 1;
        while let Some(text) = self.line(line_no) {
            if text.trim().is_empty() {
                body.push("");
                line_no += 1;
                continue;
            }
            let indent = indent_of(text);
            if indent <= header_indent {
                break;
            }
            let required = *body_indent.get_or_insert(indent);
            if indent < required {
                break;
            }
            body.push(&text[required..]);
            last_content = body.len();
            line_no += 1;
        }
        body.truncate(last_content);

        self.content_lines
            .extend(indicator_line + 1..=indicator_line + body.len());

        let mut raw = body.join("\n");
        if !raw.is_empty() {
            raw.push('\n');
        }
        (indicator_line, raw)
    }

    /// Recovers `&anchor` and `!tag` written between two byte offsets.
    fn properties(
        &self,
        from: usize,
        to: usize,
        anchored: bool,
        tagged: bool,
    ) -> (Option<String>, Option<String>) {
        if !anchored && !tagged {
            return (None, None);
        }

        let region = if from < to {
            self.source.get(from..to).unwrap_or_default()
        } else {
            ""
        };

        let mut anchor = None;
        let mut tag = None;
        for line in region.lines() {
            let code = comment_start(line).map_or(line, |i| &line[..i]);
            for token in code.split(|c: char| c.is_whitespace() || matches!(c, ',' | '[' | '{')) {
                if anchored {
                    if let Some(name) = token.strip_prefix('&').filter(|n| !n.is_empty()) {
                        anchor = Some(name.to_string());
                    }
                }
                if tagged && token.starts_with('!') {
                    tag = Some(token.to_string());
                }
            }
        }
        (anchor, tag)
    }

    fn alias_name(&self, span: &Span) -> String {
        let start = self.to_byte(span.start.index());
        alias_at(self.source, start)
            .map(|(_, name)| name)
            .unwrap_or_default()
    }

    fn push(&mut self, kind: NodeKind, position: Position, path: &str) -> NodeId {
        self.file.push(Node {
            kind,
            position,
            path: path.to_string(),
            source: 0,
        })
    }

    fn attach_comments(&mut self) {
        let comments = SourceComments::scan(self.source, &self.content_lines);

        for (entry, line) in std::mem::take(&mut self.entry_lines) {
            if let NodeKind::MappingEntry { comment, .. } = &mut self.file.node_mut(entry).kind {
                *comment = comments.group_for(line, true);
            }
        }

        for (sequence, lines) in std::mem::take(&mut self.sequence_lines) {
            if let NodeKind::Sequence { item_comments, .. } = &mut self.file.node_mut(sequence).kind
            {
                *item_comments = lines
                    .iter()
                    .map(|line| comments.group_for(*line, true))
                    .collect();
            }
        }
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
    {
        format!("{parent}.{key}")
    } else {
        format!("{parent}.'{key}'")
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_anchor_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '[' | ']' | '{' | '}')
}

/// Whether `line` ends with a block scalar header such as `|`, `>-` or `|2`.
fn has_block_indicator(line: &str, indicator: char) -> bool {
    let code = comment_start(line).map_or(line, |i| &line[..i]).trim_end();
    let Some(pos) = code.rfind(indicator) else {
        return false;
    };
    let modifiers = &code[pos + indicator.len_utf8()..];
    modifiers
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-')
        && code[..pos]
            .chars()
            .last()
            .map_or(true, |c| c.is_whitespace() || c == ':' || c == '-')
}
