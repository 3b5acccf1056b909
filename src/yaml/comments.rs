use std::collections::{BTreeMap, HashSet};

/// A single `#` comment. `text` is everything after the `#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub line: usize,
    pub text: String,
}

/// Comments attached to one node, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentGroup {
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter()
    }
}

#[derive(Debug, Clone)]
struct LineComment {
    comment: Comment,
    /// Nothing but whitespace precedes the `#`.
    own_line: bool,
}

/// All comments of a source file, indexed by 1-based line.
#[derive(Debug, Default)]
pub(crate) struct SourceComments {
    by_line: BTreeMap<usize, LineComment>,
}

impl SourceComments {
    /// Scans `source` for comments, skipping `content_lines` (block scalar
    /// bodies and quoted continuation lines, where `#` is data).
    pub(crate) fn scan(source: &str, content_lines: &HashSet<usize>) -> Self {
        let mut by_line = BTreeMap::new();
        for (idx, line) in source.lines().enumerate() {
            let line_no = idx + 1;
            if content_lines.contains(&line_no) {
                continue;
            }
            if let Some(start) = comment_start(line) {
                by_line.insert(
                    line_no,
                    LineComment {
                        comment: Comment {
                            line: line_no,
                            text: line[start + 1..].to_string(),
                        },
                        own_line: line[..start].trim().is_empty(),
                    },
                );
            }
        }
        SourceComments { by_line }
    }

    /// Contiguous comment-only lines directly above `line` plus, when
    /// `trailing` is set, the comment at the end of `line` itself.
    pub(crate) fn group_for(&self, line: usize, trailing: bool) -> Option<CommentGroup> {
        let mut comments = Vec::new();
        let mut current = line;
        while current > 1 {
            current -= 1;
            match self.by_line.get(&current) {
                Some(c) if c.own_line => comments.push(c.comment.clone()),
                _ => break,
            }
        }
        comments.reverse();

        if trailing {
            if let Some(c) = self.by_line.get(&line).filter(|c| !c.own_line) {
                comments.push(c.comment.clone());
            }
        }

        if comments.is_empty() {
            None
        } else {
            Some(CommentGroup { comments })
        }
    }
}

/// Byte offset of the `#` starting a comment on `line`, if any.
///
/// A `#` starts a comment at the beginning of the line or after whitespace,
/// outside single- and double-quoted scalars. Quotes only open a scalar
/// where a scalar can start, so apostrophes inside plain text are ignored.
pub(crate) fn comment_start(line: &str) -> Option<usize> {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for (i, c) in line.char_indices() {
        if in_double {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_double = false;
            }
        } else if in_single {
            if c == '\'' {
                in_single = false;
            }
        } else {
            let at_token_start = prev.map_or(true, |p| {
                p.is_whitespace() || matches!(p, ':' | '-' | '[' | '{' | ',')
            });
            match c {
                '#' if prev.map_or(true, char::is_whitespace) => return Some(i),
                '\'' if at_token_start => in_single = true,
                '"' if at_token_start => in_double = true,
                _ => {}
            }
        }
        prev = Some(c);
    }
    None
}
