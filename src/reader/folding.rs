//! Rebuilds shell source from folded (`>`) block scalars.
//!
//! YAML folds single line breaks of a `>` scalar into spaces, which glues
//! separate shell lines into one long command. Working from the body as
//! written, every line break the folder would remove is turned into an
//! explicit shell line continuation instead:
//!
//! ```text
//! script: >            becomes    docker build \
//!   docker build                    --pull \
//!   --pull                          .
//!   .
//! ```

const CONTINUATION: &str = " \\";

/// Reconstructs shell source from the raw body of a folded block scalar.
///
/// - Leading whitespace of every line is trimmed.
/// - Whitespace-only lines stay blank, without continuation.
/// - Every other line except the last gets a trailing ` \`, unless it is a
///   `#` comment, where a trailing backslash would swallow the next line.
///
/// A trailing line break of the input is kept.
pub fn fold_literal(raw: &str) -> String {
    let line_break = if raw.contains("\r\n") { "\r\n" } else { "\n" };
    let (body, trailing) = match raw.strip_suffix(line_break) {
        Some(body) => (body, line_break),
        None => (raw, ""),
    };
    if body.is_empty() {
        return raw.to_string();
    }

    let lines: Vec<&str> = body.split(line_break).collect();
    let last = lines.len() - 1;
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            out.push(String::new());
        } else if i == last || trimmed.starts_with('#') {
            out.push(trimmed.to_string());
        } else {
            out.push(format!("{trimmed}{CONTINUATION}"));
        }
    }

    let mut folded = out.join(line_break);
    folded.push_str(trailing);
    folded
}
