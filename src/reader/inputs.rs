//! Rewrites GitLab `$[[ inputs.name ]]` interpolation for shellcheck.
//!
//! Input tokens are substituted by GitLab before the script runs, so the
//! raw token is not valid shell. Inside single quotes the token becomes the
//! bare input name. Anywhere else it becomes `${NAME}`, which lets
//! shellcheck report the missing quoting an unquoted input would have.

use std::sync::LazyLock;

use regex::Regex;

static INPUT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\[\[\s*inputs\.([A-Za-z0-9_-]+)[^\]]*\]\]").unwrap()
});

/// Replaces every `$[[ inputs.* ]]` token of `script` in a single left to
/// right pass, so substituted text is never matched again.
pub fn replace_input_references(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    let mut last = 0;

    for caps in INPUT_TOKEN.captures_iter(script) {
        let (Some(token), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&script[last..token.start()]);
        if in_single_quotes(script, token.start()) {
            out.push_str(name.as_str());
        } else {
            out.push_str("${");
            out.push_str(&env_name(name.as_str()));
            out.push('}');
        }
        last = token.end();
    }

    out.push_str(&script[last..]);
    out
}

/// Upper-cased input name with every character that is not valid in a
/// shell variable name replaced by `_`.
fn env_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Whether byte offset `pos` lies inside a single-quoted shell string.
///
/// Quote state is tracked from the start of the script, so a quoted string
/// may span lines. Quotes inside `#` comments are ignored.
fn in_single_quotes(script: &str, pos: usize) -> bool {
    let mut in_single = false;
    let mut in_double = false;
    let mut in_comment = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for c in script[..pos].chars() {
        if in_comment {
            in_comment = c != '\n';
        } else if escaped {
            escaped = false;
        } else {
            match c {
                '\\' if !in_single => escaped = true,
                '\'' if !in_double => in_single = !in_single,
                '"' if !in_single => in_double = !in_double,
                '#' if !in_single && !in_double && prev.map_or(true, char::is_whitespace) => {
                    in_comment = true
                }
                _ => {}
            }
        }
        prev = Some(c);
    }
    in_single
}
