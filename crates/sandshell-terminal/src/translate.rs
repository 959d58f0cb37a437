//! Loose natural-language phrasing rewritten into command lines.
//!
//! A fixed, ordered table of patterns matched against the trimmed,
//! lowercased input. The first matching rule wins. This is a convenience layer only: a file name
//! that itself contains " to " will split a `move` phrase in the wrong place.

use std::sync::LazyLock;

use regex::Regex;

use crate::interpreter::quote;

/// One rewrite: a pattern and the command its capture groups feed.
struct RewriteRule {
    pattern: Regex,
    command: &'static str,
    /// Capture groups passed as arguments, each quoted as one word.
    groups: &'static [usize],
}

/// (pattern, command, capture groups), evaluated top to bottom.
const RULE_TABLE: &[(&str, &str, &[usize])] = &[
    (r"^create (?:a )?folder called (.+)$", "mkdir", &[1]),
    (r"^move (.+) to (.+)$", "mv", &[1, 2]),
    (r"^create file (.+)$", "touch", &[1]),
];

static RULES: LazyLock<Vec<RewriteRule>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .filter_map(|&(pattern, command, groups)| match Regex::new(pattern) {
            Ok(pattern) => Some(RewriteRule {
                pattern,
                command,
                groups,
            }),
            Err(e) => {
                log::error!("Invalid rewrite pattern {pattern:?}: {e}");
                None
            },
        })
        .collect()
});

/// Rewrite natural-language `input` into a command line.
///
/// Returns `None` when no rule matches; the caller then uses the input as
/// typed. A rewritten line is built from the lowercased input, so captured
/// names come out lowercase.
pub fn translate(input: &str) -> Option<String> {
    let lowered = input.trim().to_lowercase();
    RULES.iter().find_map(|rule| {
        let caps = rule.pattern.captures(&lowered)?;
        let mut line = rule.command.to_string();
        for &group in rule.groups {
            let text = caps.get(group).map_or("", |m| m.as_str());
            line.push(' ');
            line.push_str(&quote(text));
        }
        log::debug!("Rewrote {lowered:?} -> {line:?}");
        Some(line)
    })
}
