//! Text helpers shared by the free-text graders.
//!
//! - [`normalize`] canonicalizes an answer for comparison.
//! - [`expand_optional`] turns `"(fast) food"` into every literal variant.
//! - [`within_word_limit`] enforces per-blank word budgets.

use std::collections::BTreeSet;

/// Upper bound on parenthesized groups expanded combinatorially.
///
/// Groups past this limit are kept as literal text so a malformed reference
/// answer cannot blow up into millions of variants.
pub const MAX_OPTIONAL_GROUPS: usize = 16;

/// Trim surrounding whitespace and, unless `case_sensitive`, lower-case.
pub fn normalize(text: &str, case_sensitive: bool) -> String {
    let trimmed = text.trim();
    if case_sensitive {
        trimmed.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

/// A parenthesized optional segment located inside a reference answer.
#[derive(Debug, Clone, Copy)]
struct OptionalGroup {
    /// Byte offset of the opening `(`.
    start: usize,
    /// Byte offset one past the closing `)`.
    end: usize,
}

impl OptionalGroup {
    fn inner<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start + 1..self.end - 1]
    }
}

/// Locate non-nested `( ... )` groups, pairing each `(` with the next `)`.
fn find_groups(text: &str) -> Vec<OptionalGroup> {
    let mut groups = Vec::new();
    let mut cursor = 0;

    while let Some(open) = text[cursor..].find('(') {
        let start = cursor + open;
        let Some(close) = text[start + 1..].find(')') else {
            break;
        };
        let end = start + 1 + close + 1;
        groups.push(OptionalGroup { start, end });
        cursor = end;
    }

    groups
}

/// Expand every parenthesized optional segment into all literal variants.
///
/// For N groups this yields up to 2^N strings, one per include/exclude
/// choice, each with internal whitespace collapsed and ends trimmed. A
/// reference without groups comes back unchanged as a singleton.
pub fn expand_optional(reference: &str) -> BTreeSet<String> {
    let mut groups = find_groups(reference);

    if groups.is_empty() {
        return BTreeSet::from([reference.to_string()]);
    }

    if groups.len() > MAX_OPTIONAL_GROUPS {
        tracing::warn!(
            groups = groups.len(),
            "reference answer has too many optional groups, keeping the rest literal"
        );
        groups.truncate(MAX_OPTIONAL_GROUPS);
    }

    let mut variants = BTreeSet::new();
    for mask in 0u32..(1u32 << groups.len()) {
        let mut built = String::with_capacity(reference.len());
        let mut last = 0;

        for (bit, group) in groups.iter().enumerate() {
            built.push_str(&reference[last..group.start]);
            if mask & (1 << bit) != 0 {
                built.push_str(group.inner(reference));
            }
            last = group.end;
        }
        built.push_str(&reference[last..]);

        variants.insert(collapse_whitespace(&built));
    }

    variants
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Whether `text` fits in `max_words` words. Blank text always fits.
pub fn within_word_limit(text: &str, max_words: usize) -> bool {
    text.trim().is_empty() || word_count(text) <= max_words
}

/// Build the set of normalized strings a free-text answer may match.
///
/// Each reference is expanded for optional words, then normalized. Blank
/// references are skipped so a missing answer key never accepts an empty
/// submission.
pub fn acceptable_set<'a, I>(references: I, case_sensitive: bool) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    references
        .into_iter()
        .filter(|r| !r.trim().is_empty())
        .flat_map(expand_optional)
        .map(|variant| normalize(&variant, case_sensitive))
        .collect()
}
