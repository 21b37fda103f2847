//! Alias keyword matching: counts how often each catalog skill's aliases occur in a text

use crate::error::{Result, SkillGapError};
use crate::processing::catalog::SkillCatalog;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Occurrence count per skill. Skills that never occur are absent, never zero.
pub type KeywordCounts = BTreeMap<String, usize>;

/// Separator class accepted between alias tokens
const SEPARATOR_CLASS: &str = r"[\s_\-]+";

/// Compiled alias patterns for every skill in a catalog
pub struct AliasMatcher {
    skills: Vec<SkillPatterns>,
}

struct SkillPatterns {
    skill: String,
    aliases: Vec<AliasPattern>,
}

struct AliasPattern {
    alias: String,
    regex: Regex,
}

/// Occurrences of one alias of a skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub skill: String,
    pub alias: String,
    pub count: usize,
}

impl AliasMatcher {
    pub fn new(catalog: &SkillCatalog) -> Result<Self> {
        let skills = catalog
            .skills()
            .iter()
            .map(|skill| {
                let aliases = skill
                    .aliases
                    .iter()
                    .map(|alias| {
                        Ok(AliasPattern {
                            alias: alias.clone(),
                            regex: compile_alias(alias)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(SkillPatterns {
                    skill: skill.name.clone(),
                    aliases,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { skills })
    }

    /// Total alias occurrences per skill
    pub fn count(&self, text: &str) -> KeywordCounts {
        let mut counts = KeywordCounts::new();
        if text.is_empty() {
            return counts;
        }

        for skill in &self.skills {
            let hits: usize = skill
                .aliases
                .iter()
                .map(|pattern| bounded_matches(&pattern.regex, text).count())
                .sum();
            if hits > 0 {
                counts.insert(skill.skill.clone(), hits);
            }
        }

        counts
    }

    /// Per-alias occurrence counts, in catalog order, for reporting which phrases were found
    pub fn find_matches(&self, text: &str) -> Vec<KeywordMatch> {
        let mut matches = Vec::new();

        for skill in &self.skills {
            for pattern in &skill.aliases {
                let count = bounded_matches(&pattern.regex, text).count();
                if count > 0 {
                    matches.push(KeywordMatch {
                        skill: skill.skill.clone(),
                        alias: pattern.alias.clone(),
                        count,
                    });
                }
            }
        }

        matches
    }
}

/// Split an alias into literal tokens on whitespace, hyphen and underscore
pub fn tokenize_alias(alias: &str) -> Vec<&str> {
    alias
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|token| !token.is_empty())
        .collect()
}

fn compile_alias(alias: &str) -> Result<Regex> {
    let tokens = tokenize_alias(alias);
    if tokens.is_empty() {
        return Err(SkillGapError::Configuration(format!(
            "alias '{}' contains no matchable text",
            alias
        )));
    }

    let pattern = tokens
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join(SEPARATOR_CLASS);

    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| SkillGapError::Configuration(format!("bad alias '{}': {}", alias, e)))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_bounded(text: &str, m: &regex::Match<'_>) -> bool {
    let before_ok = text[..m.start()]
        .chars()
        .next_back()
        .map_or(true, |c| !is_word_char(c));
    let after_ok = text[m.end()..]
        .chars()
        .next()
        .map_or(true, |c| !is_word_char(c));
    before_ok && after_ok
}

/// Byte index of the character after the one starting at `index`
fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| index + c.len_utf8())
}

/// Non-overlapping regex matches whose neighbouring characters are not word characters.
/// Checked by hand so aliases that begin or end in punctuation ("c++") keep correct boundaries.
/// A rejected match only skips its first character, so an overlapping bounded match is still found.
fn bounded_matches<'a>(regex: &'a Regex, text: &'a str) -> impl Iterator<Item = regex::Match<'a>> + 'a {
    let mut start = 0;
    std::iter::from_fn(move || {
        while start <= text.len() {
            let m = regex.find_at(text, start)?;
            if is_bounded(text, &m) {
                start = if m.end() > m.start() {
                    m.end()
                } else {
                    next_char_boundary(text, m.end())
                };
                return Some(m);
            }
            start = next_char_boundary(text, m.start());
        }
        None
    })
}
