use std::sync::LazyLock;

use regex::Regex;

use crate::library::Track;

use super::clear_string;
use super::rules::{FieldMode, FieldRule};

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)").expect("valid regex"));

const STOP_WORDS: [&str; 4] = ["der ", "die ", "das ", "the "];

/// An ordered, loaded naming rule table.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<FieldRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Canonical path for `track`, built by rendering every rule in order.
    ///
    /// Every field of the fixed vocabulary counts as present, so a rule always
    /// renders; a missing value falls back to the rule's default (or `0` for
    /// numeric rules).
    pub fn generate_name(&self, track: &Track) -> String {
        let mut name = String::new();
        for rule in &self.rules {
            render(rule, rule.field.value(track), &mut name);
        }
        name
    }
}

fn render(rule: &FieldRule, value: Option<&str>, out: &mut String) {
    if let Some(prefix) = &rule.prefix {
        out.push_str(prefix);
    }

    match rule.mode {
        FieldMode::Default => {
            let cleaned = value.map(clear_string).unwrap_or_default();
            push_or_default(out, &cleaned, rule);
        }
        FieldMode::Group => {
            let cleaned = value.map(clear_string).unwrap_or_default();
            if let Some(letter) = value.and_then(|raw| group_letter(raw, &cleaned)) {
                out.push(letter);
            }
            // The prefix goes out a second time between letter and value.
            if let Some(prefix) = &rule.prefix {
                out.push_str(prefix);
            }
            push_or_default(out, &cleaned, rule);
        }
        FieldMode::Numeric => {
            let number = value.map(first_number).unwrap_or(0);
            match rule.width {
                Some(width) => out.push_str(&format!("{number:0width$}")),
                None => out.push_str(&number.to_string()),
            }
        }
        FieldMode::Value => match value.and_then(|raw| rule.lookup(raw)) {
            Some(mapped) => out.push_str(mapped),
            None => {
                if let Some(default) = &rule.default {
                    out.push_str(default);
                }
            }
        },
    }

    if let Some(suffix) = &rule.suffix {
        out.push_str(suffix);
    }
}

fn push_or_default(out: &mut String, cleaned: &str, rule: &FieldRule) {
    if !cleaned.is_empty() {
        out.push_str(cleaned);
    } else if let Some(default) = &rule.default {
        out.push_str(default);
    }
}

/// Group letter for `raw`: skips a leading article ("The", "Der", "Die",
/// "Das") so "The Cure" files under `C`.
pub(crate) fn group_letter(raw: &str, cleaned: &str) -> Option<char> {
    let index = if starts_with_article(raw) { 3 } else { 0 };
    cleaned
        .chars()
        .nth(index)
        .or_else(|| cleaned.chars().next())
        .map(|c| c.to_ascii_uppercase())
}

fn starts_with_article(raw: &str) -> bool {
    if raw.chars().count() < 5 {
        return false;
    }
    let head: String = raw.chars().take(4).collect::<String>().to_lowercase();
    STOP_WORDS.contains(&head.as_str())
}

/// First run of digits anywhere in `value`; `0` if there is none.
pub(crate) fn first_number(value: &str) -> u64 {
    DIGITS
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
