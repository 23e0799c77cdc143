use crate::commit::Commit;
use crate::config::GateConfig;
use crate::gate_error::GateError;
use crate::report::{ErrorCode, ValidationError};
use crate::rules::CommitRule;
use crate::spell::{Misspelling, SpellChecker};
use log::warn;

pub(crate) struct SpellRule {
    name: String,
    description: String,
    ignore_words: Vec<String>,
    checker: Option<Box<dyn SpellChecker>>,
}

impl SpellRule {
    pub fn new(
        config: &GateConfig,
        checker: Option<Box<dyn SpellChecker>>,
    ) -> Result<Self, Box<GateError>> {
        Ok(SpellRule {
            name: "Spell".to_string(),
            description: "Spell-check the commit message".to_string(),
            ignore_words: config
                .spell
                .ignore_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            checker,
        })
    }
}

/// Strip comment lines and markup punctuation so the backend sees prose.
/// The function is idempotent: running it twice changes nothing.
pub(crate) fn preprocess(text: &str) -> String {
    let mut cleaned = Vec::new();
    for line in text.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        let replaced: String = line
            .chars()
            .map(|c| match c {
                '[' | ']' | '(' | ')' | '/' | ':' | '_' | '-' => ' ',
                other => other,
            })
            .collect();
        let mut collapsed = String::with_capacity(replaced.len());
        let mut last_was_space = false;
        for c in replaced.chars() {
            if c == ' ' {
                if !last_was_space {
                    collapsed.push(' ');
                }
                last_was_space = true;
            } else {
                collapsed.push(c);
                last_was_space = false;
            }
        }
        cleaned.push(collapsed);
    }
    cleaned.join("\n")
}

fn corrections_help(found: &[Misspelling]) -> String {
    let shown: Vec<String> = found
        .iter()
        .take(5)
        .map(|m| {
            if m.suggestion.is_empty() {
                m.word.clone()
            } else {
                format!("{} -> {}", m.word, m.suggestion)
            }
        })
        .collect();
    if found.len() > 5 {
        format!("Corrections: {} and {} more", shown.join(", "), found.len() - 5)
    } else {
        format!("Corrections: {}", shown.join(", "))
    }
}

impl CommitRule for SpellRule {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_description(&self) -> &str {
        &self.description
    }

    /// Without a dictionary backend the rule reports skipped instead of
    /// guessing.
    fn applies(&self, _commit: &Commit) -> bool {
        self.checker.is_some()
    }

    fn check(&self, commit: &Commit) -> Vec<ValidationError> {
        let Some(checker) = self.checker.as_deref() else {
            return Vec::new();
        };

        let text = preprocess(&format!("{}\n{}", commit.subject, commit.body));
        let found = match checker.check_text(&text) {
            Ok(found) => found,
            Err(e) => {
                warn!("Spell backend unavailable, passing commit: {e}");
                return Vec::new();
            }
        };

        let found: Vec<Misspelling> = found
            .into_iter()
            .filter(|m| !self.ignore_words.contains(&m.word.to_lowercase()))
            .collect();
        if found.is_empty() {
            return Vec::new();
        }

        let help = corrections_help(&found);
        found
            .iter()
            .map(|m| {
                let mut error = ValidationError::new(
                    &self.name,
                    ErrorCode::MisspelledWord,
                    &format!("Word {:?} appears misspelled", m.word),
                )
                .with_context("actual", m.word.clone())
                .with_help(help.clone());
                if !m.suggestion.is_empty() {
                    error = error.with_context("expected", m.suggestion.clone());
                }
                error
            })
            .collect()
    }
}
