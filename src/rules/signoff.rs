use crate::commit::Commit;
use crate::config::GateConfig;
use crate::gate_error::GateError;
use crate::report::{ErrorCode, ValidationError};
use crate::rules::{compile_pattern, CommitRule};
use regex::Regex;
use std::collections::BTreeMap;

/// Strict DCO trailer shape. Anything looser only counts as an attempt.
const SIGNOFF_PATTERN: &str = r"^Signed-off-by:\s+.+\s+<.+@.+>$";
const SIGNOFF_PREFIX: &str = "Signed-off-by:";
const EMAIL_PATTERN: &str = r"<([^>]+)>";

/// Trailer kinds that may follow a sign-off block without counting as body
/// content.
const TRAILER_PREFIXES: &[&str] = &[
    "Signed-off-by:",
    "Co-authored-by:",
    "Reviewed-by:",
    "Acked-by:",
    "Tested-by:",
];

pub(crate) fn is_trailer_line(line: &str) -> bool {
    let line = line.trim();
    TRAILER_PREFIXES.iter().any(|p| line.starts_with(p))
}

pub(crate) fn is_signoff_attempt(line: &str) -> bool {
    line.trim().starts_with(SIGNOFF_PREFIX)
}

pub(crate) struct SignOffRule {
    name: String,
    description: String,
    required: usize,
    signoff_re: Regex,
    email_re: Regex,
}

impl SignOffRule {
    pub fn new(config: &GateConfig) -> Result<Self, Box<GateError>> {
        let body = &config.message.body;
        let required = if body.require_signoff {
            body.min_signoff_count.max(1)
        } else {
            body.min_signoff_count
        };
        Ok(SignOffRule {
            name: "SignOff".to_string(),
            description: "Require well-formed Signed-off-by trailers".to_string(),
            required,
            signoff_re: compile_pattern(SIGNOFF_PATTERN)?,
            email_re: compile_pattern(EMAIL_PATTERN)?,
        })
    }

    fn signoff_email(&self, line: &str) -> Option<String> {
        self.email_re
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase())
    }
}

impl CommitRule for SignOffRule {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_description(&self) -> &str {
        &self.description
    }

    fn check(&self, commit: &Commit) -> Vec<ValidationError> {
        if self.required == 0 {
            return Vec::new();
        }

        let lines: Vec<&str> = commit.body.lines().map(str::trim).collect();
        let mut valid_signoffs: Vec<String> = Vec::new();
        let mut malformed: Vec<&str> = Vec::new();
        let mut last_signoff_index: Option<usize> = None;

        for (index, line) in lines.iter().copied().enumerate() {
            if self.signoff_re.is_match(line) {
                if let Some(email) = self.signoff_email(line) {
                    valid_signoffs.push(email);
                }
                last_signoff_index = Some(index);
            } else if line.starts_with(SIGNOFF_PREFIX) {
                malformed.push(line);
                last_signoff_index = Some(index);
            }
        }

        let mut errors = Vec::new();

        if valid_signoffs.len() < self.required {
            errors.push(
                ValidationError::new(
                    &self.name,
                    ErrorCode::MissingSignoff,
                    &format!(
                        "Found {} valid sign-offs, {} required",
                        valid_signoffs.len(),
                        self.required
                    ),
                )
                .with_context("actual", valid_signoffs.len().to_string())
                .with_context("expected", self.required.to_string()),
            );
        }

        for line in malformed {
            errors.push(
                ValidationError::new(
                    &self.name,
                    ErrorCode::InvalidSignoffFormat,
                    "Sign-off line does not match the DCO format",
                )
                .with_context("actual", line),
            );
        }

        if let Some(last) = last_signoff_index {
            let trailing = lines
                .iter()
                .skip(last + 1)
                .find(|line| !line.is_empty() && !is_trailer_line(line));
            if let Some(line) = trailing {
                errors.push(
                    ValidationError::new(
                        &self.name,
                        ErrorCode::MisplacedSignoff,
                        "Body content appears after the sign-off block",
                    )
                    .with_context("actual", *line),
                );
            }
        }

        if self.required > 1 {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for email in &valid_signoffs {
                *counts.entry(email.as_str()).or_insert(0) += 1;
            }
            let duplicates: Vec<&str> = counts
                .iter()
                .filter(|(_, n)| **n > 1)
                .map(|(email, _)| *email)
                .collect();
            if !duplicates.is_empty() {
                errors.push(
                    ValidationError::new(
                        &self.name,
                        ErrorCode::InsufficientSignoffs,
                        "Sign-offs must come from distinct people",
                    )
                    .with_context("duplicates", duplicates.join(", "))
                    .with_context("expected", self.required.to_string()),
                );
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(body: &str) -> Commit {
        let message = format!("feat: x\n\n{body}");
        Commit::new("abc", &message, "A", "a@b.c", "", false)
    }

    fn rule(required: usize) -> SignOffRule {
        let mut config = GateConfig::default();
        config.message.body.require_signoff = required > 0;
        config.message.body.min_signoff_count = required;
        SignOffRule::new(&config).unwrap()
    }

    fn codes(errors: &[ValidationError]) -> Vec<ErrorCode> {
        errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn test_not_required_passes_anything() {
        let rule = rule(0);
        assert!(rule.check(&commit("no trailers at all")).is_empty());
    }

    #[test]
    fn test_valid_signoff_passes() {
        let rule = rule(1);
        let body = "This fixes a bug.\n\nSigned-off-by: Ada Lovelace <ada@example.com>";
        assert!(rule.check(&commit(body)).is_empty());
    }

    #[test]
    fn test_missing_signoff() {
        let rule = rule(1);
        let errors = rule.check(&commit("Just a body."));
        assert_eq!(codes(&errors), vec![ErrorCode::MissingSignoff]);
    }

    #[test]
    fn test_malformed_signoff_counts_as_attempt() {
        let rule = rule(1);
        let errors = rule.check(&commit("Signed-off-by: X"));
        assert_eq!(
            codes(&errors),
            vec![ErrorCode::MissingSignoff, ErrorCode::InvalidSignoffFormat]
        );
    }

    #[test]
    fn test_content_after_signoff() {
        let rule = rule(1);
        let body = "Fix things.\n\nSigned-off-by: Ada Lovelace <ada@example.com>\n\nOne more thought";
        let errors = rule.check(&commit(body));
        assert_eq!(codes(&errors), vec![ErrorCode::MisplacedSignoff]);
    }

    #[test]
    fn test_other_trailers_after_signoff_allowed() {
        let rule = rule(1);
        let body = "Fix things.\n\nSigned-off-by: Ada Lovelace <ada@example.com>\nCo-authored-by: Grace Hopper <grace@example.com>";
        assert!(rule.check(&commit(body)).is_empty());
    }

    #[test]
    fn test_duplicate_emails_with_multiple_required() {
        let rule = rule(2);
        let body = "Signed-off-by: Ada Lovelace <ada@example.com>\nSigned-off-by: A. Lovelace <ADA@example.com>";
        let errors = rule.check(&commit(body));
        assert_eq!(codes(&errors), vec![ErrorCode::InsufficientSignoffs]);
        assert_eq!(
            errors[0].context.get("duplicates").map(String::as_str),
            Some("ada@example.com")
        );
    }

    #[test]
    fn test_two_distinct_signoffs_pass() {
        let rule = rule(2);
        let body = "Signed-off-by: Ada Lovelace <ada@example.com>\nSigned-off-by: Grace Hopper <grace@example.com>";
        assert!(rule.check(&commit(body)).is_empty());
    }
}
