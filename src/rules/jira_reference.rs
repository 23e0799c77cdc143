use crate::commit::Commit;
use crate::config::GateConfig;
use crate::conventional::parse_subject;
use crate::gate_error::GateError;
use crate::report::{ErrorCode, ValidationError};
use crate::rules::signoff::is_signoff_attempt;
use crate::rules::{compile_pattern, CommitRule};
use regex::Regex;

/// Issue keys look like PROJ-123.
const KEY_PATTERN: &str = r"[A-Z]+-\d+";
const STRICT_KEY_PATTERN: &str = r"^[A-Z]+-\d+$";
/// A strict body trailer: `Refs: KEY` with optional comma-separated keys.
const REFS_LINE_PATTERN: &str = r"^Refs:\s+[A-Za-z]+-\d+(,\s*[A-Za-z]+-\d+)*\s*$";
const REFS_PREFIX: &str = "Refs:";

/// Commit types that do not need an issue reference.
const EXEMPT_TYPES: &[&str] = &["docs", "chore", "style", "refactor", "test"];

pub(crate) struct JiraReferenceRule {
    name: String,
    description: String,
    project_prefixes: Vec<String>,
    require_in_subject: bool,
    require_in_body: bool,
    ignore_patterns: Vec<Regex>,
    key_re: Regex,
    strict_key_re: Regex,
    refs_line_re: Regex,
}

impl JiraReferenceRule {
    pub fn new(config: &GateConfig) -> Result<Self, Box<GateError>> {
        let jira = &config.jira;
        let ignore_patterns = jira
            .ignore_ticket_patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(JiraReferenceRule {
            name: "JiraReference".to_string(),
            description: "Require issue-tracker references in commits".to_string(),
            project_prefixes: jira.project_prefixes.clone(),
            require_in_subject: jira.require_in_subject,
            require_in_body: jira.require_in_body,
            ignore_patterns,
            key_re: compile_pattern(KEY_PATTERN)?,
            strict_key_re: compile_pattern(STRICT_KEY_PATTERN)?,
            refs_line_re: compile_pattern(REFS_LINE_PATTERN)?,
        })
    }

    fn is_ignored(&self, key: &str) -> bool {
        self.ignore_patterns.iter().any(|p| p.is_match(key))
    }

    /// All non-ignored issue keys in the text, first occurrence order.
    fn references_in(&self, text: &str) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for found in self.key_re.find_iter(text) {
            let key = found.as_str();
            if !self.is_ignored(key) && !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
        keys
    }

    fn prefix_allowed(&self, key: &str) -> bool {
        let prefix = key.split('-').next().unwrap_or(key);
        self.project_prefixes.iter().any(|p| p == prefix)
    }

    fn check_subject(&self, commit: &Commit, errors: &mut Vec<ValidationError>) {
        let keys = self.references_in(&commit.subject);
        if keys.is_empty() {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::MissingJiraKeySubject,
                "Subject has no issue reference",
            ));
            return;
        }

        if !self.project_prefixes.is_empty() && !keys.iter().any(|k| self.prefix_allowed(k)) {
            errors.push(
                ValidationError::new(
                    &self.name,
                    ErrorCode::InvalidProject,
                    "No subject reference uses an allowed project prefix",
                )
                .with_context("actual", keys.join(", "))
                .with_context("expected", self.project_prefixes.join(", ")),
            );
            return;
        }

        // In a Conventional subject the key must sit in the scope or close
        // the description, so it reads as metadata rather than prose.
        let parsed = parse_subject(&commit.subject);
        if parsed.is_valid {
            let description = parsed.description.trim_end();
            let placed = keys.iter().any(|key| {
                let in_scope = parsed
                    .scope
                    .as_deref()
                    .is_some_and(|scope| scope.contains(key.as_str()));
                in_scope || description.ends_with(key.as_str())
            });
            if !placed {
                errors.push(
                    ValidationError::new(
                        &self.name,
                        ErrorCode::JiraKeyNotAtEnd,
                        "Issue reference is buried inside the description",
                    )
                    .with_context("actual", keys.join(", ")),
                );
            }
        }
    }

    fn check_body(&self, commit: &Commit, errors: &mut Vec<ValidationError>) {
        let mut seen_refs_line = false;
        let mut seen_signoff = false;

        for line in commit.body.lines().map(str::trim) {
            if is_signoff_attempt(line) {
                seen_signoff = true;
                continue;
            }
            if !line.starts_with(REFS_PREFIX) {
                continue;
            }
            seen_refs_line = true;

            if seen_signoff {
                errors.push(
                    ValidationError::new(
                        &self.name,
                        ErrorCode::RefsAfterSignoff,
                        "Refs trailer appears after a sign-off",
                    )
                    .with_context("actual", line),
                );
            }

            if !self.refs_line_re.is_match(line) {
                errors.push(
                    ValidationError::new(
                        &self.name,
                        ErrorCode::InvalidRefsFormat,
                        "Refs trailer is malformed",
                    )
                    .with_context("actual", line),
                );
                continue;
            }

            let keys = line[REFS_PREFIX.len()..].split(',').map(str::trim);
            for key in keys {
                if self.is_ignored(key) {
                    continue;
                }
                if !self.strict_key_re.is_match(key) {
                    errors.push(
                        ValidationError::new(
                            &self.name,
                            ErrorCode::InvalidKeyFormat,
                            &format!("Issue key {key:?} is malformed"),
                        )
                        .with_context("actual", key),
                    );
                } else if !self.project_prefixes.is_empty() && !self.prefix_allowed(key) {
                    errors.push(
                        ValidationError::new(
                            &self.name,
                            ErrorCode::InvalidProject,
                            &format!("Issue key {key:?} uses an unknown project"),
                        )
                        .with_context("actual", key)
                        .with_context("expected", self.project_prefixes.join(", ")),
                    );
                }
            }
        }

        if !seen_refs_line {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::MissingJiraKeyBody,
                "Body has no Refs trailer",
            ));
        }
    }

    fn check_anywhere(&self, commit: &Commit, errors: &mut Vec<ValidationError>) {
        let keys = self.references_in(&commit.message);
        if keys.is_empty() {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::MissingJira,
                "Commit has no issue reference",
            ));
            return;
        }
        if !self.project_prefixes.is_empty() && !keys.iter().any(|k| self.prefix_allowed(k)) {
            errors.push(
                ValidationError::new(
                    &self.name,
                    ErrorCode::InvalidProject,
                    "No reference uses an allowed project prefix",
                )
                .with_context("actual", keys.join(", "))
                .with_context("expected", self.project_prefixes.join(", ")),
            );
        }
    }
}

impl CommitRule for JiraReferenceRule {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_description(&self) -> &str {
        &self.description
    }

    fn applies(&self, commit: &Commit) -> bool {
        let parsed = parse_subject(&commit.subject);
        !(parsed.is_valid && EXEMPT_TYPES.contains(&parsed.commit_type.as_str()))
    }

    fn check(&self, commit: &Commit) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.require_in_subject {
            self.check_subject(commit, &mut errors);
        }
        if self.require_in_body {
            self.check_body(commit, &mut errors);
        }
        if !self.require_in_subject && !self.require_in_body {
            self.check_anywhere(commit, &mut errors);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(subject: &str, body: &str) -> Commit {
        let message = if body.is_empty() {
            subject.to_string()
        } else {
            format!("{subject}\n\n{body}")
        };
        Commit::new("abc", &message, "A", "a@b.c", "", false)
    }

    fn rule(mutate: impl FnOnce(&mut GateConfig)) -> JiraReferenceRule {
        let mut config = GateConfig::default();
        mutate(&mut config);
        JiraReferenceRule::new(&config).unwrap()
    }

    fn codes(errors: &[ValidationError]) -> Vec<ErrorCode> {
        errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn test_exempt_types_skipped() {
        let rule = rule(|c| c.jira.require_in_subject = true);
        assert!(!rule.applies(&commit("docs: fix typo", "")));
        assert!(!rule.applies(&commit("chore: bump deps", "")));
        assert!(rule.applies(&commit("feat: add login", "")));
        assert!(rule.applies(&commit("not conventional at all", "")));
    }

    #[test]
    fn test_subject_reference_at_end_passes() {
        let rule = rule(|c| {
            c.jira.require_in_subject = true;
            c.jira.project_prefixes = vec!["PROJ".into()];
        });
        let errors = rule.check(&commit("fix: resolve timeout PROJ-123", ""));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_subject_reference_missing() {
        let rule = rule(|c| {
            c.jira.require_in_subject = true;
            c.jira.project_prefixes = vec!["PROJ".into()];
        });
        let errors = rule.check(&commit("fix: resolve timeout", ""));
        assert_eq!(codes(&errors), vec![ErrorCode::MissingJiraKeySubject]);
    }

    #[test]
    fn test_subject_reference_in_scope_passes() {
        let rule = rule(|c| c.jira.require_in_subject = true);
        let errors = rule.check(&commit("fix(PROJ-123): resolve timeout", ""));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_subject_reference_buried() {
        let rule = rule(|c| c.jira.require_in_subject = true);
        let errors = rule.check(&commit("fix: PROJ-123 resolve timeout", ""));
        assert_eq!(codes(&errors), vec![ErrorCode::JiraKeyNotAtEnd]);
    }

    #[test]
    fn test_non_conventional_subject_any_placement() {
        let rule = rule(|c| c.jira.require_in_subject = true);
        let errors = rule.check(&commit("Resolve PROJ-123 timeout", ""));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_subject_wrong_project() {
        let rule = rule(|c| {
            c.jira.require_in_subject = true;
            c.jira.project_prefixes = vec!["PROJ".into()];
        });
        let errors = rule.check(&commit("fix: resolve timeout OTHER-9", ""));
        assert_eq!(codes(&errors), vec![ErrorCode::InvalidProject]);
    }

    #[test]
    fn test_body_refs_trailer_passes() {
        let rule = rule(|c| c.jira.require_in_body = true);
        let errors = rule.check(&commit("feat: add login", "Refs: PROJ-123, PROJ-456"));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_body_refs_missing() {
        let rule = rule(|c| c.jira.require_in_body = true);
        let errors = rule.check(&commit("feat: add login", "Some body text"));
        assert_eq!(codes(&errors), vec![ErrorCode::MissingJiraKeyBody]);
    }

    #[test]
    fn test_body_refs_malformed() {
        let rule = rule(|c| c.jira.require_in_body = true);
        let errors = rule.check(&commit("feat: add login", "Refs: PROJ-123,,PROJ-4"));
        assert_eq!(codes(&errors), vec![ErrorCode::InvalidRefsFormat]);
    }

    #[test]
    fn test_body_refs_lowercase_key() {
        let rule = rule(|c| c.jira.require_in_body = true);
        let errors = rule.check(&commit("feat: add login", "Refs: proj-123"));
        assert_eq!(codes(&errors), vec![ErrorCode::InvalidKeyFormat]);
    }

    #[test]
    fn test_body_refs_unknown_project() {
        let rule = rule(|c| {
            c.jira.require_in_body = true;
            c.jira.project_prefixes = vec!["PROJ".into()];
        });
        let errors = rule.check(&commit("feat: add login", "Refs: OTHER-9"));
        assert_eq!(codes(&errors), vec![ErrorCode::InvalidProject]);
    }

    #[test]
    fn test_refs_after_signoff() {
        let rule = rule(|c| c.jira.require_in_body = true);
        let body = "Signed-off-by: Ada <ada@example.com>\nRefs: PROJ-123";
        let errors = rule.check(&commit("feat: add login", body));
        assert_eq!(codes(&errors), vec![ErrorCode::RefsAfterSignoff]);
    }

    #[test]
    fn test_anywhere_mode() {
        let rule = rule(|_| {});
        assert!(
            rule.check(&commit("feat: add login", "Fixes: PROJ-123"))
                .is_empty()
        );
        let errors = rule.check(&commit("feat: add login", "no reference"));
        assert_eq!(codes(&errors), vec![ErrorCode::MissingJira]);
    }

    #[test]
    fn test_ignored_patterns_dropped() {
        let rule = rule(|c| {
            c.jira.ignore_ticket_patterns = vec!["^UTF-".into()];
        });
        let errors = rule.check(&commit("feat: handle UTF-8 input", ""));
        assert_eq!(codes(&errors), vec![ErrorCode::MissingJira]);
    }
}
