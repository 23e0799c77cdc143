use crate::commit::Commit;
use crate::config::GateConfig;
use crate::gate_error::GateError;
use crate::report::{ErrorCode, ValidationError};
use crate::rules::{compile_pattern, CommitRule};
use regex::Regex;

pub(crate) struct IdentityRule {
    name: String,
    description: String,
    allowed_authors: Vec<String>,
    email_re: Regex,
}

impl IdentityRule {
    pub fn new(config: &GateConfig) -> Result<Self, Box<GateError>> {
        Ok(IdentityRule {
            name: "Identity".to_string(),
            description: "Restrict commits to an allowed set of authors".to_string(),
            allowed_authors: config.identity.allowed_authors.clone(),
            email_re: compile_pattern(r"<([^>]+)>")?,
        })
    }

    /// Names are informational; only the email side of an entry is matched
    /// loosely. Matching order: exact "Name <email>" string, then the commit
    /// email against the whole entry, then against the email inside it.
    fn matches(&self, commit: &Commit, entry: &str) -> bool {
        let full = format!("{} <{}>", commit.author, commit.author_email);
        if entry == full {
            return true;
        }
        if commit.author_email.is_empty() {
            return false;
        }
        if entry.eq_ignore_ascii_case(&commit.author_email) {
            return true;
        }
        self.email_re
            .captures(entry)
            .and_then(|c| c.get(1))
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case(&commit.author_email))
    }
}

impl CommitRule for IdentityRule {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_description(&self) -> &str {
        &self.description
    }

    fn check(&self, commit: &Commit) -> Vec<ValidationError> {
        if self.allowed_authors.is_empty() {
            return Vec::new();
        }
        if self
            .allowed_authors
            .iter()
            .any(|entry| self.matches(commit, entry))
        {
            return Vec::new();
        }
        vec![
            ValidationError::new(
                &self.name,
                ErrorCode::KeyNotTrusted,
                &format!(
                    "Author {} <{}> is not in the allowed authors list",
                    commit.author, commit.author_email
                ),
            )
            .with_context("actual", format!("{} <{}>", commit.author, commit.author_email)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(author: &str, email: &str) -> Commit {
        Commit::new("abc", "feat: x", author, email, "", false)
    }

    fn rule(allowed: &[&str]) -> IdentityRule {
        let mut config = GateConfig::default();
        config.identity.allowed_authors = allowed.iter().map(|s| s.to_string()).collect();
        IdentityRule::new(&config).unwrap()
    }

    #[test]
    fn test_empty_list_allows_everyone() {
        let rule = rule(&[]);
        assert!(rule.check(&commit("Anyone", "anyone@example.com")).is_empty());
    }

    #[test]
    fn test_exact_entry_match() {
        let rule = rule(&["Ada Lovelace <ada@example.com>"]);
        assert!(
            rule.check(&commit("Ada Lovelace", "ada@example.com"))
                .is_empty()
        );
    }

    #[test]
    fn test_email_match_ignores_name() {
        let rule = rule(&["Ada Lovelace <ada@example.com>"]);
        assert!(rule.check(&commit("A. Lovelace", "ADA@example.com")).is_empty());
    }

    #[test]
    fn test_bare_email_entry() {
        let rule = rule(&["ada@example.com"]);
        assert!(rule.check(&commit("Anyone", "Ada@Example.com")).is_empty());
    }

    #[test]
    fn test_unlisted_author_rejected() {
        let rule = rule(&["ada@example.com"]);
        let errors = rule.check(&commit("Mallory", "mallory@example.com"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::KeyNotTrusted);
    }

    #[test]
    fn test_empty_email_never_matches_loosely() {
        let rule = rule(&["ada@example.com"]);
        let errors = rule.check(&commit("Ada Lovelace", ""));
        assert_eq!(errors.len(), 1);
    }
}
