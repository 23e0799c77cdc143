use crate::commit::Commit;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable code taxonomy consumed by formatters. Wire names are the
/// `snake_case` renderings of the variants and never change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // subject
    EmptySubject,
    SubjectTooLong,
    WrongCaseLower,
    WrongCaseUpper,
    WrongCaseSentence,
    SubjectSuffix,
    NonImperative,
    PastTense,
    Gerund,
    ThirdPerson,
    NoFirstWord,
    // conventional
    InvalidConventionalFormat,
    InvalidConventionalType,
    InvalidConventionalScope,
    MissingScope,
    DisallowedBreaking,
    DescriptionTooLong,
    MissingConventionalSubject,
    EmptyDescription,
    // body
    MissingBody,
    BodyTooShort,
    InvalidBody,
    // signoff
    MissingSignoff,
    InvalidSignoffFormat,
    MisplacedSignoff,
    InsufficientSignoffs,
    // signature
    MissingSignature,
    UnknownSignatureFormat,
    InvalidGpgFormat,
    InvalidSshFormat,
    IncompleteGpgSignature,
    IncompleteSshSignature,
    KeyNotTrusted,
    VerificationFailed,
    DisallowedSignatureType,
    // jira
    MissingJira,
    MissingJiraKeySubject,
    MissingJiraKeyBody,
    JiraKeyNotAtEnd,
    InvalidRefsFormat,
    InvalidKeyFormat,
    InvalidProject,
    RefsAfterSignoff,
    // spell
    MisspelledWord,
    // repo
    TooManyCommits,
    InvalidRepo,
    GitOperationFailed,
    MissingReference,
    InvalidConfig,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::EmptySubject => "empty_subject",
            ErrorCode::SubjectTooLong => "subject_too_long",
            ErrorCode::WrongCaseLower => "wrong_case_lower",
            ErrorCode::WrongCaseUpper => "wrong_case_upper",
            ErrorCode::WrongCaseSentence => "wrong_case_sentence",
            ErrorCode::SubjectSuffix => "subject_suffix",
            ErrorCode::NonImperative => "non_imperative",
            ErrorCode::PastTense => "past_tense",
            ErrorCode::Gerund => "gerund",
            ErrorCode::ThirdPerson => "third_person",
            ErrorCode::NoFirstWord => "no_first_word",
            ErrorCode::InvalidConventionalFormat => "invalid_conventional_format",
            ErrorCode::InvalidConventionalType => "invalid_conventional_type",
            ErrorCode::InvalidConventionalScope => "invalid_conventional_scope",
            ErrorCode::MissingScope => "missing_scope",
            ErrorCode::DisallowedBreaking => "disallowed_breaking",
            ErrorCode::DescriptionTooLong => "description_too_long",
            ErrorCode::MissingConventionalSubject => "missing_conventional_subject",
            ErrorCode::EmptyDescription => "empty_description",
            ErrorCode::MissingBody => "missing_body",
            ErrorCode::BodyTooShort => "body_too_short",
            ErrorCode::InvalidBody => "invalid_body",
            ErrorCode::MissingSignoff => "missing_signoff",
            ErrorCode::InvalidSignoffFormat => "invalid_signoff_format",
            ErrorCode::MisplacedSignoff => "misplaced_signoff",
            ErrorCode::InsufficientSignoffs => "insufficient_signoffs",
            ErrorCode::MissingSignature => "missing_signature",
            ErrorCode::UnknownSignatureFormat => "unknown_signature_format",
            ErrorCode::InvalidGpgFormat => "invalid_gpg_format",
            ErrorCode::InvalidSshFormat => "invalid_ssh_format",
            ErrorCode::IncompleteGpgSignature => "incomplete_gpg_signature",
            ErrorCode::IncompleteSshSignature => "incomplete_ssh_signature",
            ErrorCode::KeyNotTrusted => "key_not_trusted",
            ErrorCode::VerificationFailed => "verification_failed",
            ErrorCode::DisallowedSignatureType => "disallowed_signature_type",
            ErrorCode::MissingJira => "missing_jira",
            ErrorCode::MissingJiraKeySubject => "missing_jira_key_subject",
            ErrorCode::MissingJiraKeyBody => "missing_jira_key_body",
            ErrorCode::JiraKeyNotAtEnd => "jira_key_not_at_end",
            ErrorCode::InvalidRefsFormat => "invalid_refs_format",
            ErrorCode::InvalidKeyFormat => "invalid_key_format",
            ErrorCode::InvalidProject => "invalid_project",
            ErrorCode::RefsAfterSignoff => "refs_after_signoff",
            ErrorCode::MisspelledWord => "misspelled_word",
            ErrorCode::TooManyCommits => "too_many_commits",
            ErrorCode::InvalidRepo => "invalid_repo",
            ErrorCode::GitOperationFailed => "git_operation_failed",
            ErrorCode::MissingReference => "missing_reference",
            ErrorCode::InvalidConfig => "invalid_config",
        }
    }

    fn default_help(self) -> &'static str {
        match self {
            ErrorCode::EmptySubject => "Write a subject line describing the change",
            ErrorCode::SubjectTooLong => "Shorten the subject line",
            ErrorCode::WrongCaseLower => "Start the subject with a lowercase letter",
            ErrorCode::WrongCaseUpper => "Write the subject in uppercase",
            ErrorCode::WrongCaseSentence => "Capitalize the first word of the subject",
            ErrorCode::SubjectSuffix => "Remove the trailing punctuation from the subject",
            ErrorCode::NonImperative | ErrorCode::PastTense | ErrorCode::Gerund
            | ErrorCode::ThirdPerson => {
                "Use the imperative mood, as if completing: if applied, this commit will ..."
            }
            ErrorCode::NoFirstWord => "Start the description with a verb",
            ErrorCode::InvalidConventionalFormat | ErrorCode::MissingConventionalSubject => {
                "Format the subject as type(scope): description"
            }
            ErrorCode::InvalidConventionalType => "Use one of the configured commit types",
            ErrorCode::InvalidConventionalScope => "Use one of the configured scopes",
            ErrorCode::MissingScope => "Add a scope in parentheses after the type",
            ErrorCode::DisallowedBreaking => "Remove the breaking-change marker",
            ErrorCode::DescriptionTooLong => "Shorten the description after the colon",
            ErrorCode::EmptyDescription => "Add a description after the colon",
            ErrorCode::MissingBody => "Add a body explaining what changed and why",
            ErrorCode::BodyTooShort => "Expand the body of the commit message",
            ErrorCode::InvalidBody => "Add body content beyond the trailers",
            ErrorCode::MissingSignoff => "Add a Signed-off-by trailer (git commit -s)",
            ErrorCode::InvalidSignoffFormat => {
                "Use the exact form: Signed-off-by: Name <email@example.com>"
            }
            ErrorCode::MisplacedSignoff => "Move sign-off trailers to the end of the message",
            ErrorCode::InsufficientSignoffs => "Each sign-off must come from a distinct person",
            ErrorCode::MissingSignature => "Sign the commit (git commit -S)",
            ErrorCode::UnknownSignatureFormat => "Sign with a GPG or SSH key",
            ErrorCode::InvalidGpgFormat | ErrorCode::IncompleteGpgSignature => {
                "Re-sign the commit; the GPG signature armor is damaged"
            }
            ErrorCode::InvalidSshFormat | ErrorCode::IncompleteSshSignature => {
                "Re-sign the commit; the SSH signature block is damaged"
            }
            ErrorCode::KeyNotTrusted => "Use an identity from the allowed signers list",
            ErrorCode::VerificationFailed => "Set a committer email so the signer can be matched",
            ErrorCode::DisallowedSignatureType => "Sign with the configured key type",
            ErrorCode::MissingJira | ErrorCode::MissingJiraKeySubject
            | ErrorCode::MissingJiraKeyBody => "Reference an issue key like PROJ-123",
            ErrorCode::JiraKeyNotAtEnd => {
                "Place the issue key in the scope or at the end of the description"
            }
            ErrorCode::InvalidRefsFormat => "Use the form: Refs: PROJ-123, PROJ-456",
            ErrorCode::InvalidKeyFormat => "Issue keys look like PROJ-123 (uppercase project)",
            ErrorCode::InvalidProject => "Use one of the configured project prefixes",
            ErrorCode::RefsAfterSignoff => "Move Refs trailers above the sign-off block",
            ErrorCode::MisspelledWord => "Fix the spelling or add the word to ignore_words",
            ErrorCode::TooManyCommits => "Sync the branch with its reference before pushing more",
            ErrorCode::InvalidRepo => "Check repository access and permissions",
            ErrorCode::GitOperationFailed => "Inspect the underlying git error and retry",
            ErrorCode::MissingReference => "Create or fetch the reference branch",
            ErrorCode::InvalidConfig => "Fix the repository rule configuration",
        }
    }
}

/// One rule finding. `rule` and `code` are never empty; context keys are
/// stable across versions (`actual`, `expected`, plus rule-specific keys).
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub rule: String,
    pub code: ErrorCode,
    pub message: String,
    pub context: BTreeMap<String, String>,
    pub help: String,
}

impl ValidationError {
    pub fn new(rule: &str, code: ErrorCode, message: &str) -> Self {
        debug_assert!(!rule.is_empty());
        ValidationError {
            rule: rule.to_string(),
            code,
            message: message.to_string(),
            context: BTreeMap::new(),
            help: code.default_help().to_string(),
        }
    }

    pub fn with_context(mut self, key: &str, value: impl Into<String>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Passed,
    Failed,
    Skipped,
}

impl RuleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleStatus::Passed => "passed",
            RuleStatus::Failed => "failed",
            RuleStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleReport {
    pub name: String,
    pub status: RuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    pub errors: Vec<ValidationError>,
}

impl RuleReport {
    pub fn from_errors(name: &str, errors: Vec<ValidationError>) -> Self {
        let status = if errors.is_empty() {
            RuleStatus::Passed
        } else {
            RuleStatus::Failed
        };
        let message = errors.first().map(|e| e.message.clone());
        let help = errors.first().map(|e| e.help.clone());
        RuleReport {
            name: name.to_string(),
            status,
            message,
            help,
            errors,
        }
    }

    pub fn skipped(name: &str) -> Self {
        RuleReport {
            name: name.to_string(),
            status: RuleStatus::Skipped,
            message: None,
            help: None,
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    pub commit: Commit,
    pub passed: bool,
    pub rule_results: Vec<RuleReport>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RepositoryReport {
    pub rule_results: Vec<RuleReport>,
}

impl RepositoryReport {
    pub fn passed(&self) -> bool {
        self.rule_results
            .iter()
            .all(|r| r.status != RuleStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_commits: usize,
    pub passed_commits: usize,
    pub failed_commits: usize,
    pub all_passed: bool,
    /// Failure count per rule name, across commits and the repository.
    pub failed_rules: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    /// Seconds since the Unix epoch at report creation.
    pub timestamp: u64,
    /// False when cancellation stopped the run early; counts then reflect
    /// processed commits only.
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub commits: Vec<CommitReport>,
    pub repository: RepositoryReport,
    pub metadata: Metadata,
}

impl Report {
    pub fn build(
        commits: Vec<CommitReport>,
        repository: RepositoryReport,
        complete: bool,
    ) -> Self {
        let total_commits = commits.len();
        let passed_commits = commits.iter().filter(|c| c.passed).count();
        let failed_commits = total_commits - passed_commits;

        let mut failed_rules: BTreeMap<String, usize> = BTreeMap::new();
        let commit_results = commits.iter().flat_map(|c| c.rule_results.iter());
        for result in commit_results.chain(repository.rule_results.iter()) {
            if result.status == RuleStatus::Failed {
                *failed_rules.entry(result.name.clone()).or_insert(0) += 1;
            }
        }

        let all_passed = failed_commits == 0 && repository.passed();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Report {
            summary: Summary {
                total_commits,
                passed_commits,
                failed_commits,
                all_passed,
                failed_rules,
            },
            commits,
            repository,
            metadata: Metadata {
                timestamp,
                complete,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit_report(passed: bool, results: Vec<RuleReport>) -> CommitReport {
        CommitReport {
            commit: Commit::new("abc", "feat: x", "A", "a@b.c", "", false),
            passed,
            rule_results: results,
        }
    }

    #[test]
    fn test_summary_counts_add_up() {
        let failing = RuleReport::from_errors(
            "Subject",
            vec![ValidationError::new(
                "Subject",
                ErrorCode::SubjectTooLong,
                "subject is 90 characters long",
            )],
        );
        let report = Report::build(
            vec![
                commit_report(true, vec![RuleReport::from_errors("Subject", vec![])]),
                commit_report(false, vec![failing]),
            ],
            RepositoryReport::default(),
            true,
        );
        assert_eq!(report.summary.total_commits, 2);
        assert_eq!(
            report.summary.passed_commits + report.summary.failed_commits,
            report.summary.total_commits
        );
        assert!(!report.summary.all_passed);
        assert_eq!(report.summary.failed_rules.get("Subject"), Some(&1));
    }

    #[test]
    fn test_all_passed_iff_no_failures() {
        let report = Report::build(
            vec![commit_report(true, vec![])],
            RepositoryReport::default(),
            true,
        );
        assert!(report.summary.all_passed);
        assert_eq!(report.summary.failed_commits, 0);
    }

    #[test]
    fn test_repo_failure_clears_all_passed() {
        let repo = RepositoryReport {
            rule_results: vec![RuleReport::from_errors(
                "BranchAhead",
                vec![ValidationError::new(
                    "BranchAhead",
                    ErrorCode::TooManyCommits,
                    "branch is 7 commits ahead of main",
                )],
            )],
        };
        let report = Report::build(vec![commit_report(true, vec![])], repo, true);
        assert!(!report.summary.all_passed);
        assert_eq!(report.summary.failed_commits, 0);
    }

    #[test]
    fn test_error_code_wire_names() {
        assert_eq!(ErrorCode::SubjectTooLong.as_str(), "subject_too_long");
        assert_eq!(ErrorCode::WrongCaseSentence.as_str(), "wrong_case_sentence");
        assert_eq!(
            ErrorCode::InvalidConventionalFormat.as_str(),
            "invalid_conventional_format"
        );
        assert_eq!(ErrorCode::RefsAfterSignoff.as_str(), "refs_after_signoff");
        assert_eq!(
            serde_json::to_string(&ErrorCode::MisspelledWord).unwrap(),
            "\"misspelled_word\""
        );
    }

    #[test]
    fn test_help_always_populated() {
        let err = ValidationError::new("Subject", ErrorCode::EmptySubject, "subject is empty");
        assert!(!err.help.is_empty());
        let overridden = err.with_help("custom help");
        assert_eq!(overridden.help, "custom help");
    }

    #[test]
    fn test_rule_report_status() {
        let passed = RuleReport::from_errors("Identity", vec![]);
        assert_eq!(passed.status, RuleStatus::Passed);
        let skipped = RuleReport::skipped("Spell");
        assert_eq!(skipped.status, RuleStatus::Skipped);
        assert!(skipped.errors.is_empty());
    }
}
