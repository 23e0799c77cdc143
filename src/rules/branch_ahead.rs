use crate::config::GateConfig;
use crate::gate_error::GateError;
use crate::report::{ErrorCode, ValidationError};
use crate::repo::RepoState;
use crate::rules::RepoRule;
use log::debug;

/// Error substrings that mean the reference simply does not exist yet. A
/// fresh repository without the reference branch counts as zero ahead.
const MISSING_REF_MARKERS: &[&str] = &[
    "not found",
    "does not exist",
    "unknown revision",
    "bad revision",
];

const ACCESS_MARKERS: &[&str] = &[
    "not a git repository",
    "permission denied",
    "access denied",
    "authentication failed",
];

pub(crate) struct BranchAheadRule {
    name: String,
    description: String,
    reference_branch: String,
    max_commits_ahead: usize,
}

impl BranchAheadRule {
    pub fn new(config: &GateConfig) -> Result<Self, Box<GateError>> {
        Ok(BranchAheadRule {
            name: "BranchAhead".to_string(),
            description: "Limit how far a branch may run ahead of its reference".to_string(),
            reference_branch: config.repo.reference_branch.clone(),
            max_commits_ahead: config.repo.max_commits_ahead,
        })
    }

    /// Tier keyed on how far ahead the branch is overall.
    fn drift_help(&self, count: usize) -> String {
        if count <= 3 {
            format!(
                "Rebase onto {} or merge it before adding more commits",
                self.reference_branch
            )
        } else if count <= 10 {
            format!(
                "Consider splitting this work and syncing with {} now",
                self.reference_branch
            )
        } else {
            format!(
                "This branch has drifted far from {}; sync it before it becomes unreviewable",
                self.reference_branch
            )
        }
    }
}

impl RepoRule for BranchAheadRule {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_description(&self) -> &str {
        &self.description
    }

    fn applies(&self) -> bool {
        self.max_commits_ahead > 0
    }

    fn check(&self, repo: &dyn RepoState) -> Vec<ValidationError> {
        let count = match repo.commits_ahead_count(&self.reference_branch) {
            Ok(count) => count,
            Err(message) => {
                let lowered = message.to_lowercase();
                if MISSING_REF_MARKERS.iter().any(|m| lowered.contains(m)) {
                    debug!(
                        "Reference {} missing, treating as zero ahead",
                        self.reference_branch
                    );
                    return Vec::new();
                }
                let code = if ACCESS_MARKERS.iter().any(|m| lowered.contains(m)) {
                    ErrorCode::InvalidRepo
                } else {
                    ErrorCode::GitOperationFailed
                };
                return vec![
                    ValidationError::new(&self.name, code, "Could not count commits ahead")
                        .with_context("error", message)
                        .with_context("reference", self.reference_branch.clone()),
                ];
            }
        };

        if count <= self.max_commits_ahead {
            return Vec::new();
        }

        vec![
            ValidationError::new(
                &self.name,
                ErrorCode::TooManyCommits,
                &format!(
                    "Branch is {count} commits ahead of {}, the limit is {}",
                    self.reference_branch, self.max_commits_ahead
                ),
            )
            .with_context("actual", count.to_string())
            .with_context("expected", self.max_commits_ahead.to_string())
            .with_context("excess", (count - self.max_commits_ahead).to_string())
            .with_context("reference", self.reference_branch.clone())
            .with_help(self.drift_help(count)),
        ]
    }
}
