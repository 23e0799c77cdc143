use crate::commit::Commit;
use crate::config::GateConfig;
use crate::gate_error::GateError;
use crate::repo::RepoState;
use crate::report::{CommitReport, Report, RepositoryReport, RuleReport, RuleStatus};
use crate::rules::{build_rule_set, RuleSet};
use crate::spell::SpellChecker;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag, checked between commits and before each
/// repository rule.
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Drives the active rule set over a sequence of commits and the repository.
/// The engine never mutates its inputs and never aborts on a rule finding;
/// only malformed configuration stops it, before any validation starts.
pub struct Engine {
    rule_set: RuleSet,
}

impl Engine {
    pub fn new(
        config: &GateConfig,
        spell_checker: Option<Box<dyn SpellChecker>>,
    ) -> Result<Self, Box<GateError>> {
        config.validate()?;
        Ok(Engine {
            rule_set: build_rule_set(config, spell_checker)?,
        })
    }

    pub fn run(
        &self,
        commits: &[Commit],
        repo: Option<&dyn RepoState>,
        cancel: &CancellationToken,
    ) -> Report {
        let mut commit_reports = Vec::new();
        let mut complete = true;

        for commit in commits {
            if cancel.is_cancelled() {
                debug!(
                    "Cancelled after {} of {} commits",
                    commit_reports.len(),
                    commits.len()
                );
                complete = false;
                break;
            }

            let mut rule_results = Vec::new();
            for rule in &self.rule_set.commit_rules {
                if rule.applies(commit) {
                    rule_results.push(RuleReport::from_errors(rule.get_name(), rule.check(commit)));
                } else {
                    rule_results.push(RuleReport::skipped(rule.get_name()));
                }
            }

            let passed = rule_results.iter().all(|r| r.status != RuleStatus::Failed);
            commit_reports.push(CommitReport {
                commit: commit.clone(),
                passed,
                rule_results,
            });
        }

        let mut repository = RepositoryReport::default();
        for rule in &self.rule_set.repo_rules {
            if cancel.is_cancelled() {
                complete = false;
                break;
            }
            match repo {
                Some(repo) if rule.applies() => {
                    repository
                        .rule_results
                        .push(RuleReport::from_errors(rule.get_name(), rule.check(repo)));
                }
                _ => repository.rule_results.push(RuleReport::skipped(rule.get_name())),
            }
        }

        Report::build(commit_reports, repository, complete)
    }
}
