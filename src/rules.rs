use crate::commit::Commit;
use crate::config::GateConfig;
use crate::gate_error::GateError;
use crate::report::ValidationError;
use crate::repo::RepoState;
use crate::spell::SpellChecker;

pub(crate) mod branch_ahead;
pub(crate) mod commit_body;
pub(crate) mod conventional_commit;
pub(crate) mod identity;
pub(crate) mod imperative;
pub(crate) mod jira_reference;
pub(crate) mod signature;
pub(crate) mod signoff;
pub(crate) mod spell;
pub(crate) mod subject;

/// A validator over a single commit. Rules are pure values built from config;
/// they hold compiled grammars but no mutable state, so the same instance can
/// run over any number of commits in any order.
pub trait CommitRule {
    fn get_name(&self) -> &str;
    fn get_description(&self) -> &str;

    /// When false the engine records a skipped result instead of running
    /// `check`.
    fn applies(&self, _commit: &Commit) -> bool {
        true
    }

    fn check(&self, commit: &Commit) -> Vec<ValidationError>;
}

/// A validator over repository state, run once per invocation.
pub trait RepoRule {
    fn get_name(&self) -> &str;
    fn get_description(&self) -> &str;

    fn applies(&self) -> bool {
        true
    }

    fn check(&self, repo: &dyn RepoState) -> Vec<ValidationError>;
}

/// Stable lowercase identifiers, in evaluation order. Per-commit rules first,
/// repository-scoped rules last.
pub const RULE_NAMES: &[&str] = &[
    "subject",
    "conventional",
    "commitbody",
    "signoff",
    "signature",
    "identity",
    "jirareference",
    "spell",
    "branchahead",
];

/// Rules that run without being listed in `rules.enabled`.
const DEFAULT_ENABLED: &[&str] = &[
    "subject",
    "conventional",
    "signoff",
    "signature",
    "identity",
    "branchahead",
];

pub fn is_known_rule(name: &str) -> bool {
    RULE_NAMES.contains(&name)
}

/// Rule grammars are fixed strings; a compile failure is an engine bug and is
/// surfaced as a fault rather than a panic.
pub(crate) fn compile_pattern(pattern: &str) -> Result<regex::Regex, Box<GateError>> {
    regex::Regex::new(pattern).map_err(|e| {
        Box::new(GateError::new(
            "Failed to compile rule pattern",
            &format!("{pattern:?}: {e}"),
            crate::gate_error::GateErrorKind::Engine,
        ))
    })
}

/// Resolve the active rule set: start from the defaults, drop everything in
/// `rules.disabled`, then union `rules.enabled` back in. An explicit enable
/// wins over a disable of the same name. Order follows `RULE_NAMES`.
pub fn resolve_active(config: &GateConfig) -> Vec<&'static str> {
    RULE_NAMES
        .iter()
        .filter(|name| {
            let enabled = config.rules.enabled.iter().any(|n| n == *name);
            let disabled = config.rules.disabled.iter().any(|n| n == *name);
            enabled || (DEFAULT_ENABLED.contains(*name) && !disabled)
        })
        .copied()
        .collect()
}

pub struct RuleSet {
    pub commit_rules: Vec<Box<dyn CommitRule>>,
    pub repo_rules: Vec<Box<dyn RepoRule>>,
}

/// Instantiate every active rule from config. Construction is pure; a rule
/// rejecting its inputs surfaces as an engine fault before any validation.
pub fn build_rule_set(
    config: &GateConfig,
    mut spell_checker: Option<Box<dyn SpellChecker>>,
) -> Result<RuleSet, Box<GateError>> {
    let active = resolve_active(config);
    let conventional_active = active.contains(&"conventional");

    let mut commit_rules: Vec<Box<dyn CommitRule>> = Vec::new();
    let mut repo_rules: Vec<Box<dyn RepoRule>> = Vec::new();

    for name in active {
        match name {
            "subject" => commit_rules.push(Box::new(subject::SubjectRule::new(
                config,
                conventional_active,
            )?)),
            "conventional" => commit_rules.push(Box::new(
                conventional_commit::ConventionalRule::new(config)?,
            )),
            "commitbody" => {
                commit_rules.push(Box::new(commit_body::CommitBodyRule::new(config)?));
            }
            "signoff" => commit_rules.push(Box::new(signoff::SignOffRule::new(config)?)),
            "signature" => commit_rules.push(Box::new(signature::SignatureRule::new(config)?)),
            "identity" => commit_rules.push(Box::new(identity::IdentityRule::new(config)?)),
            "jirareference" => {
                commit_rules.push(Box::new(jira_reference::JiraReferenceRule::new(config)?));
            }
            "spell" => commit_rules.push(Box::new(spell::SpellRule::new(
                config,
                spell_checker.take(),
            )?)),
            "branchahead" => {
                repo_rules.push(Box::new(branch_ahead::BranchAheadRule::new(config)?));
            }
            _ => unreachable!("RULE_NAMES and the factory must stay in sync"),
        }
    }

    Ok(RuleSet {
        commit_rules,
        repo_rules,
    })
}
