use crate::gate_error::{GateError, GateErrorKind};
use crate::rules::is_known_rule;
use git2::Repository;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_FILE: &str = ".commitgate.toml";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GateConfig {
    #[serde(default)]
    pub message: MessageConfig,
    #[serde(default)]
    pub conventional: ConventionalConfig,
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub signature: SignatureConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub spell: SpellConfig,
    #[serde(default)]
    pub repo: RepoConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct MessageConfig {
    #[serde(default)]
    pub subject: SubjectConfig,
    #[serde(default)]
    pub body: BodyConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaseSetting {
    Lower,
    Upper,
    #[default]
    Sentence,
    Camel,
    Title,
    Ignore,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SubjectConfig {
    #[serde(default = "default_subject_max_length")]
    pub max_length: usize,
    #[serde(default)]
    pub case: CaseSetting,
    #[serde(default = "default_forbid_endings")]
    pub forbid_endings: Vec<String>,
    #[serde(default)]
    pub require_imperative: bool,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        SubjectConfig {
            max_length: default_subject_max_length(),
            case: CaseSetting::default(),
            forbid_endings: default_forbid_endings(),
            require_imperative: false,
        }
    }
}

fn default_subject_max_length() -> usize {
    72
}

fn default_forbid_endings() -> Vec<String> {
    vec![".".to_string(), "!".to_string(), "?".to_string()]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BodyConfig {
    #[serde(default)]
    pub min_length: usize,
    #[serde(default)]
    pub min_lines: usize,
    #[serde(default = "default_true")]
    pub allow_signoff_only: bool,
    #[serde(default)]
    pub require_signoff: bool,
    #[serde(default)]
    pub min_signoff_count: usize,
}

impl Default for BodyConfig {
    fn default() -> Self {
        BodyConfig {
            min_length: 0,
            min_lines: 0,
            allow_signoff_only: true,
            require_signoff: false,
            min_signoff_count: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConventionalConfig {
    #[serde(default = "default_conventional_types")]
    pub types: Vec<String>,
    /// Empty list allows any scope.
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
    #[serde(default = "default_true")]
    pub allow_breaking: bool,
    #[serde(default)]
    pub require_scope: bool,
}

impl Default for ConventionalConfig {
    fn default() -> Self {
        ConventionalConfig {
            types: default_conventional_types(),
            scopes: Vec::new(),
            max_description_length: default_max_description_length(),
            allow_breaking: true,
            require_scope: false,
        }
    }
}

fn default_conventional_types() -> Vec<String> {
    [
        "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci", "chore",
        "revert",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_description_length() -> usize {
    72
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct JiraConfig {
    #[serde(default)]
    pub project_prefixes: Vec<String>,
    #[serde(default)]
    pub require_in_subject: bool,
    #[serde(default)]
    pub require_in_body: bool,
    /// Regex patterns for ticket keys that should not count as references.
    #[serde(default)]
    pub ignore_ticket_patterns: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SignatureConfig {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub verify_format: bool,
    /// "" accepts any family; "gpg" or "ssh" restricts to one.
    #[serde(default)]
    pub key_type: String,
    #[serde(default)]
    pub allowed_signers: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct IdentityConfig {
    /// Entries of the form "Name <email>"; empty allows all authors.
    #[serde(default)]
    pub allowed_authors: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpellConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub ignore_words: Vec<String>,
}

impl Default for SpellConfig {
    fn default() -> Self {
        SpellConfig {
            locale: default_locale(),
            ignore_words: Vec::new(),
        }
    }
}

fn default_locale() -> String {
    "en_US".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RepoConfig {
    #[serde(default = "default_reference_branch")]
    pub reference_branch: String,
    /// 0 disables the ahead check.
    #[serde(default)]
    pub max_commits_ahead: usize,
}

impl Default for RepoConfig {
    fn default() -> Self {
        RepoConfig {
            reference_branch: default_reference_branch(),
            max_commits_ahead: 0,
        }
    }
}

fn default_reference_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RulesConfig {
    #[serde(default)]
    pub enabled: Vec<String>,
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl GateConfig {
    /// Load configuration. An explicit path must exist; otherwise the project
    /// file at the repository root is tried, then the per-user file, then
    /// built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, Box<GateError>> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Box::new(GateError::new(
                    "Config file not found",
                    &format!("No such file: {}", path.display()),
                    GateErrorKind::Config,
                )));
            }
            return Self::load_file(path);
        }

        let project_path = Self::find_project_config_path();
        debug!("Project config - resolved path: {}", project_path.display());
        if project_path.exists() {
            return Self::load_file(&project_path);
        }

        let user_path = Self::find_user_config_path();
        debug!("User config - resolved path: {}", user_path.display());
        if user_path.exists() {
            return Self::load_file(&user_path);
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_file(path: &Path) -> Result<Self, Box<GateError>> {
        let content = fs::read_to_string(path).map_err(|e| {
            Box::new(GateError::new(
                "Failed to read config file",
                &format!("Could not read {}: {}", path.display(), e),
                GateErrorKind::Config,
            ))
        })?;

        let mut config: GateConfig = toml::from_str(&content).map_err(|e| {
            Box::new(GateError::new(
                "Failed to parse config file",
                &format!("Invalid TOML in {}: {}", path.display(), e),
                GateErrorKind::Config,
            ))
        })?;

        config.normalize();
        debug!("Config loaded from {}", path.display());
        Ok(config)
    }

    /// Project config lives at the repository root so every checkout sees the
    /// same policy. Falls back to the current directory outside a repo.
    fn find_project_config_path() -> PathBuf {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match Repository::discover(&cwd) {
            Ok(repo) => match repo.workdir() {
                Some(root) => root.join(PROJECT_CONFIG_FILE),
                None => cwd.join(PROJECT_CONFIG_FILE),
            },
            Err(_) => cwd.join(PROJECT_CONFIG_FILE),
        }
    }

    /// Per-user path: $XDG_CONFIG_HOME/commitgate/config.toml, or
    /// ~/.config/commitgate/config.toml (Windows: %APPDATA%/commitgate).
    fn find_user_config_path() -> PathBuf {
        #[cfg(windows)]
        {
            if let Ok(appdata) = env::var("APPDATA") {
                let mut p = PathBuf::from(appdata);
                p.push("commitgate");
                p.push("config.toml");
                return p;
            }
        }

        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            let mut p = PathBuf::from(xdg);
            p.push("commitgate");
            p.push("config.toml");
            return p;
        }

        let mut p = home::home_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push(".config");
        p.push("commitgate");
        p.push("config.toml");
        p
    }

    /// Rule names are matched case-insensitively everywhere.
    pub fn normalize(&mut self) {
        for name in self
            .rules
            .enabled
            .iter_mut()
            .chain(self.rules.disabled.iter_mut())
        {
            *name = name.to_lowercase();
        }
    }

    /// Reject configurations no rule set can sensibly run with. A failure
    /// here is an engine fault: no report is produced.
    pub fn validate(&self) -> Result<(), Box<GateError>> {
        if self.message.subject.max_length == 0 {
            return Err(config_fault(
                "Invalid subject settings",
                "message.subject.max_length must be positive",
            ));
        }
        if self.conventional.types.is_empty() {
            return Err(config_fault(
                "Invalid conventional settings",
                "conventional.types must list at least one type",
            ));
        }
        if self.conventional.max_description_length == 0 {
            return Err(config_fault(
                "Invalid conventional settings",
                "conventional.max_description_length must be positive",
            ));
        }
        match self.signature.key_type.as_str() {
            "" | "gpg" | "ssh" => {}
            other => {
                return Err(config_fault(
                    "Invalid signature settings",
                    &format!("signature.key_type must be \"gpg\" or \"ssh\", got {other:?}"),
                ));
            }
        }
        if self.repo.reference_branch.trim().is_empty() {
            return Err(config_fault(
                "Invalid repository settings",
                "repo.reference_branch must not be empty",
            ));
        }
        for pattern in &self.jira.ignore_ticket_patterns {
            if let Err(e) = Regex::new(pattern) {
                return Err(config_fault(
                    "Invalid JIRA settings",
                    &format!("ignore_ticket_patterns entry {pattern:?} is not a valid regex: {e}"),
                ));
            }
        }
        for name in self.rules.enabled.iter().chain(self.rules.disabled.iter()) {
            if !is_known_rule(name) {
                return Err(config_fault(
                    "Unknown rule name",
                    &format!("No rule is registered under {name:?}"),
                ));
            }
        }
        Ok(())
    }
}

fn config_fault(name: &str, message: &str) -> Box<GateError> {
    Box::new(GateError::new(name, message, GateErrorKind::Config))
}
