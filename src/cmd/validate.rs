use crate::commit::Commit;
use crate::config::GateConfig;
use crate::engine::{CancellationToken, Engine};
use crate::gate_error::{GateError, GateErrorKind};
use crate::output::{self, OutputFormat};
use crate::repo::{GitRepo, RepoState};
use crate::rules::resolve_active;
use crate::spell::{SpellChecker, SystemSpellChecker};
use clap::Args;
use log::{debug, info};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args, Default)]
pub struct ValidateArgs {
    /// Validate a commit message file (commit-msg hook mode)
    #[arg(long = "message-file", value_name = "PATH", conflicts_with_all = ["git_reference", "base_branch"])]
    pub message_file: Option<PathBuf>,

    /// Validate a single revision instead of HEAD
    #[arg(long = "git-reference", value_name = "REF", conflicts_with = "base_branch")]
    pub git_reference: Option<String>,

    /// Validate every commit in <REF>..HEAD
    #[arg(long = "base-branch", value_name = "REF")]
    pub base_branch: Option<String>,

    /// Load configuration from an explicit path
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Additional rules to enable (comma separated)
    #[arg(long = "rules", value_name = "NAMES", value_delimiter = ',')]
    pub enable: Vec<String>,

    /// Rules to disable (comma separated)
    #[arg(long = "disable", value_name = "NAMES", value_delimiter = ',')]
    pub disable: Vec<String>,

    /// Report format
    #[arg(long = "output", value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Run a validation pass and return the process exit code: 0 when everything
/// passed, 2 when validation failed. Engine faults bubble up as errors and
/// exit with 1 from main.
pub fn run(args: &ValidateArgs) -> Result<i32, Box<GateError>> {
    let mut config = GateConfig::load(args.config.as_deref())?;
    config.rules.enabled.extend(args.enable.iter().cloned());
    config.rules.disabled.extend(args.disable.iter().cloned());
    config.normalize();
    config.validate()?;

    let spell_checker: Option<Box<dyn SpellChecker>> =
        if resolve_active(&config).contains(&"spell") {
            SystemSpellChecker::locate(&config.spell.locale)
                .map(|checker| Box::new(checker) as Box<dyn SpellChecker>)
        } else {
            None
        };

    let engine = Engine::new(&config, spell_checker)?;
    let repo = GitRepo::discover().ok();

    let commits = collect_commits(args, repo.as_ref())?;
    info!("Validating {} commits", commits.len());

    let token = CancellationToken::new();
    let report = engine.run(
        &commits,
        repo.as_ref().map(|r| r as &dyn RepoState),
        &token,
    );

    let rendered = output::render(&report, args.output)?;
    print!("{rendered}");

    Ok(if report.summary.all_passed { 0 } else { 2 })
}

fn collect_commits(
    args: &ValidateArgs,
    repo: Option<&GitRepo>,
) -> Result<Vec<Commit>, Box<GateError>> {
    if let Some(path) = &args.message_file {
        let raw = fs::read_to_string(path).map_err(|e| {
            Box::new(GateError::new(
                "Failed to read message file",
                &format!("Could not read {}: {}", path.display(), e),
                GateErrorKind::Io,
            ))
        })?;
        let message = strip_comment_lines(&raw);
        let (author, email) = repo
            .map(|r| r.default_identity())
            .unwrap_or_default();
        debug!("Validating message file {}", path.display());
        return Ok(vec![Commit::from_message_file(&message, &author, &email)]);
    }

    let repo = repo.ok_or_else(|| {
        Box::new(GateError::new(
            "No repository",
            "Commit validation needs a git repository unless --message-file is used",
            GateErrorKind::Git,
        ))
    })?;

    if let Some(base) = &args.base_branch {
        return repo.commits_in_range(base);
    }

    let reference = args.git_reference.as_deref().unwrap_or("HEAD");
    Ok(vec![repo.resolve_commit(reference)?])
}

/// Git strips comment lines when finalizing a message; the preview should
/// see the same text a commit would.
fn strip_comment_lines(message: &str) -> String {
    let kept: Vec<&str> = message
        .lines()
        .filter(|line| !line.starts_with('#'))
        .collect();
    kept.join("\n").trim_end().to_string()
}
