use crate::commit::Commit;
use crate::gate_error::{GateError, GateErrorKind};
use git2::Repository;
use log::debug;
use std::path::Path;

/// Repository state consumed by repository-scoped rules. Error strings are
/// classified by substring on the rule side, so implementations pass the
/// underlying message through untouched.
pub trait RepoState {
    fn commits_ahead_count(&self, reference: &str) -> Result<usize, String>;
}

pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    pub fn discover() -> Result<Self, Box<GateError>> {
        let repo = Repository::discover(Path::new(".")).map_err(|e| {
            Box::new(GateError::new(
                "Failed to open repository",
                &format!("Not inside a git repository: {}", e.message()),
                GateErrorKind::Git,
            ))
        })?;
        Ok(GitRepo { repo })
    }

    /// Author identity from the repository configuration, for message-file
    /// previews that have no commit of their own.
    pub fn default_identity(&self) -> (String, String) {
        match self.repo.signature() {
            Ok(sig) => (
                sig.name().unwrap_or("").to_string(),
                sig.email().unwrap_or("").to_string(),
            ),
            Err(_) => (String::new(), String::new()),
        }
    }

    /// A single commit by revision ("HEAD", a hash, a branch name).
    pub fn resolve_commit(&self, reference: &str) -> Result<Commit, Box<GateError>> {
        let commit = self
            .repo
            .revparse_single(reference)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| git_fault(&format!("Failed to resolve {reference:?}"), e))?;
        Ok(self.build_commit(&commit))
    }

    /// Commits in `base..HEAD`, newest first.
    pub fn commits_in_range(&self, base: &str) -> Result<Vec<Commit>, Box<GateError>> {
        let base_object = self
            .repo
            .revparse_single(base)
            .map_err(|e| git_fault(&format!("Failed to resolve {base:?}"), e))?;
        let mut walk = self
            .repo
            .revwalk()
            .map_err(|e| git_fault("Failed to start revision walk", e))?;
        walk.push_head()
            .map_err(|e| git_fault("Failed to push HEAD onto the walk", e))?;
        walk.hide(base_object.id())
            .map_err(|e| git_fault(&format!("Failed to hide {base:?}"), e))?;

        let mut commits = Vec::new();
        for oid in walk {
            let oid = oid.map_err(|e| git_fault("Revision walk failed", e))?;
            let commit = self
                .repo
                .find_commit(oid)
                .map_err(|e| git_fault("Failed to load commit", e))?;
            commits.push(self.build_commit(&commit));
        }
        debug!("Collected {} commits from {base}..HEAD", commits.len());
        Ok(commits)
    }

    fn build_commit(&self, commit: &git2::Commit) -> Commit {
        let author = commit.author();
        let signature = self
            .repo
            .extract_signature(&commit.id(), None)
            .map(|(sig, _)| String::from_utf8_lossy(&sig).to_string())
            .unwrap_or_default();
        Commit::new(
            &commit.id().to_string(),
            commit.message().unwrap_or(""),
            author.name().unwrap_or(""),
            author.email().unwrap_or(""),
            &signature,
            commit.parent_count() > 1,
        )
    }
}

impl RepoState for GitRepo {
    fn commits_ahead_count(&self, reference: &str) -> Result<usize, String> {
        let reference_commit = self
            .repo
            .revparse_single(reference)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| e.message().to_string())?;
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| e.message().to_string())?;
        let (ahead, _behind) = self
            .repo
            .graph_ahead_behind(head.id(), reference_commit.id())
            .map_err(|e| e.message().to_string())?;
        Ok(ahead)
    }
}

fn git_fault(name: &str, error: git2::Error) -> Box<GateError> {
    Box::new(GateError::new(name, error.message(), GateErrorKind::Git))
}
