use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub struct TestEnv {
    pub temp_dir: TempDir,
    pub repo_path: PathBuf,
}

impl TestEnv {
    /// A fresh git repository with a configured user, on branch `main`.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = TempDir::with_prefix("commitgate_test_")?;
        let repo_path = temp_dir.path().to_path_buf();

        let output = Command::new("git")
            .args(["init", "-b", "main"])
            .current_dir(&repo_path)
            .output()?;
        if !output.status.success() {
            return Err("Failed to initialize git repository".into());
        }

        let test_env = TestEnv {
            temp_dir,
            repo_path,
        };
        test_env.setup_git_user("Test User", "test@example.com")?;

        Ok(test_env)
    }

    /// A bare directory without a repository, for message-file mode.
    pub fn without_repo() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = TempDir::with_prefix("commitgate_test_")?;
        let repo_path = temp_dir.path().to_path_buf();
        Ok(TestEnv {
            temp_dir,
            repo_path,
        })
    }

    pub fn setup_git_user(
        &self,
        name: &str,
        email: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Command::new("git")
            .args(["config", "user.name", name])
            .current_dir(&self.repo_path)
            .output()?;

        Command::new("git")
            .args(["config", "user.email", email])
            .current_dir(&self.repo_path)
            .output()?;

        Ok(())
    }

    pub fn create_file(
        &self,
        relative_path: &str,
        content: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let file_path = self.repo_path.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(file_path, content)?;
        Ok(())
    }

    pub fn commit_file(
        &self,
        relative_path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.create_file(relative_path, content)?;
        let output = Command::new("git")
            .args(["add", relative_path])
            .current_dir(&self.repo_path)
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("Failed to stage {relative_path}: {stderr}").into());
        }
        self.commit(message)
    }

    pub fn commit(&self, message: &str) -> Result<(), Box<dyn std::error::Error>> {
        let output = Command::new("git")
            .args(["commit", "--allow-empty", "-m", message])
            .current_dir(&self.repo_path)
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("Failed to commit: {stderr}").into());
        }
        Ok(())
    }

    pub fn checkout_new_branch(&self, name: &str) -> Result<(), Box<dyn std::error::Error>> {
        let output = Command::new("git")
            .args(["checkout", "-b", name])
            .current_dir(&self.repo_path)
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("Failed to checkout {name}: {stderr}").into());
        }
        Ok(())
    }

    /// Run the commitgate binary inside the environment. XDG_CONFIG_HOME is
    /// pinned to the temp directory so a developer's own config cannot leak
    /// into the test.
    pub fn run_commitgate(
        &self,
        args: &[&str],
    ) -> Result<std::process::Output, Box<dyn std::error::Error>> {
        let output = assert_cmd::Command::cargo_bin("commitgate")?
            .args(args)
            .current_dir(&self.repo_path)
            .env("XDG_CONFIG_HOME", self.temp_dir.path())
            .env("NO_COLOR", "1")
            .output()?;
        Ok(output)
    }

    pub fn path(&self) -> &Path {
        &self.repo_path
    }
}
