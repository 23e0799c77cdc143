use crate::gate_error::{GateError, GateErrorKind};
use colored::Colorize;
use git2::Repository;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

const HOOK_NAME: &str = "commit-msg";
const HOOK_MARKER: &str = "# installed by commitgate";

const HOOK_SCRIPT: &str = "#!/bin/sh\n# installed by commitgate\nexec commitgate validate --message-file \"$1\"\n";

fn hooks_dir() -> Result<PathBuf, Box<GateError>> {
    let repo = Repository::discover(Path::new(".")).map_err(|e| {
        Box::new(GateError::new(
            "Failed to open repository",
            &format!("Not inside a git repository: {}", e.message()),
            GateErrorKind::Git,
        ))
    })?;
    Ok(repo.path().join("hooks"))
}

pub fn install() -> Result<(), Box<GateError>> {
    let dir = hooks_dir()?;
    let hook_path = dir.join(HOOK_NAME);
    debug!("Installing hook at {}", hook_path.display());

    if hook_path.exists() {
        let existing = fs::read_to_string(&hook_path).unwrap_or_default();
        if !existing.contains(HOOK_MARKER) {
            return Err(Box::new(GateError::new(
                "Hook already exists",
                &format!(
                    "{} was not installed by commitgate; remove it first",
                    hook_path.display()
                ),
                GateErrorKind::Io,
            )));
        }
    }

    fs::create_dir_all(&dir).map_err(|e| io_fault("Failed to create hooks directory", &e))?;
    fs::write(&hook_path, HOOK_SCRIPT).map_err(|e| io_fault("Failed to write hook", &e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut permissions = fs::metadata(&hook_path)
            .map_err(|e| io_fault("Failed to read hook metadata", &e))?
            .permissions();
        permissions.set_mode(permissions.mode() | 0o755);
        fs::set_permissions(&hook_path, permissions)
            .map_err(|e| io_fault("Failed to make hook executable", &e))?;
    }

    println!(
        "{} {}",
        "Installed".green().bold(),
        hook_path.display()
    );
    Ok(())
}

pub fn remove() -> Result<(), Box<GateError>> {
    let hook_path = hooks_dir()?.join(HOOK_NAME);

    if !hook_path.exists() {
        println!("{}", "No commit-msg hook installed".yellow());
        return Ok(());
    }

    let existing = fs::read_to_string(&hook_path).unwrap_or_default();
    if !existing.contains(HOOK_MARKER) {
        return Err(Box::new(GateError::new(
            "Refusing to remove hook",
            &format!(
                "{} was not installed by commitgate",
                hook_path.display()
            ),
            GateErrorKind::Io,
        )));
    }

    fs::remove_file(&hook_path).map_err(|e| io_fault("Failed to remove hook", &e))?;
    println!("{} {}", "Removed".green().bold(), hook_path.display());
    Ok(())
}

fn io_fault(name: &str, error: &std::io::Error) -> Box<GateError> {
    Box::new(GateError::new(name, &error.to_string(), GateErrorKind::Io))
}
