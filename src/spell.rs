use crate::gate_error::{GateError, GateErrorKind};
use log::debug;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misspelling {
    pub word: String,
    /// Best correction the backend offered, empty when it had none.
    pub suggestion: String,
}

/// Dictionary capability consumed by the spell rule. Implementations must be
/// deterministic for a given locale.
pub trait SpellChecker {
    fn check_text(&self, text: &str) -> Result<Vec<Misspelling>, Box<GateError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Aspell,
    Hunspell,
}

/// Drives a system spell binary in ispell pipe mode (`-a`). Both aspell and
/// hunspell speak the protocol: one input line per request, `&`/`#` result
/// lines for unknown words.
pub struct SystemSpellChecker {
    program: PathBuf,
    backend: Backend,
    locale: String,
}

impl SystemSpellChecker {
    /// Find a usable backend on PATH. Aspell is preferred, hunspell is the
    /// fallback. Returns None when neither exists so callers can demote the
    /// spell rule instead of failing the run.
    pub fn locate(locale: &str) -> Option<Self> {
        if let Ok(program) = which::which("aspell") {
            debug!("Spell backend: aspell at {}", program.display());
            return Some(SystemSpellChecker {
                program,
                backend: Backend::Aspell,
                locale: locale.to_string(),
            });
        }
        if let Ok(program) = which::which("hunspell") {
            debug!("Spell backend: hunspell at {}", program.display());
            return Some(SystemSpellChecker {
                program,
                backend: Backend::Hunspell,
                locale: locale.to_string(),
            });
        }
        debug!("No spell backend found on PATH");
        None
    }
}

impl SpellChecker for SystemSpellChecker {
    fn check_text(&self, text: &str) -> Result<Vec<Misspelling>, Box<GateError>> {
        let mut command = Command::new(&self.program);
        match self.backend {
            Backend::Aspell => command.args(["-a", "--lang", &self.locale]),
            Backend::Hunspell => command.args(["-a", "-d", &self.locale]),
        };

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spell_fault(&format!("Failed to start spell backend: {e}")))?;

        {
            let Some(stdin) = child.stdin.as_mut() else {
                return Err(spell_fault("Spell backend has no stdin"));
            };
            for line in text.lines() {
                // The leading caret escapes ispell pipe-mode commands.
                writeln!(stdin, "^{line}")
                    .map_err(|e| spell_fault(&format!("Failed to write to backend: {e}")))?;
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| spell_fault(&format!("Spell backend failed: {e}")))?;
        if !output.status.success() {
            return Err(spell_fault(&format!(
                "Spell backend exited with {}",
                output.status
            )));
        }

        Ok(parse_pipe_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Ispell pipe output: `& <word> <n> <offset>: <sugg>, <sugg>` when the
/// backend has suggestions, `# <word> <offset>` when it has none.
fn parse_pipe_output(output: &str) -> Vec<Misspelling> {
    let mut found: Vec<Misspelling> = Vec::new();
    for line in output.lines() {
        let (word, suggestion) = if let Some(rest) = line.strip_prefix("& ") {
            let word = rest.split_whitespace().next().unwrap_or("");
            let suggestion = rest
                .split_once(": ")
                .and_then(|(_, tail)| tail.split(',').next())
                .unwrap_or("")
                .trim();
            (word, suggestion)
        } else if let Some(rest) = line.strip_prefix("# ") {
            (rest.split_whitespace().next().unwrap_or(""), "")
        } else {
            continue;
        };

        if !word.is_empty() && !found.iter().any(|m| m.word == word) {
            found.push(Misspelling {
                word: word.to_string(),
                suggestion: suggestion.to_string(),
            });
        }
    }
    found
}

fn spell_fault(message: &str) -> Box<GateError> {
    Box::new(GateError::new(
        "Spell backend failure",
        message,
        GateErrorKind::Spell,
    ))
}
