use colored::Colorize;
use std::fmt;

/// Which subsystem raised the fault. Rule findings are report values, not
/// errors; anything surfacing here aborts the run before a report is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateErrorKind {
    Config,
    Git,
    Engine,
    Spell,
    Io,
}

impl GateErrorKind {
    fn label(self) -> &'static str {
        match self {
            GateErrorKind::Config => "config",
            GateErrorKind::Git => "git",
            GateErrorKind::Engine => "engine",
            GateErrorKind::Spell => "spell",
            GateErrorKind::Io => "io",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GateError {
    name: String,
    message: String,
    kind: GateErrorKind,
}

impl GateError {
    pub fn new(name: &str, message: &str, kind: GateErrorKind) -> Self {
        GateError {
            name: name.to_string(),
            message: message.to_string(),
            kind,
        }
    }

    pub fn kind(&self) -> GateErrorKind {
        self.kind
    }

    pub fn print_error(&self) {
        eprintln!(
            "{} {}",
            format!("error[{}]: {}", self.kind.label(), self.name)
                .red()
                .bold(),
            self.message
        );
    }
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.label(), self.name, self.message)
    }
}

impl std::error::Error for GateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_kind_and_name() {
        let err = GateError::new("Bad reference branch", "empty string", GateErrorKind::Config);
        let rendered = err.to_string();
        assert!(rendered.contains("[config]"));
        assert!(rendered.contains("Bad reference branch"));
        assert!(rendered.contains("empty string"));
    }

    #[test]
    fn test_kind_accessor() {
        let err = GateError::new("x", "y", GateErrorKind::Git);
        assert_eq!(err.kind(), GateErrorKind::Git);
    }
}
