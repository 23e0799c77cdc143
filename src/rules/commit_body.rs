use crate::commit::Commit;
use crate::config::GateConfig;
use crate::gate_error::GateError;
use crate::report::{ErrorCode, ValidationError};
use crate::rules::signoff::is_trailer_line;
use crate::rules::CommitRule;

pub(crate) struct CommitBodyRule {
    name: String,
    description: String,
    min_length: usize,
    min_lines: usize,
    allow_signoff_only: bool,
}

impl CommitBodyRule {
    pub fn new(config: &GateConfig) -> Result<Self, Box<GateError>> {
        let body = &config.message.body;
        Ok(CommitBodyRule {
            name: "CommitBody".to_string(),
            description: "Require substantial commit body content".to_string(),
            min_length: body.min_length,
            min_lines: body.min_lines,
            allow_signoff_only: body.allow_signoff_only,
        })
    }
}

impl CommitRule for CommitBodyRule {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_description(&self) -> &str {
        &self.description
    }

    fn check(&self, commit: &Commit) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let trimmed = commit.body.trim();

        if self.min_length > 0 {
            if trimmed.is_empty() {
                errors.push(
                    ValidationError::new(
                        &self.name,
                        ErrorCode::MissingBody,
                        "Commit has no body",
                    )
                    .with_context("expected", self.min_length.to_string()),
                );
            } else {
                let length = trimmed.chars().count();
                if length < self.min_length {
                    errors.push(
                        ValidationError::new(
                            &self.name,
                            ErrorCode::BodyTooShort,
                            &format!(
                                "Body is {length} characters, at least {} required",
                                self.min_length
                            ),
                        )
                        .with_context("actual", length.to_string())
                        .with_context("expected", self.min_length.to_string()),
                    );
                }
            }
        }

        if self.min_lines > 0 && !trimmed.is_empty() {
            let lines = trimmed.lines().filter(|l| !l.trim().is_empty()).count();
            if lines < self.min_lines {
                errors.push(
                    ValidationError::new(
                        &self.name,
                        ErrorCode::BodyTooShort,
                        &format!("Body has {lines} lines, at least {} required", self.min_lines),
                    )
                    .with_context("actual", lines.to_string())
                    .with_context("expected", self.min_lines.to_string()),
                );
            }
        }

        if !self.allow_signoff_only && !trimmed.is_empty() {
            let only_trailers = trimmed
                .lines()
                .filter(|l| !l.trim().is_empty())
                .all(is_trailer_line);
            if only_trailers {
                errors.push(ValidationError::new(
                    &self.name,
                    ErrorCode::InvalidBody,
                    "Body consists of trailers only",
                ));
            }
        }

        errors
    }
}
