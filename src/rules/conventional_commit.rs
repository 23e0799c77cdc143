use crate::commit::Commit;
use crate::config::GateConfig;
use crate::conventional::{parse_subject, ParseFailure};
use crate::gate_error::GateError;
use crate::report::{ErrorCode, ValidationError};
use crate::rules::CommitRule;

pub(crate) struct ConventionalRule {
    name: String,
    description: String,
    types: Vec<String>,
    scopes: Vec<String>,
    max_description_length: usize,
    allow_breaking: bool,
    require_scope: bool,
}

impl ConventionalRule {
    pub fn new(config: &GateConfig) -> Result<Self, Box<GateError>> {
        let conventional = &config.conventional;
        Ok(ConventionalRule {
            name: "Conventional".to_string(),
            description: "Ensure the subject follows the Conventional Commit grammar".to_string(),
            types: conventional.types.clone(),
            scopes: conventional.scopes.clone(),
            max_description_length: conventional.max_description_length,
            allow_breaking: conventional.allow_breaking,
            require_scope: conventional.require_scope,
        })
    }
}

impl CommitRule for ConventionalRule {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_description(&self) -> &str {
        &self.description
    }

    /// Merge commits keep git's generated subject and are not rewritten to
    /// fit the grammar.
    fn applies(&self, commit: &Commit) -> bool {
        !commit.is_merge
    }

    fn check(&self, commit: &Commit) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let subject = commit.subject.as_str();

        if subject.trim().is_empty() {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::MissingConventionalSubject,
                "No subject to parse as a Conventional Commit",
            ));
            return errors;
        }

        let parsed = parse_subject(subject);
        if !parsed.is_valid {
            let code = match parsed.failure {
                Some(ParseFailure::EmptyDescription) => ErrorCode::EmptyDescription,
                _ => ErrorCode::InvalidConventionalFormat,
            };
            let reason = parsed
                .failure
                .map(|f| f.as_str())
                .unwrap_or("invalid");
            errors.push(
                ValidationError::new(
                    &self.name,
                    code,
                    "Subject does not match type(scope): description",
                )
                .with_context("actual", subject)
                .with_context("reason", reason),
            );
            return errors;
        }

        if !self.types.iter().any(|t| *t == parsed.commit_type) {
            errors.push(
                ValidationError::new(
                    &self.name,
                    ErrorCode::InvalidConventionalType,
                    &format!("Type {:?} is not allowed", parsed.commit_type),
                )
                .with_context("actual", parsed.commit_type.clone())
                .with_context("expected", self.types.join(", ")),
            );
        }

        match &parsed.scope {
            Some(scope) => {
                // Multi-scope commits separate scopes with commas; every
                // element is matched literally, one hit is enough.
                if !self.scopes.is_empty()
                    && !scope
                        .split(',')
                        .any(|element| self.scopes.iter().any(|s| s == element))
                {
                    errors.push(
                        ValidationError::new(
                            &self.name,
                            ErrorCode::InvalidConventionalScope,
                            &format!("Scope {scope:?} is not allowed"),
                        )
                        .with_context("actual", scope.clone())
                        .with_context("expected", self.scopes.join(", ")),
                    );
                }
            }
            None => {
                if self.require_scope {
                    errors.push(ValidationError::new(
                        &self.name,
                        ErrorCode::MissingScope,
                        "A scope is required but none was given",
                    ));
                }
            }
        }

        if parsed.breaking && !self.allow_breaking {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::DisallowedBreaking,
                "Breaking-change marker is not allowed",
            ));
        }

        let description_length = parsed.description.chars().count();
        if description_length > self.max_description_length {
            errors.push(
                ValidationError::new(
                    &self.name,
                    ErrorCode::DescriptionTooLong,
                    &format!(
                        "Description is {description_length} characters, {} over the limit",
                        description_length - self.max_description_length
                    ),
                )
                .with_context("actual", description_length.to_string())
                .with_context("expected", self.max_description_length.to_string()),
            );
        }

        errors
    }
}
