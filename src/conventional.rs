//! Shared Conventional Commit subject parser.
//!
//! One parser serves every rule that needs the `type(scope)!: description`
//! shape, so the grammar cannot drift between rules. The parse is a pure
//! function of the subject string.

use serde::Serialize;

/// Why a subject failed to parse as a Conventional Commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailure {
    MissingColon,
    BadSpacing,
    BadTypeCase,
    UnclosedScope,
    EmptyDescription,
}

impl ParseFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseFailure::MissingColon => "missing_colon",
            ParseFailure::BadSpacing => "bad_spacing",
            ParseFailure::BadTypeCase => "bad_type_case",
            ParseFailure::UnclosedScope => "unclosed_scope",
            ParseFailure::EmptyDescription => "empty_description",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalSubject {
    pub is_valid: bool,
    pub commit_type: String,
    pub scope: Option<String>,
    pub breaking: bool,
    pub description: String,
    /// Unicode scalar offset of the description within the subject.
    pub description_start_column: usize,
    pub failure: Option<ParseFailure>,
}

impl ConventionalSubject {
    fn invalid(failure: ParseFailure) -> Self {
        ConventionalSubject {
            is_valid: false,
            commit_type: String::new(),
            scope: None,
            breaking: false,
            description: String::new(),
            description_start_column: 0,
            failure: Some(failure),
        }
    }
}

fn is_scope_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ',' | '/' | '_' | '-')
}

/// Parse a subject line against `type(scope)!: description`.
///
/// `type` is strictly lowercase ASCII letters, the optional scope is
/// `[A-Za-z0-9,/_-]+` in parentheses, `!` marks a breaking change, and
/// exactly one space must follow the colon.
pub fn parse_subject(subject: &str) -> ConventionalSubject {
    let Some((head, tail)) = subject.split_once(':') else {
        return ConventionalSubject::invalid(ParseFailure::MissingColon);
    };

    let (head, breaking) = match head.strip_suffix('!') {
        Some(rest) => (rest, true),
        None => (head, false),
    };

    let (type_part, scope) = match head.split_once('(') {
        Some((type_part, scope_part)) => {
            let Some(scope) = scope_part.strip_suffix(')') else {
                return ConventionalSubject::invalid(ParseFailure::UnclosedScope);
            };
            if scope.is_empty() || !scope.chars().all(is_scope_char) {
                return ConventionalSubject::invalid(ParseFailure::UnclosedScope);
            }
            (type_part, Some(scope))
        }
        None => (head, None),
    };

    if type_part.is_empty() || !type_part.chars().all(|c| c.is_ascii_alphabetic()) {
        return ConventionalSubject::invalid(ParseFailure::MissingColon);
    }
    if type_part.chars().any(|c| c.is_ascii_uppercase()) {
        return ConventionalSubject::invalid(ParseFailure::BadTypeCase);
    }

    if tail.is_empty() {
        return ConventionalSubject::invalid(ParseFailure::EmptyDescription);
    }
    let Some(description) = tail.strip_prefix(' ') else {
        return ConventionalSubject::invalid(ParseFailure::BadSpacing);
    };
    if description.starts_with(' ') {
        return ConventionalSubject::invalid(ParseFailure::BadSpacing);
    }
    if description.trim().is_empty() {
        return ConventionalSubject::invalid(ParseFailure::EmptyDescription);
    }

    let prefix_scalars = subject.chars().count() - description.chars().count();
    ConventionalSubject {
        is_valid: true,
        commit_type: type_part.to_string(),
        scope: scope.map(|s| s.to_string()),
        breaking,
        description: description.to_string(),
        description_start_column: prefix_scalars,
        failure: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_subject(
        commit_type: &str,
        scope: Option<&str>,
        breaking: bool,
        description: &str,
    ) -> String {
        let mut out = commit_type.to_string();
        if let Some(scope) = scope {
            out.push('(');
            out.push_str(scope);
            out.push(')');
        }
        if breaking {
            out.push('!');
        }
        out.push_str(": ");
        out.push_str(description);
        out
    }

    #[test]
    fn test_plain_type() {
        let parsed = parse_subject("feat: add login");
        assert!(parsed.is_valid);
        assert_eq!(parsed.commit_type, "feat");
        assert_eq!(parsed.scope, None);
        assert!(!parsed.breaking);
        assert_eq!(parsed.description, "add login");
        assert_eq!(parsed.description_start_column, 6);
    }

    #[test]
    fn test_scoped_type() {
        let parsed = parse_subject("fix(auth): resolve token issue");
        assert!(parsed.is_valid);
        assert_eq!(parsed.commit_type, "fix");
        assert_eq!(parsed.scope.as_deref(), Some("auth"));
        assert_eq!(parsed.description, "resolve token issue");
    }

    #[test]
    fn test_breaking_marker() {
        let parsed = parse_subject("feat(api)!: drop v1 endpoints");
        assert!(parsed.is_valid);
        assert!(parsed.breaking);
        assert_eq!(parsed.scope.as_deref(), Some("api"));

        let parsed = parse_subject("feat!: drop v1 endpoints");
        assert!(parsed.is_valid);
        assert!(parsed.breaking);
        assert_eq!(parsed.scope, None);
    }

    #[test]
    fn test_multi_scope_characters() {
        let parsed = parse_subject("feat(auth,core/db_x-1): wire up");
        assert!(parsed.is_valid);
        assert_eq!(parsed.scope.as_deref(), Some("auth,core/db_x-1"));
    }

    #[test]
    fn test_missing_colon() {
        let parsed = parse_subject("add login support");
        assert!(!parsed.is_valid);
        assert_eq!(parsed.failure, Some(ParseFailure::MissingColon));
    }

    #[test]
    fn test_uppercase_type_rejected() {
        let parsed = parse_subject("Feat: add login");
        assert!(!parsed.is_valid);
        assert_eq!(parsed.failure, Some(ParseFailure::BadTypeCase));
    }

    #[test]
    fn test_spacing_must_be_exactly_one() {
        let parsed = parse_subject("feat:add login");
        assert_eq!(parsed.failure, Some(ParseFailure::BadSpacing));

        let parsed = parse_subject("feat:  add login");
        assert_eq!(parsed.failure, Some(ParseFailure::BadSpacing));
    }

    #[test]
    fn test_empty_description() {
        assert_eq!(
            parse_subject("feat:").failure,
            Some(ParseFailure::EmptyDescription)
        );
        assert_eq!(
            parse_subject("feat: ").failure,
            Some(ParseFailure::EmptyDescription)
        );
    }

    #[test]
    fn test_unclosed_scope() {
        let parsed = parse_subject("feat(auth: add login");
        assert_eq!(parsed.failure, Some(ParseFailure::UnclosedScope));

        let parsed = parse_subject("feat(): add login");
        assert_eq!(parsed.failure, Some(ParseFailure::UnclosedScope));

        let parsed = parse_subject("feat(a b): add login");
        assert_eq!(parsed.failure, Some(ParseFailure::UnclosedScope));
    }

    #[test]
    fn test_format_parse_round_trip() {
        let cases = [
            ("feat", Some("auth"), false, "add login"),
            ("fix", None, false, "resolve timeout"),
            ("refactor", Some("core,db"), true, "rework storage layer"),
            ("chore", None, true, "bump toolchain"),
        ];
        for (commit_type, scope, breaking, description) in cases {
            let parsed = parse_subject(&format_subject(commit_type, scope, breaking, description));
            assert!(parsed.is_valid);
            assert_eq!(parsed.commit_type, commit_type);
            assert_eq!(parsed.scope.as_deref(), scope);
            assert_eq!(parsed.breaking, breaking);
            assert_eq!(parsed.description, description);
        }
    }

    #[test]
    fn test_parser_is_pure() {
        let a = parse_subject("feat(auth): add login");
        let b = parse_subject("feat(auth): add login");
        assert_eq!(a, b);
    }

    #[test]
    fn test_description_column_skips_prefix() {
        let parsed = parse_subject("fix(core)!: añadir acceso");
        assert!(parsed.is_valid);
        assert_eq!(parsed.description_start_column, 12);
        assert_eq!(
            parsed.description,
            "fix(core)!: añadir acceso"
                .chars()
                .skip(parsed.description_start_column)
                .collect::<String>()
        );
    }
}
