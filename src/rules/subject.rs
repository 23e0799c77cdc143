use crate::commit::Commit;
use crate::config::{CaseSetting, GateConfig};
use crate::conventional::parse_subject;
use crate::gate_error::GateError;
use crate::report::{ErrorCode, ValidationError};
use crate::rules::imperative::{self, Mood};
use crate::rules::CommitRule;

pub(crate) struct SubjectRule {
    name: String,
    description: String,
    max_length: usize,
    case: CaseSetting,
    forbid_endings: Vec<String>,
    require_imperative: bool,
    /// When the conventional rule is active the `type(scope)!: ` prefix is
    /// stripped before case and mood inspection.
    strip_conventional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WordCase {
    Upper,
    Lower,
    Sentence,
    Camel,
    Mixed,
}

impl WordCase {
    fn as_str(self) -> &'static str {
        match self {
            WordCase::Upper => "upper",
            WordCase::Lower => "lower",
            WordCase::Sentence => "sentence",
            WordCase::Camel => "camel",
            WordCase::Mixed => "mixed",
        }
    }
}

impl SubjectRule {
    pub fn new(config: &GateConfig, conventional_active: bool) -> Result<Self, Box<GateError>> {
        let subject = &config.message.subject;
        Ok(SubjectRule {
            name: "Subject".to_string(),
            description: "Check subject length, case, suffix and mood".to_string(),
            max_length: subject.max_length,
            case: subject.case,
            forbid_endings: subject.forbid_endings.clone(),
            require_imperative: subject.require_imperative,
            strip_conventional: conventional_active,
        })
    }

    /// The text case and mood checks look at: the conventional description
    /// when a prefix is configured and parses, the whole subject otherwise.
    /// The bool reports whether stripping happened.
    fn inspected_text<'a>(&self, subject: &'a str) -> (&'a str, bool) {
        if self.strip_conventional {
            let parsed = parse_subject(subject);
            if parsed.is_valid {
                let column = subject
                    .char_indices()
                    .nth(parsed.description_start_column)
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                return (&subject[column..], true);
            }
        }
        (subject, false)
    }

    fn check_length(&self, subject: &str, errors: &mut Vec<ValidationError>) {
        let length = subject.chars().count();
        if length > self.max_length {
            errors.push(
                ValidationError::new(
                    &self.name,
                    ErrorCode::SubjectTooLong,
                    &format!(
                        "Subject is {length} characters, {} over the limit",
                        length - self.max_length
                    ),
                )
                .with_context("actual", length.to_string())
                .with_context("expected", self.max_length.to_string())
                .with_context("excess", (length - self.max_length).to_string()),
            );
        }
    }

    fn check_case(&self, text: &str, stripped: bool, errors: &mut Vec<ValidationError>) {
        if self.case == CaseSetting::Ignore {
            return;
        }
        let run: String = text
            .chars()
            .skip_while(|c| !c.is_alphabetic())
            .take_while(|c| c.is_alphabetic())
            .collect();
        if run.is_empty() {
            return;
        }

        let class = classify_case(&run);
        let (ok, code) = match self.case {
            CaseSetting::Lower => (class == WordCase::Lower, ErrorCode::WrongCaseLower),
            CaseSetting::Upper => (
                class == WordCase::Upper
                    || (run.chars().count() == 1 && class == WordCase::Sentence),
                ErrorCode::WrongCaseUpper,
            ),
            // Conventional descriptions are conventionally lowercase, so a
            // sentence expectation accepts both once the prefix is stripped.
            CaseSetting::Sentence | CaseSetting::Title => (
                class == WordCase::Sentence
                    || (run.chars().count() == 1 && class == WordCase::Upper)
                    || (stripped && class == WordCase::Lower),
                ErrorCode::WrongCaseSentence,
            ),
            // camelCase starts lowercase, so a plain lowercase word also fits.
            CaseSetting::Camel => (
                class == WordCase::Camel || class == WordCase::Lower,
                ErrorCode::WrongCaseLower,
            ),
            CaseSetting::Ignore => return,
        };

        if !ok {
            errors.push(
                ValidationError::new(
                    &self.name,
                    code,
                    &format!("Subject starts with {} case, expected {}", class.as_str(), case_label(self.case)),
                )
                .with_context("actual", class.as_str())
                .with_context("expected", case_label(self.case)),
            );
        }
    }

    fn check_suffix(&self, subject: &str, errors: &mut Vec<ValidationError>) {
        let Some(last) = subject.chars().next_back() else {
            return;
        };
        let last = last.to_string();
        if self.forbid_endings.iter().any(|e| *e == last) {
            errors.push(
                ValidationError::new(
                    &self.name,
                    ErrorCode::SubjectSuffix,
                    &format!("Subject ends with forbidden character {last:?}"),
                )
                .with_context("actual", last)
                .with_context("expected", self.forbid_endings.join(" ")),
            );
        }
    }

    fn check_imperative(&self, text: &str, errors: &mut Vec<ValidationError>) {
        let first_word: String = text
            .split_whitespace()
            .next()
            .unwrap_or("")
            .chars()
            .take_while(|c| c.is_alphabetic())
            .collect();
        if first_word.is_empty() {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::NoFirstWord,
                "No word found to check for imperative mood",
            ));
            return;
        }

        if let Some(finding) = imperative::classify(&first_word) {
            let (code, label) = match finding.mood {
                Mood::Past => (ErrorCode::PastTense, "past tense"),
                Mood::Gerund => (ErrorCode::Gerund, "a gerund"),
                Mood::ThirdPerson => (ErrorCode::ThirdPerson, "third person"),
            };
            errors.push(
                ValidationError::new(
                    &self.name,
                    code,
                    &format!("First word {first_word:?} is {label}, not imperative"),
                )
                .with_context("actual", first_word.to_lowercase())
                .with_context("expected", finding.suggestion.clone())
                .with_help(format!(
                    "Use \"{}\" instead of \"{}\"",
                    finding.suggestion,
                    first_word.to_lowercase()
                )),
            );
        }
    }
}

fn classify_case(run: &str) -> WordCase {
    let mut chars = run.chars();
    let Some(first) = chars.next() else {
        return WordCase::Mixed;
    };
    let rest: Vec<char> = chars.collect();
    let rest_all_lower = rest.iter().all(|c| c.is_lowercase());
    let rest_any_upper = rest.iter().any(|c| c.is_uppercase());

    if run.chars().all(|c| c.is_uppercase()) && run.chars().count() > 1 {
        WordCase::Upper
    } else if first.is_uppercase() && rest_all_lower {
        WordCase::Sentence
    } else if first.is_lowercase() && rest_all_lower {
        WordCase::Lower
    } else if first.is_lowercase() && rest_any_upper {
        WordCase::Camel
    } else {
        WordCase::Mixed
    }
}

fn case_label(setting: CaseSetting) -> &'static str {
    match setting {
        CaseSetting::Lower => "lower",
        CaseSetting::Upper => "upper",
        CaseSetting::Sentence => "sentence",
        CaseSetting::Camel => "camel",
        CaseSetting::Title => "title",
        CaseSetting::Ignore => "ignore",
    }
}

impl CommitRule for SubjectRule {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_description(&self) -> &str {
        &self.description
    }

    fn check(&self, commit: &Commit) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let subject = commit.subject.as_str();

        if subject.is_empty() {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::EmptySubject,
                "Subject is empty",
            ));
            return errors;
        }

        self.check_length(subject, &mut errors);

        let (inspected, stripped) = self.inspected_text(subject);
        self.check_case(inspected, stripped, &mut errors);
        self.check_suffix(subject, &mut errors);
        if self.require_imperative {
            self.check_imperative(inspected, &mut errors);
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(subject: &str) -> Commit {
        Commit::new("abc", subject, "A", "a@b.c", "", false)
    }

    fn rule(mutate: impl FnOnce(&mut GateConfig)) -> SubjectRule {
        let mut config = GateConfig::default();
        mutate(&mut config);
        SubjectRule::new(&config, false).unwrap()
    }

    fn codes(errors: &[ValidationError]) -> Vec<ErrorCode> {
        errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn test_default_sentence_case_passes() {
        let rule = rule(|_| {});
        assert!(rule.check(&commit("Add login support")).is_empty());
    }

    #[test]
    fn test_empty_subject_short_circuits() {
        let rule = rule(|c| c.message.subject.require_imperative = true);
        let errors = rule.check(&commit(""));
        assert_eq!(codes(&errors), vec![ErrorCode::EmptySubject]);
    }

    #[test]
    fn test_length_boundary() {
        let rule = rule(|c| c.message.subject.max_length = 10);
        assert!(rule.check(&commit("Abcdefghij")).is_empty());

        let errors = rule.check(&commit("Abcdefghijk"));
        assert_eq!(codes(&errors), vec![ErrorCode::SubjectTooLong]);
        assert_eq!(errors[0].context.get("excess").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_length_counts_scalars_not_bytes() {
        let rule = rule(|c| c.message.subject.max_length = 6);
        // Six Cyrillic scalars, twelve bytes.
        assert!(rule.check(&commit("Привет")).is_empty());
    }

    #[test]
    fn test_lower_case_setting() {
        let rule = rule(|c| c.message.subject.case = crate::config::CaseSetting::Lower);
        assert!(rule.check(&commit("add login")).is_empty());
        let errors = rule.check(&commit("Add login"));
        assert_eq!(codes(&errors), vec![ErrorCode::WrongCaseLower]);
    }

    #[test]
    fn test_upper_case_setting() {
        let rule = rule(|c| c.message.subject.case = crate::config::CaseSetting::Upper);
        assert!(rule.check(&commit("WIP rework")).is_empty());
        let errors = rule.check(&commit("wip rework"));
        assert_eq!(codes(&errors), vec![ErrorCode::WrongCaseUpper]);
    }

    #[test]
    fn test_sentence_case_rejects_lowercase() {
        let rule = rule(|_| {});
        let errors = rule.check(&commit("add login"));
        assert_eq!(codes(&errors), vec![ErrorCode::WrongCaseSentence]);
    }

    #[test]
    fn test_ignore_case_setting() {
        let rule = rule(|c| c.message.subject.case = crate::config::CaseSetting::Ignore);
        assert!(rule.check(&commit("wHATEVER gOES")).is_empty());
    }

    #[test]
    fn test_camel_accepts_lower_and_camel() {
        let rule = rule(|c| c.message.subject.case = crate::config::CaseSetting::Camel);
        assert!(rule.check(&commit("parseConfig rework")).is_empty());
        assert!(rule.check(&commit("rework parser")).is_empty());
        let errors = rule.check(&commit("Rework parser"));
        assert_eq!(codes(&errors), vec![ErrorCode::WrongCaseLower]);
    }

    #[test]
    fn test_forbidden_suffix() {
        let rule = rule(|_| {});
        let errors = rule.check(&commit("Add login."));
        assert_eq!(codes(&errors), vec![ErrorCode::SubjectSuffix]);
        assert!(rule.check(&commit("Add login")).is_empty());
    }

    #[test]
    fn test_case_and_mood_reported_independently() {
        let rule = rule(|c| {
            c.message.subject.case = crate::config::CaseSetting::Lower;
            c.message.subject.require_imperative = true;
        });
        let errors = rule.check(&commit("Added new feature"));
        assert_eq!(
            codes(&errors),
            vec![ErrorCode::WrongCaseLower, ErrorCode::PastTense]
        );
        assert_eq!(
            errors[1].context.get("expected").map(String::as_str),
            Some("add")
        );
    }

    #[test]
    fn test_gerund_and_third_person() {
        let rule = rule(|c| {
            c.message.subject.case = crate::config::CaseSetting::Ignore;
            c.message.subject.require_imperative = true;
        });
        assert_eq!(
            codes(&rule.check(&commit("Adding login"))),
            vec![ErrorCode::Gerund]
        );
        assert_eq!(
            codes(&rule.check(&commit("Fixes race"))),
            vec![ErrorCode::ThirdPerson]
        );
    }

    #[test]
    fn test_conventional_prefix_stripped_when_active() {
        let mut config = GateConfig::default();
        config.message.subject.require_imperative = true;
        config.message.subject.case = crate::config::CaseSetting::Lower;
        let rule = SubjectRule::new(&config, true).unwrap();

        // Case and mood inspect "add login", not "feat".
        assert!(rule.check(&commit("feat(auth): add login")).is_empty());

        let errors = rule.check(&commit("feat(auth): added login"));
        assert_eq!(codes(&errors), vec![ErrorCode::PastTense]);
    }

    #[test]
    fn test_sentence_accepts_lowercase_conventional_description() {
        let rule = SubjectRule::new(&GateConfig::default(), true).unwrap();
        assert!(rule.check(&commit("feat(auth): add login")).is_empty());
        assert!(rule.check(&commit("feat: Add login")).is_empty());
        // A non-conventional subject still needs a capital.
        let errors = rule.check(&commit("add login"));
        assert_eq!(codes(&errors), vec![ErrorCode::WrongCaseSentence]);
    }

    #[test]
    fn test_no_first_word() {
        let rule = rule(|c| {
            c.message.subject.case = crate::config::CaseSetting::Ignore;
            c.message.subject.require_imperative = true;
        });
        let errors = rule.check(&commit("1234 5678"));
        assert_eq!(codes(&errors), vec![ErrorCode::NoFirstWord]);
    }
}
