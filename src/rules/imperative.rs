//! Mood classification for the first word of a commit description.
//!
//! Known inflections carry their exact base form so suggestions are real
//! words; anything else falls back to suffix analysis with an exception list
//! for base forms that merely look inflected.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Past,
    Gerund,
    ThirdPerson,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodFinding {
    pub mood: Mood,
    pub suggestion: String,
}

const PAST_TENSE: &[(&str, &str)] = &[
    ("added", "add"),
    ("fixed", "fix"),
    ("changed", "change"),
    ("updated", "update"),
    ("removed", "remove"),
    ("refactored", "refactor"),
    ("improved", "improve"),
    ("implemented", "implement"),
    ("enhanced", "enhance"),
    ("resolved", "resolve"),
    ("corrected", "correct"),
];

const GERUND: &[(&str, &str)] = &[
    ("adding", "add"),
    ("fixing", "fix"),
    ("changing", "change"),
    ("updating", "update"),
    ("removing", "remove"),
    ("refactoring", "refactor"),
    ("improving", "improve"),
    ("implementing", "implement"),
    ("enhancing", "enhance"),
    ("resolving", "resolve"),
    ("correcting", "correct"),
];

const THIRD_PERSON: &[(&str, &str)] = &[
    ("adds", "add"),
    ("fixes", "fix"),
    ("changes", "change"),
    ("updates", "update"),
    ("removes", "remove"),
    ("refactors", "refactor"),
    ("improves", "improve"),
    ("implements", "implement"),
    ("enhances", "enhance"),
    ("resolves", "resolve"),
    ("corrects", "correct"),
];

/// Base forms ending in -ed. These read as past tense but are imperatives.
const BASE_FORMS_ED: &[&str] = &[
    "need", "seed", "proceed", "exceed", "succeed", "embed", "feed", "speed", "shed",
];

/// Base forms ending in -ing.
const BASE_FORMS_ING: &[&str] = &["bring", "ping", "ring", "sing", "spring", "string", "swing"];

/// First words ending in -s that are not third-person verbs.
const BASE_FORMS_S: &[&str] = &["always", "perhaps", "plus", "canvas", "alias", "css", "https"];

fn lookup(table: &[(&str, &str)], word: &str) -> Option<String> {
    table
        .iter()
        .find(|(inflected, _)| *inflected == word)
        .map(|(_, base)| (*base).to_string())
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn collapse_double(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    if chars.len() >= 2 {
        let last = chars[chars.len() - 1];
        if last == chars[chars.len() - 2] && is_consonant(last) {
            return chars[..chars.len() - 1].iter().collect();
        }
    }
    stem.to_string()
}

fn strip_past(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ied") {
        return format!("{stem}y");
    }
    let stem = word.strip_suffix("ed").unwrap_or(word);
    collapse_double(stem)
}

fn strip_gerund(word: &str) -> String {
    let stem = word.strip_suffix("ing").unwrap_or(word);
    collapse_double(stem)
}

fn strip_third_person(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["ches", "shes", "sses", "xes", "zes", "oes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

/// Classify a first word. Returns `None` when the word reads as imperative.
pub fn classify(word: &str) -> Option<MoodFinding> {
    let word = word.to_lowercase();

    if let Some(suggestion) = lookup(PAST_TENSE, &word) {
        return Some(MoodFinding {
            mood: Mood::Past,
            suggestion,
        });
    }
    if let Some(suggestion) = lookup(GERUND, &word) {
        return Some(MoodFinding {
            mood: Mood::Gerund,
            suggestion,
        });
    }
    if let Some(suggestion) = lookup(THIRD_PERSON, &word) {
        return Some(MoodFinding {
            mood: Mood::ThirdPerson,
            suggestion,
        });
    }

    if word.len() >= 4 && word.ends_with("ed") && !BASE_FORMS_ED.contains(&word.as_str()) {
        return Some(MoodFinding {
            mood: Mood::Past,
            suggestion: strip_past(&word),
        });
    }
    if word.len() >= 5 && word.ends_with("ing") && !BASE_FORMS_ING.contains(&word.as_str()) {
        return Some(MoodFinding {
            mood: Mood::Gerund,
            suggestion: strip_gerund(&word),
        });
    }
    if word.len() >= 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
        && !word.ends_with("os")
        && !BASE_FORMS_S.contains(&word.as_str())
    {
        return Some(MoodFinding {
            mood: Mood::ThirdPerson,
            suggestion: strip_third_person(&word),
        });
    }

    None
}
