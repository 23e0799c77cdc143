use serde::Serialize;

/// Immutable snapshot of a single commit under validation.
///
/// `subject` is the first line of `message` without the trailing newline;
/// `body` is everything after the subject with exactly one separator newline
/// removed. Values never change after construction.
#[derive(Debug, Clone, Serialize)]
pub struct Commit {
    pub hash: String,
    pub subject: String,
    pub body: String,
    pub message: String,
    pub author: String,
    pub author_email: String,
    /// Armored signature text as stored by git, empty when unsigned.
    #[serde(skip)]
    pub signature: String,
    pub is_merge: bool,
}

impl Commit {
    pub fn new(
        hash: &str,
        message: &str,
        author: &str,
        author_email: &str,
        signature: &str,
        is_merge: bool,
    ) -> Self {
        let (subject, body) = split_message(message);
        Commit {
            hash: hash.to_string(),
            subject,
            body,
            message: message.to_string(),
            author: author.to_string(),
            author_email: author_email.to_string(),
            signature: signature.to_string(),
            is_merge,
        }
    }

    /// Build a preview commit from a commit-msg hook file. No hash, author
    /// identity taken from the caller (usually `git var` output or config).
    pub fn from_message_file(message: &str, author: &str, author_email: &str) -> Self {
        Commit::new("", message, author, author_email, "", false)
    }

    pub fn short_hash(&self) -> &str {
        if self.hash.len() >= 8 {
            &self.hash[..8]
        } else {
            &self.hash
        }
    }
}

fn split_message(message: &str) -> (String, String) {
    match message.split_once('\n') {
        Some((subject, rest)) => {
            let body = rest.strip_prefix('\n').unwrap_or(rest);
            (subject.to_string(), body.trim_end_matches('\n').to_string())
        }
        None => (message.to_string(), String::new()),
    }
}
