use crate::commit::Commit;
use crate::config::GateConfig;
use crate::gate_error::GateError;
use crate::report::{ErrorCode, ValidationError};
use crate::rules::CommitRule;
use base64::Engine;

const GPG_BEGIN: &str = "-----BEGIN PGP SIGNATURE-----";
const GPG_END: &str = "-----END PGP SIGNATURE-----";
const SSH_BEGIN: &str = "-----BEGIN SSH SIGNATURE-----";
const SSH_END: &str = "-----END SSH SIGNATURE-----";
const SSH_MAGIC: &[u8] = b"SSHSIG";

/// Format-only validation of the armored signature git stores with the
/// commit. Trust decisions belong to an out-of-process verifier; this rule
/// never touches a key store.
pub(crate) struct SignatureRule {
    name: String,
    description: String,
    verify_format: bool,
    key_type: String,
    allowed_signers: Vec<String>,
    enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignatureKind {
    Gpg,
    Ssh,
}

impl SignatureKind {
    fn as_str(self) -> &'static str {
        match self {
            SignatureKind::Gpg => "gpg",
            SignatureKind::Ssh => "ssh",
        }
    }
}

impl SignatureRule {
    pub fn new(config: &GateConfig) -> Result<Self, Box<GateError>> {
        let signature = &config.signature;
        Ok(SignatureRule {
            name: "Signature".to_string(),
            description: "Check the commit signature format".to_string(),
            verify_format: signature.verify_format,
            key_type: signature.key_type.clone(),
            allowed_signers: signature.allowed_signers.clone(),
            enabled: signature.required,
        })
    }

    fn check_gpg_armor(&self, signature: &str, errors: &mut Vec<ValidationError>) {
        if !signature.contains(GPG_END) {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::IncompleteGpgSignature,
                "GPG signature has no end marker",
            ));
            return;
        }
        if signature.trim().chars().count() <= 100 {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::IncompleteGpgSignature,
                "GPG signature is too short to be complete",
            ));
            return;
        }

        if decode_armor_body(signature, GPG_BEGIN, GPG_END).is_none() {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::InvalidGpgFormat,
                "GPG signature body is not valid armored base64",
            ));
        }
    }

    fn check_ssh_block(&self, signature: &str, errors: &mut Vec<ValidationError>) {
        if !signature.contains(SSH_END) {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::IncompleteSshSignature,
                "SSH signature has no end marker",
            ));
            return;
        }

        let Some(decoded) = decode_armor_body(signature, SSH_BEGIN, SSH_END) else {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::InvalidSshFormat,
                "SSH signature body is not valid base64",
            ));
            return;
        };

        if !decoded.starts_with(SSH_MAGIC) {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::InvalidSshFormat,
                "SSH signature does not begin with the SSHSIG magic",
            ));
            return;
        }
        if decoded.len() < 10 {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::IncompleteSshSignature,
                "SSH signature payload is truncated",
            ));
        }
    }

    fn check_signer(&self, commit: &Commit, errors: &mut Vec<ValidationError>) {
        if self.allowed_signers.is_empty() {
            return;
        }
        if commit.author_email.is_empty() {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::VerificationFailed,
                "Commit has no author email to match against allowed signers",
            ));
            return;
        }
        let allowed = self
            .allowed_signers
            .iter()
            .any(|signer| signer.eq_ignore_ascii_case(&commit.author_email));
        if !allowed {
            errors.push(
                ValidationError::new(
                    &self.name,
                    ErrorCode::KeyNotTrusted,
                    &format!("Signer {} is not in the allowed list", commit.author_email),
                )
                .with_context("actual", commit.author_email.clone()),
            );
        }
    }
}

/// Pull the base64 payload out of an armored block, skipping armor headers
/// and the CRC line.
fn decode_armor_body(signature: &str, begin: &str, end: &str) -> Option<Vec<u8>> {
    let mut in_block = false;
    let mut payload = String::new();
    for line in signature.lines() {
        let line = line.trim();
        if line == begin {
            in_block = true;
            continue;
        }
        if line == end {
            break;
        }
        if !in_block || line.is_empty() || line.contains(": ") {
            continue;
        }
        if line.starts_with('=') {
            // CRC24 checksum line terminates the payload.
            break;
        }
        payload.push_str(line);
    }
    if payload.is_empty() {
        return None;
    }
    base64::engine::general_purpose::STANDARD.decode(payload.as_bytes()).ok()
}

impl CommitRule for SignatureRule {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_description(&self) -> &str {
        &self.description
    }

    fn applies(&self, _commit: &Commit) -> bool {
        self.enabled
    }

    fn check(&self, commit: &Commit) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let signature = commit.signature.as_str();

        if signature.trim().is_empty() {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::MissingSignature,
                "Commit is not signed",
            ));
            return errors;
        }

        let kind = if signature.starts_with(GPG_BEGIN) {
            SignatureKind::Gpg
        } else if signature.starts_with(SSH_BEGIN) {
            SignatureKind::Ssh
        } else {
            errors.push(ValidationError::new(
                &self.name,
                ErrorCode::UnknownSignatureFormat,
                "Signature is neither a GPG nor an SSH block",
            ));
            return errors;
        };

        if !self.key_type.is_empty() && self.key_type != kind.as_str() {
            errors.push(
                ValidationError::new(
                    &self.name,
                    ErrorCode::DisallowedSignatureType,
                    &format!(
                        "Commit is signed with {}, {} required",
                        kind.as_str(),
                        self.key_type
                    ),
                )
                .with_context("actual", kind.as_str())
                .with_context("expected", self.key_type.clone()),
            );
        }

        if self.verify_format {
            match kind {
                SignatureKind::Gpg => self.check_gpg_armor(signature, &mut errors),
                SignatureKind::Ssh => self.check_ssh_block(signature, &mut errors),
            }
        }

        self.check_signer(commit, &mut errors);
        errors
    }
}
