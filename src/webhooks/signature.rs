//! GitHub webhook signature verification.
//!
//! GitHub signs each delivery body with the webhook's shared secret and sends
//! the result in two headers:
//!
//! - `X-Hub-Signature`: HMAC-SHA1, formatted as `sha1=<hex>`
//! - `X-Hub-Signature-256`: HMAC-SHA256, formatted as `sha256=<hex>`
//!
//! Verification runs before the body is parsed; a forged delivery never
//! reaches a handler.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// The HMAC digest a signature header was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// `X-Hub-Signature: sha1=<hex>`
    Sha1,
    /// `X-Hub-Signature-256: sha256=<hex>`
    Sha256,
}

impl SignatureAlgorithm {
    /// The (lowercase) header GitHub carries this signature in.
    pub fn header_name(self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "x-hub-signature",
            SignatureAlgorithm::Sha256 => "x-hub-signature-256",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "sha1=",
            SignatureAlgorithm::Sha256 => "sha256=",
        }
    }

    /// Length in bytes of the raw digest.
    #[cfg(test)]
    fn output_len(self) -> usize {
        match self {
            SignatureAlgorithm::Sha1 => 20,
            SignatureAlgorithm::Sha256 => 32,
        }
    }
}

/// Parses a signature header (e.g. `"sha1=abc123..."`) into raw bytes.
///
/// Returns `None` for malformed headers (missing or wrong prefix, invalid
/// hex). Never panics.
///
/// # Examples
///
/// ```
/// use ideal_octo_garbanzo::webhooks::{SignatureAlgorithm, parse_signature_header};
///
/// assert!(parse_signature_header("sha1=abcd1234", SignatureAlgorithm::Sha1).is_some());
///
/// // Wrong algorithm for the header
/// assert!(parse_signature_header("sha256=abcd1234", SignatureAlgorithm::Sha1).is_none());
///
/// // Bad hex
/// assert!(parse_signature_header("sha1=xyz", SignatureAlgorithm::Sha1).is_none());
/// ```
pub fn parse_signature_header(header: &str, algorithm: SignatureAlgorithm) -> Option<Vec<u8>> {
    let hex_sig = header.trim().strip_prefix(algorithm.prefix())?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC of a payload using the given secret.
///
/// Mostly useful for tests and for signing outgoing fixtures.
pub fn compute_signature(payload: &[u8], secret: &[u8], algorithm: SignatureAlgorithm) -> Vec<u8> {
    match algorithm {
        SignatureAlgorithm::Sha1 => {
            let mut mac =
                HmacSha1::new_from_slice(secret).expect("HMAC can take key of any size");
            mac.update(payload);
            mac.finalize().into_bytes().to_vec()
        }
        SignatureAlgorithm::Sha256 => {
            let mut mac =
                HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
            mac.update(payload);
            mac.finalize().into_bytes().to_vec()
        }
    }
}

/// Formats a raw signature as a GitHub-style header value.
pub fn format_signature_header(signature: &[u8], algorithm: SignatureAlgorithm) -> String {
    format!("{}{}", algorithm.prefix(), hex::encode(signature))
}

/// Verifies a webhook signature header against the payload and secret.
///
/// Uses constant-time comparison via [`Mac::verify_slice`].
///
/// # Examples
///
/// ```
/// use ideal_octo_garbanzo::webhooks::{
///     SignatureAlgorithm, compute_signature, format_signature_header, verify_signature,
/// };
///
/// let payload = b"Hello, World!";
/// let secret = b"my-secret-key";
/// let alg = SignatureAlgorithm::Sha1;
///
/// let header = format_signature_header(&compute_signature(payload, secret, alg), alg);
///
/// assert!(verify_signature(payload, &header, secret, alg));
/// assert!(!verify_signature(payload, &header, b"wrong-secret", alg));
/// ```
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &[u8],
    algorithm: SignatureAlgorithm,
) -> bool {
    let Some(expected) = parse_signature_header(signature_header, algorithm) else {
        return false;
    };

    match algorithm {
        SignatureAlgorithm::Sha1 => match HmacSha1::new_from_slice(secret) {
            Ok(mut mac) => {
                mac.update(payload);
                mac.verify_slice(&expected).is_ok()
            }
            Err(_) => false,
        },
        SignatureAlgorithm::Sha256 => match HmacSha256::new_from_slice(secret) {
            Ok(mut mac) => {
                mac.update(payload);
                mac.verify_slice(&expected).is_ok()
            }
            Err(_) => false,
        },
    }
}
