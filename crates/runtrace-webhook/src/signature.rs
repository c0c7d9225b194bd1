//! Webhook signature verification.
//!
//! GitHub signs each delivery with the configured secret and sends the
//! digest in `X-Hub-Signature-256` (`sha256=<hex>`) and, for older hooks,
//! `X-Hub-Signature` (`sha1=<hex>`).

use hmac::{Hmac, Mac};
use runtrace_core::{Error, Result};
use sha1::Sha1;
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    Sha256,
    Sha1,
}

impl SignatureScheme {
    pub fn prefix(&self) -> &'static str {
        match self {
            SignatureScheme::Sha256 => "sha256=",
            SignatureScheme::Sha1 => "sha1=",
        }
    }

    pub fn header_name(&self) -> &'static str {
        match self {
            SignatureScheme::Sha256 => "X-Hub-Signature-256",
            SignatureScheme::Sha1 => "X-Hub-Signature",
        }
    }

    /// Header value GitHub would send for `body` signed with `secret`.
    pub fn sign(&self, secret: &str, body: &[u8]) -> String {
        let digest = match self {
            SignatureScheme::Sha256 => HmacSha256::new_from_slice(secret.as_bytes())
                .map(|mac| mac.chain_update(body).finalize().into_bytes().to_vec()),
            SignatureScheme::Sha1 => HmacSha1::new_from_slice(secret.as_bytes())
                .map(|mac| mac.chain_update(body).finalize().into_bytes().to_vec()),
        };
        // HMAC accepts keys of any length, so the error arm is unreachable.
        format!("{}{}", self.prefix(), hex::encode(digest.unwrap_or_default()))
    }
}

/// Check one signature header against `body`.
///
/// Returns `false` when the header is empty, lacks the scheme prefix, is not
/// lowercase hex, or does not match. The comparison is constant-time.
pub fn verify(scheme: SignatureScheme, secret: &str, header: &str, body: &[u8]) -> bool {
    let Some(received) = header.strip_prefix(scheme.prefix()) else {
        debug!(header = scheme.header_name(), "Signature header missing scheme prefix");
        return false;
    };
    // GitHub sends lowercase hex; the digest text must match exactly.
    if received.bytes().any(|b| b.is_ascii_uppercase()) {
        debug!(header = scheme.header_name(), "Signature header is not lowercase hex");
        return false;
    }
    let Ok(signature) = hex::decode(received) else {
        debug!(header = scheme.header_name(), "Signature header is not valid hex");
        return false;
    };

    match scheme {
        SignatureScheme::Sha256 => HmacSha256::new_from_slice(secret.as_bytes())
            .map(|mac| mac.chain_update(body).verify_slice(&signature).is_ok())
            .unwrap_or(false),
        SignatureScheme::Sha1 => HmacSha1::new_from_slice(secret.as_bytes())
            .map(|mac| mac.chain_update(body).verify_slice(&signature).is_ok())
            .unwrap_or(false),
    }
}

/// Outcome of checking a delivery's signature headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authenticity {
    /// No secret is configured, so nothing was checked.
    Unchecked,
    Verified(SignatureScheme),
    Mismatch(SignatureScheme),
    /// A secret is configured but the delivery carried no signature header.
    Missing,
}

/// Raw webhook delivery as seen by the core: body plus signature headers.
#[derive(Debug, Clone, Copy)]
pub struct WebhookRequest<'a> {
    pub body: &'a [u8],
    pub signature_256: Option<&'a str>,
    pub signature: Option<&'a str>,
}

impl<'a> WebhookRequest<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            body,
            signature_256: None,
            signature: None,
        }
    }

    pub fn with_signature_256(mut self, value: &'a str) -> Self {
        self.signature_256 = Some(value);
        self
    }

    pub fn with_signature(mut self, value: &'a str) -> Self {
        self.signature = Some(value);
        self
    }
}

/// Check the headers of a delivery. SHA-256 wins when present; SHA-1 is only
/// consulted when the SHA-256 header is absent.
pub fn authenticate<'a>(secret: &str, request: &WebhookRequest<'a>) -> Authenticity {
    let present = |h: Option<&'a str>| h.filter(|v| !v.is_empty());

    let (scheme, header) = match (present(request.signature_256), present(request.signature)) {
        (Some(header), _) => (SignatureScheme::Sha256, header),
        (None, Some(header)) => (SignatureScheme::Sha1, header),
        (None, None) => return Authenticity::Missing,
    };

    if verify(scheme, secret, header, request.body) {
        Authenticity::Verified(scheme)
    } else {
        Authenticity::Mismatch(scheme)
    }
}

/// Receiver-wide signature policy.
#[derive(Debug, Clone, Default)]
pub struct SignaturePolicy {
    secret: String,
    require_signature: bool,
}

impl SignaturePolicy {
    pub fn new(secret: impl Into<String>, require_signature: bool) -> Self {
        Self {
            secret: secret.into(),
            require_signature,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Whether unsigned deliveries are rejected.
    pub fn requires_signature(&self) -> bool {
        self.is_enabled() && self.require_signature
    }

    /// Apply the policy to a delivery.
    ///
    /// An unsigned delivery is only rejected when `require_signature` is set;
    /// otherwise it is let through with a warning.
    pub fn check(&self, request: &WebhookRequest<'_>) -> Result<Authenticity> {
        if !self.is_enabled() {
            return Ok(Authenticity::Unchecked);
        }

        match authenticate(&self.secret, request) {
            Authenticity::Mismatch(scheme) => {
                debug!(header = scheme.header_name(), "Unauthorized - signature mismatch");
                Err(Error::Authentication(format!(
                    "{} does not match payload",
                    scheme.header_name()
                )))
            }
            Authenticity::Missing if self.require_signature => {
                debug!("Unauthorized - no signature header");
                Err(Error::Authentication("signature header missing".to_string()))
            }
            Authenticity::Missing => {
                warn!("Accepting unsigned delivery although a webhook secret is configured");
                Ok(Authenticity::Missing)
            }
            outcome => Ok(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "It's a Secret to Everybody";
    const BODY: &[u8] = b"Hello, World!";

    #[test]
    fn test_sign_matches_github_reference() {
        // Example from GitHub's "Validating webhook deliveries" guide.
        assert_eq!(
            SignatureScheme::Sha256.sign(SECRET, BODY),
            "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17"
        );
    }

    #[test]
    fn test_verify_sha256() {
        let header = SignatureScheme::Sha256.sign(SECRET, BODY);
        assert!(verify(SignatureScheme::Sha256, SECRET, &header, BODY));
        assert!(!verify(SignatureScheme::Sha256, "other", &header, BODY));
    }

    #[test]
    fn test_flipped_body_byte_fails() {
        let header = SignatureScheme::Sha256.sign(SECRET, BODY);
        for i in 0..BODY.len() {
            let mut tampered = BODY.to_vec();
            tampered[i] ^= 0x01;
            assert!(!verify(SignatureScheme::Sha256, SECRET, &header, &tampered));
        }
    }

    #[test]
    fn test_short_headers_fail_for_both_schemes() {
        for scheme in [SignatureScheme::Sha256, SignatureScheme::Sha1] {
            assert!(!verify(scheme, SECRET, "", BODY));
            assert!(!verify(scheme, SECRET, "sha", BODY));
            assert!(!verify(scheme, SECRET, scheme.prefix(), BODY));
        }
    }

    #[test]
    fn test_wrong_prefix_fails() {
        let sha1 = SignatureScheme::Sha1.sign(SECRET, BODY);
        assert!(!verify(SignatureScheme::Sha256, SECRET, &sha1, BODY));
    }

    #[test]
    fn test_uppercase_hex_fails() {
        let header = SignatureScheme::Sha256.sign(SECRET, BODY);
        let upper = format!("sha256={}", header["sha256=".len()..].to_ascii_uppercase());
        assert!(!verify(SignatureScheme::Sha256, SECRET, &upper, BODY));
    }

    #[test]
    fn test_authenticate_borrows_from_request() {
        let header = SignatureScheme::Sha256.sign(SECRET, BODY);
        let outcome = {
            let request = WebhookRequest::new(BODY).with_signature_256(&header);
            authenticate(SECRET, &request)
        };
        assert_eq!(outcome, Authenticity::Verified(SignatureScheme::Sha256));
    }

    #[test]
    fn test_verify_sha1() {
        let header = SignatureScheme::Sha1.sign(SECRET, BODY);
        assert!(header.starts_with("sha1="));
        assert_eq!(header.len(), "sha1=".len() + 40);
        assert!(verify(SignatureScheme::Sha1, SECRET, &header, BODY));
        assert!(!verify(SignatureScheme::Sha1, SECRET, &header, b"Hello, World?"));
    }

    #[test]
    fn test_authenticate_prefers_sha256() {
        let good_256 = SignatureScheme::Sha256.sign(SECRET, BODY);
        let bad_1 = SignatureScheme::Sha1.sign("wrong", BODY);
        let request = WebhookRequest::new(BODY)
            .with_signature_256(&good_256)
            .with_signature(&bad_1);
        assert_eq!(
            authenticate(SECRET, &request),
            Authenticity::Verified(SignatureScheme::Sha256)
        );
    }

    #[test]
    fn test_authenticate_falls_back_to_sha1() {
        let good_1 = SignatureScheme::Sha1.sign(SECRET, BODY);
        let request = WebhookRequest::new(BODY)
            .with_signature_256("")
            .with_signature(&good_1);
        assert_eq!(
            authenticate(SECRET, &request),
            Authenticity::Verified(SignatureScheme::Sha1)
        );
    }

    #[test]
    fn test_authenticate_missing() {
        let request = WebhookRequest::new(BODY);
        assert_eq!(authenticate(SECRET, &request), Authenticity::Missing);
    }

    #[test]
    fn test_policy_disabled_without_secret() {
        let policy = SignaturePolicy::new("", true);
        let request = WebhookRequest::new(BODY).with_signature_256("sha256=00");
        assert_eq!(policy.check(&request).unwrap(), Authenticity::Unchecked);
    }

    #[test]
    fn test_policy_rejects_mismatch() {
        let policy = SignaturePolicy::new(SECRET, false);
        let request = WebhookRequest::new(BODY).with_signature_256("sha256=deadbeef");
        assert!(matches!(policy.check(&request), Err(Error::Authentication(_))));
    }

    #[test]
    fn test_policy_missing_signature() {
        let request = WebhookRequest::new(BODY);

        let lenient = SignaturePolicy::new(SECRET, false);
        assert_eq!(lenient.check(&request).unwrap(), Authenticity::Missing);

        let strict = SignaturePolicy::new(SECRET, true);
        assert!(matches!(strict.check(&request), Err(Error::Authentication(_))));
    }

    #[test]
    fn test_requires_signature_needs_secret() {
        assert!(SignaturePolicy::new(SECRET, true).requires_signature());
        assert!(!SignaturePolicy::new(SECRET, false).requires_signature());
        assert!(!SignaturePolicy::new("", true).requires_signature());
    }
}
