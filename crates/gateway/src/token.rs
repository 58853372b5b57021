//! Signed opaque bearer tokens issued by `POST /auth/token` and verified on
//! every authenticated request.
//!
//! Not a JWT: no JWT library appears anywhere in the corpus this workspace
//! was built from. Instead this follows the same HMAC-SHA256 signing shape
//! as webhook signing elsewhere in the corpus, with the payload base64-encoded
//! the way the corpus's plugin host encodes binary material, via
//! `base64::engine::general_purpose::STANDARD` and the `Engine` trait.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use gov_core::Label;

type HmacSha256 = Hmac<Sha256>;

/// The typed half of `attrs` (`spec.md` §6: "keys include `clearance`,
/// `allow_export`").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimAttrs {
    /// Maximal label this subject may see.
    pub clearance: Label,
    /// Whether this subject may invoke the export action.
    pub allow_export: bool,
}

/// Token claims, bit-exact with `spec.md` §6's field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id.
    pub sub: String,
    /// Group memberships.
    pub groups: Vec<String>,
    /// Typed attribute bag.
    pub attrs: ClaimAttrs,
    /// Tenant the subject belongs to.
    pub tenant: String,
    /// Expiry, unix seconds.
    pub exp: u64,
}

/// Failure verifying a presented token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Not two base64 segments joined by `.`, or the payload didn't decode.
    #[error("malformed token")]
    Malformed,
    /// The signature did not match the payload under the configured key.
    #[error("signature mismatch")]
    BadSignature,
    /// `exp` is in the past.
    #[error("token expired")]
    Expired,
}

/// Sign `claims` with `signing_key`, returning `base64(payload).base64(sig)`.
pub fn issue(claims: &Claims, signing_key: &str) -> String {
    let payload_b64 = STANDARD.encode(serde_json::to_vec(claims).expect("claims always serialize"));
    let sig_b64 = sign(payload_b64.as_bytes(), signing_key);
    format!("{payload_b64}.{sig_b64}")
}

/// Verify `token`'s signature under `signing_key` and that it has not
/// expired as of `now_s` (unix seconds), returning the embedded claims.
pub fn verify(token: &str, signing_key: &str, now_s: u64) -> Result<Claims, TokenError> {
    let (payload_b64, sig_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
    let sig_bytes = STANDARD.decode(sig_b64).map_err(|_| TokenError::Malformed)?;

    let mut mac =
        HmacSha256::new_from_slice(signing_key.as_bytes()).expect("hmac accepts any key length");
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&sig_bytes).map_err(|_| TokenError::BadSignature)?;

    let payload = STANDARD.decode(payload_b64).map_err(|_| TokenError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;
    if claims.exp < now_s {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

fn sign(data: &[u8], signing_key: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(signing_key.as_bytes()).expect("hmac accepts any key length");
    mac.update(data);
    STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp: u64) -> Claims {
        Claims {
            sub: "alice".to_string(),
            groups: vec!["eng".to_string()],
            attrs: ClaimAttrs { clearance: Label::Internal, allow_export: false },
            tenant: "acme".to_string(),
            exp,
        }
    }

    #[test]
    fn issue_then_verify_roundtrips() {
        let token = issue(&claims(1_000), "secret");
        let verified = verify(&token, "secret", 500).unwrap();
        assert_eq!(verified, claims(1_000));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = issue(&claims(1_000), "secret");
        let err = verify(&token, "other-secret", 500).unwrap_err();
        assert_eq!(err, TokenError::BadSignature);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = issue(&claims(1_000), "secret");
        let (_, sig) = token.split_once('.').unwrap();
        let forged_payload = STANDARD.encode(
            serde_json::to_vec(&claims(999_999)).unwrap(), // attacker tries to extend expiry
        );
        let forged = format!("{forged_payload}.{sig}");
        let err = verify(&forged, "secret", 500).unwrap_err();
        assert_eq!(err, TokenError::BadSignature);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue(&claims(100), "secret");
        let err = verify(&token, "secret", 500).unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn malformed_token_is_rejected() {
        let err = verify("not-a-valid-token", "secret", 0).unwrap_err();
        assert_eq!(err, TokenError::Malformed);
    }
}
