//! Credential Verifier
//!
//! Turns an `authorization` metadata entry (or a bare token) into a verified
//! `ClaimSet`, or one of the `CredentialsError` kinds.

use crate::claims::ClaimSet;
use crate::error::{CredentialsError, Result};
use crate::key::VerificationKey;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use tonic::metadata::MetadataMap;
use tracing::{debug, warn};

/// Scheme expected when none is configured
pub const DEFAULT_TOKEN_SCHEME: &str = "Bearer";

/// Metadata key carrying the credentials
pub const AUTHORIZATION: &str = "authorization";

/// Immutable verifier configuration
///
/// Built once at startup and shared by every call; cloning is cheap.
///
/// ## Modes
///
/// - **Verifying** (`Credentials::new`): signature checked against the key,
///   then the payload is decoded.
/// - **Decode-only** (`Credentials::decode_only`): no signature check at
///   all. Claims are whatever the caller sent. Only for deployments where an
///   upstream hop has already verified the token.
#[derive(Debug, Clone)]
pub struct Credentials {
    key: Option<VerificationKey>,
    token_scheme: String,
}

impl Credentials {
    /// Verifying credentials with the default `Bearer` scheme
    pub fn new(key: VerificationKey) -> Self {
        Self {
            key: Some(key),
            token_scheme: DEFAULT_TOKEN_SCHEME.to_string(),
        }
    }

    /// Credentials that decode tokens without checking their signature
    pub fn decode_only() -> Self {
        warn!("Credentials built in decode-only mode - token signatures will NOT be verified");

        Self {
            key: None,
            token_scheme: DEFAULT_TOKEN_SCHEME.to_string(),
        }
    }

    /// Override the expected authorization scheme
    ///
    /// An empty scheme falls back to `Bearer`.
    pub fn with_token_scheme(mut self, scheme: impl Into<String>) -> Self {
        let scheme = scheme.into();
        self.token_scheme = if scheme.is_empty() {
            DEFAULT_TOKEN_SCHEME.to_string()
        } else {
            scheme
        };
        self
    }

    pub fn token_scheme(&self) -> &str {
        &self.token_scheme
    }

    pub fn verification_key(&self) -> Option<&VerificationKey> {
        self.key.as_ref()
    }

    pub fn is_decode_only(&self) -> bool {
        self.key.is_none()
    }

    /// Verify a bare token (no scheme prefix) and decode its claims
    ///
    /// ## Errors
    ///
    /// - `Verification` if a key is configured and the signature does not
    ///   verify against it
    /// - `Decoding` if the payload is not a JSON object
    pub fn verify_token(&self, token: &str) -> Result<ClaimSet> {
        if let Some(key) = &self.key {
            verify_signature(token, key)?;
        }

        decode_claims(token)
    }

    /// Extract the token from call metadata, then verify it
    ///
    /// ## Errors
    ///
    /// - `CredentialsMissing` if the metadata is empty
    /// - `AuthorizationRequired` if there is no `authorization` entry
    /// - `TokenTypeInvalid` if the first `authorization` value is not
    ///   `"<scheme> <token>"` with the configured scheme
    /// - anything `verify_token` returns
    pub fn verify_metadata(&self, metadata: &MetadataMap) -> Result<ClaimSet> {
        if metadata.is_empty() {
            return Err(CredentialsError::CredentialsMissing);
        }

        let value = metadata
            .get(AUTHORIZATION)
            .ok_or(CredentialsError::AuthorizationRequired)?;

        let value = value
            .to_str()
            .map_err(|_| CredentialsError::TokenTypeInvalid)?;

        let token = self.split_scheme(value)?;

        debug!(scheme = %self.token_scheme, "Verifying token from call metadata");

        self.verify_token(token)
    }

    fn split_scheme<'a>(&self, value: &'a str) -> Result<&'a str> {
        let parts: Vec<&str> = value.split(' ').collect();

        match parts.as_slice() {
            [scheme, token] if scheme.eq_ignore_ascii_case(&self.token_scheme) => Ok(token),
            _ => Err(CredentialsError::TokenTypeInvalid),
        }
    }
}

/// Check `header.payload` against `signature` under the key's algorithm
fn verify_signature(token: &str, key: &VerificationKey) -> Result<()> {
    let Some((message, signature)) = token.rsplit_once('.') else {
        return Err(CredentialsError::Verification);
    };

    if message.split('.').count() != 2 {
        return Err(CredentialsError::Verification);
    }

    match jsonwebtoken::crypto::verify(
        signature,
        message.as_bytes(),
        key.decoding_key(),
        key.algorithm(),
    ) {
        Ok(true) => Ok(()),
        Ok(false) => {
            debug!(algorithm = ?key.algorithm(), "Token signature mismatch");
            Err(CredentialsError::Verification)
        }
        Err(e) => {
            debug!(error = %e, "Token signature could not be checked");
            Err(CredentialsError::Verification)
        }
    }
}

/// Decode the payload without checking the signature or any claim
///
/// Only the second segment is read; the header is never inspected, so
/// unsigned and header-less tokens decode as long as the payload does.
fn decode_claims(token: &str) -> Result<ClaimSet> {
    let payload = token.split('.').nth(1).ok_or_else(|| {
        debug!("Token has no payload segment");
        CredentialsError::Decoding
    })?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| {
            debug!(error = %e, "Token payload is not base64url");
            CredentialsError::Decoding
        })?;

    serde_json::from_slice::<ClaimSet>(&bytes).map_err(|e| {
        debug!(error = %e, "Token payload is not a JSON object");
        CredentialsError::Decoding
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::json;
    use tonic::metadata::MetadataValue;

    const RSA_PRIVATE_KEY: &str = include_str!("../tests/fixtures/rsa_private.pem");
    const RSA_PUBLIC_KEY: &str = include_str!("../tests/fixtures/rsa_public.pem");
    const OTHER_RSA_PUBLIC_KEY: &str = include_str!("../tests/fixtures/rsa_other_public.pem");

    fn sign(claims: &serde_json::Value) -> String {
        let key = EncodingKey::from_rsa_pem(RSA_PRIVATE_KEY.as_bytes()).expect("valid test key");
        encode(&Header::new(Algorithm::RS256), claims, &key).expect("Failed to sign token")
    }

    fn verifying() -> Credentials {
        Credentials::new(VerificationKey::from_rsa_pem(RSA_PUBLIC_KEY).expect("valid test key"))
    }

    fn metadata(authorization: &str) -> MetadataMap {
        let mut metadata = MetadataMap::new();
        metadata.insert(AUTHORIZATION, authorization.parse().expect("ascii header"));
        metadata
    }

    #[test]
    fn test_verify_token_valid() {
        let token = sign(&json!({ "sub": "user-1", "scope": "read" }));

        let claims = verifying().verify_token(&token).expect("token should verify");
        assert_eq!(claims.subject(), Some("user-1"));
        assert_eq!(claims.scopes(), vec!["read"]);
    }

    #[test]
    fn test_verify_token_wrong_key() {
        let token = sign(&json!({ "sub": "user-1" }));
        let credentials = Credentials::new(
            VerificationKey::from_rsa_pem(OTHER_RSA_PUBLIC_KEY).expect("valid test key"),
        );

        assert_eq!(
            credentials.verify_token(&token),
            Err(CredentialsError::Verification)
        );
    }

    #[test]
    fn test_verify_token_tampered_payload() {
        let token = sign(&json!({ "sub": "user-1" }));
        let forged = sign(&json!({ "sub": "admin" }));

        // Splice the forged payload onto the original signature
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged.split('.').nth(1).expect("payload segment");
        let tampered = parts.join(".");

        assert_eq!(
            verifying().verify_token(&tampered),
            Err(CredentialsError::Verification)
        );
    }

    #[test]
    fn test_verify_token_malformed_with_key() {
        let credentials = verifying();

        for token in ["", "abc", "abc.def", ".", "abc.def.ghi", "a.b.c.d"] {
            assert_eq!(
                credentials.verify_token(token),
                Err(CredentialsError::Verification),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_verify_token_algorithm_pinned_by_key() {
        // Correctly signed, but under HS256 with the public key bytes as secret
        let key = EncodingKey::from_secret(RSA_PUBLIC_KEY.as_bytes());
        let token = encode(&Header::new(Algorithm::HS256), &json!({ "sub": "x" }), &key)
            .expect("Failed to sign token");

        assert_eq!(
            verifying().verify_token(&token),
            Err(CredentialsError::Verification)
        );
    }

    #[test]
    fn test_verify_token_ignores_claim_semantics() {
        // Expired long ago, no required claims: still accepted
        let token = sign(&json!({ "exp": 1, "aud": "someone-else" }));

        let claims = verifying().verify_token(&token).expect("claims are not evaluated");
        assert_eq!(claims.expires_at(), Some(1));
    }

    #[test]
    fn test_decode_only_never_verification_error() {
        let credentials = Credentials::decode_only();

        for token in ["", "abc", "abc.def.ghi", "a.b.c.d", "...."] {
            assert_eq!(
                credentials.verify_token(token),
                Err(CredentialsError::Decoding),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_decode_only_accepts_unverified_signature() {
        let token = sign(&json!({ "sub": "user-1" }));
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "bm90LWEtc2lnbmF0dXJl";
        let unsigned = parts.join(".");

        let claims = Credentials::decode_only()
            .verify_token(&unsigned)
            .expect("decode-only ignores the signature");
        assert_eq!(claims.subject(), Some("user-1"));
    }

    #[test]
    fn test_decode_only_ignores_header() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;

        let segment = |value: serde_json::Value| URL_SAFE_NO_PAD.encode(value.to_string());
        let payload = segment(json!({ "sub": "user-1" }));
        let credentials = Credentials::decode_only();

        for token in [
            // Unsigned
            format!("{}.{payload}.", segment(json!({ "alg": "none" }))),
            // No alg in header
            format!("{}.{payload}.c2ln", segment(json!({ "typ": "JWT" }))),
            // Header and payload only
            format!("{}.{payload}", segment(json!({ "alg": "RS256" }))),
            // Header that is not JSON at all
            format!("not-a-header.{payload}.c2ln"),
            // Padded payload
            format!("x.{payload}=.y"),
        ] {
            let claims = credentials
                .verify_token(&token)
                .unwrap_or_else(|e| panic!("{token:?} should decode: {e}"));
            assert_eq!(claims.subject(), Some("user-1"), "token {token:?}");
        }

        // The same shapes still fail signature verification when a key is set
        let unsigned = format!("{}.{payload}.", segment(json!({ "alg": "none" })));
        assert_eq!(
            verifying().verify_token(&unsigned),
            Err(CredentialsError::Verification)
        );
        let two_part = format!("{}.{payload}", segment(json!({ "alg": "RS256" })));
        assert_eq!(
            verifying().verify_token(&two_part),
            Err(CredentialsError::Verification)
        );
    }

    #[test]
    fn test_verified_but_undecodable_payload() {
        // Signed payload that is JSON but not an object
        let token = sign(&json!(["not", "an", "object"]));

        assert_eq!(
            verifying().verify_token(&token),
            Err(CredentialsError::Decoding)
        );
    }

    #[test]
    fn test_verify_metadata_empty() {
        assert_eq!(
            verifying().verify_metadata(&MetadataMap::new()),
            Err(CredentialsError::CredentialsMissing)
        );
    }

    #[test]
    fn test_verify_metadata_no_authorization() {
        let mut metadata = MetadataMap::new();
        metadata.insert("x-request-id", MetadataValue::from_static("abc"));

        assert_eq!(
            verifying().verify_metadata(&metadata),
            Err(CredentialsError::AuthorizationRequired)
        );
    }

    #[test]
    fn test_verify_metadata_malformed_values() {
        let credentials = Credentials::decode_only();

        for value in [
            "Bearer",
            "Basic abc.def.ghi",
            "Bearer  abc.def.ghi",
            "Bearer abc.def.ghi extra",
            "abc.def.ghi",
            " Bearer abc.def.ghi",
        ] {
            assert_eq!(
                credentials.verify_metadata(&metadata(value)),
                Err(CredentialsError::TokenTypeInvalid),
                "value {value:?}"
            );
        }
    }

    #[test]
    fn test_verify_metadata_scheme_case_insensitive() {
        let token = sign(&json!({ "sub": "user-1" }));

        for scheme in ["bearer", "Bearer", "BEARER", "bEaReR"] {
            let claims = verifying()
                .verify_metadata(&metadata(&format!("{scheme} {token}")))
                .expect("scheme should match");
            assert_eq!(claims.subject(), Some("user-1"));
        }

        let upper = verifying().with_token_scheme("BEARER");
        assert!(upper.verify_metadata(&metadata(&format!("bearer {token}"))).is_ok());
    }

    #[test]
    fn test_verify_metadata_custom_scheme() {
        let token = sign(&json!({ "sub": "svc" }));
        let credentials = verifying().with_token_scheme("JWT");

        assert!(credentials
            .verify_metadata(&metadata(&format!("jwt {token}")))
            .is_ok());
        assert_eq!(
            credentials.verify_metadata(&metadata(&format!("Bearer {token}"))),
            Err(CredentialsError::TokenTypeInvalid)
        );
    }

    #[test]
    fn test_verify_metadata_delegates_decoding() {
        let credentials = Credentials::decode_only();

        assert_eq!(
            credentials.verify_metadata(&metadata("Bearer abc.def.ghi")),
            Err(CredentialsError::Decoding)
        );
    }

    #[test]
    fn test_verify_metadata_uses_first_value() {
        let token = sign(&json!({ "sub": "first" }));
        let mut metadata = metadata(&format!("Bearer {token}"));
        metadata.append(AUTHORIZATION, MetadataValue::from_static("Basic ignored"));

        let claims = verifying().verify_metadata(&metadata).expect("first value wins");
        assert_eq!(claims.subject(), Some("first"));
    }

    #[test]
    fn test_empty_scheme_falls_back_to_bearer() {
        let credentials = Credentials::decode_only().with_token_scheme("");
        assert_eq!(credentials.token_scheme(), DEFAULT_TOKEN_SCHEME);
        assert!(credentials.is_decode_only());
    }
}
