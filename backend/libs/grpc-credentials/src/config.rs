//! Environment-driven verifier configuration

use crate::credentials::{Credentials, DEFAULT_TOKEN_SCHEME};
use crate::key::{VerificationKey, DEFAULT_ALGORITHM};
use anyhow::{anyhow, Context, Result};
use jsonwebtoken::Algorithm;
use std::str::FromStr;
use tracing::info;

/// Configuration for building `Credentials` at service startup
#[derive(Debug, Clone)]
pub struct CredentialsConfig {
    /// Public key PEM; `None` only when `decode_only` is set
    pub public_key_pem: Option<String>,
    /// Signature algorithm the key verifies under
    pub algorithm: Algorithm,
    /// Expected authorization scheme
    pub token_scheme: String,
    /// Explicit opt-in to skip signature verification
    pub decode_only: bool,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            public_key_pem: None,
            algorithm: DEFAULT_ALGORITHM,
            token_scheme: DEFAULT_TOKEN_SCHEME.to_string(),
            decode_only: false,
        }
    }
}

impl CredentialsConfig {
    /// Load configuration from environment variables
    ///
    /// **Environment Variables**:
    /// - `JWT_PUBLIC_KEY_PEM`: PEM public key (required unless decode-only)
    /// - `JWT_ALGORITHM`: signature algorithm (default: RS256)
    /// - `JWT_TOKEN_SCHEME`: authorization scheme (default: Bearer)
    /// - `JWT_DECODE_ONLY`: skip signature verification (default: false)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let public_key_pem = lookup("JWT_PUBLIC_KEY_PEM").filter(|pem| !pem.trim().is_empty());

        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(name) => Algorithm::from_str(name.trim())
                .map_err(|e| anyhow!("Invalid JWT_ALGORITHM {name:?}: {e}"))?,
            None => DEFAULT_ALGORITHM,
        };

        let token_scheme = lookup("JWT_TOKEN_SCHEME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_SCHEME.to_string());

        let decode_only = match lookup("JWT_DECODE_ONLY") {
            Some(v) => v
                .trim()
                .parse::<bool>()
                .with_context(|| format!("Invalid JWT_DECODE_ONLY value {v:?}"))?,
            None => false,
        };

        if public_key_pem.is_none() && !decode_only {
            return Err(anyhow!(
                "JWT_PUBLIC_KEY_PEM not set - set JWT_DECODE_ONLY=true to explicitly skip signature verification"
            ));
        }

        info!(
            algorithm = ?algorithm,
            token_scheme = %token_scheme,
            decode_only = decode_only,
            key_configured = public_key_pem.is_some(),
            "gRPC credentials configuration loaded"
        );

        Ok(Self {
            public_key_pem,
            algorithm,
            token_scheme,
            decode_only,
        })
    }

    /// Build the verifier
    ///
    /// A configured key always wins over `decode_only`.
    pub fn build(&self) -> Result<Credentials> {
        let credentials = match (&self.public_key_pem, self.decode_only) {
            (Some(pem), _) => {
                let key = VerificationKey::from_pem(pem, self.algorithm)
                    .context("Failed to load JWT verification key")?;
                Credentials::new(key)
            }
            (None, true) => Credentials::decode_only(),
            (None, false) => {
                return Err(anyhow!(
                    "No verification key configured and decode-only mode not enabled"
                ))
            }
        };

        Ok(credentials.with_token_scheme(self.token_scheme.clone()))
    }
}
