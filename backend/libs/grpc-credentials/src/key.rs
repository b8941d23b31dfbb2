//! Verification key material
//!
//! A key is always paired with the single algorithm its signatures are
//! checked under. The token header's `alg` never picks the algorithm.

use anyhow::{anyhow, Result};
use jsonwebtoken::{Algorithm, DecodingKey};
use std::fmt;
use std::sync::Arc;

/// Default algorithm for RSA public keys
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::RS256;

/// Public key plus the algorithm used to verify signatures with it
#[derive(Clone)]
pub struct VerificationKey {
    key: Arc<DecodingKey>,
    algorithm: Algorithm,
}

impl VerificationKey {
    /// RSA public key in PEM format, verified with RS256
    pub fn from_rsa_pem(pem: &str) -> Result<Self> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| anyhow!("Failed to parse RSA public key: {e}"))?;

        Ok(Self::new(key, DEFAULT_ALGORITHM))
    }

    /// EC public key in PEM format, verified with ES256
    pub fn from_ec_pem(pem: &str) -> Result<Self> {
        let key = DecodingKey::from_ec_pem(pem.as_bytes())
            .map_err(|e| anyhow!("Failed to parse EC public key: {e}"))?;

        Ok(Self::new(key, Algorithm::ES256))
    }

    /// Ed25519 public key in PEM format, verified with EdDSA
    pub fn from_ed_pem(pem: &str) -> Result<Self> {
        let key = DecodingKey::from_ed_pem(pem.as_bytes())
            .map_err(|e| anyhow!("Failed to parse Ed25519 public key: {e}"))?;

        Ok(Self::new(key, Algorithm::EdDSA))
    }

    /// Parse a PEM key for the given algorithm
    ///
    /// Symmetric (HS*) algorithms are refused: only public keys verify here.
    pub fn from_pem(pem: &str, algorithm: Algorithm) -> Result<Self> {
        let key = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Self::from_rsa_pem(pem)?,
            Algorithm::ES256 | Algorithm::ES384 => Self::from_ec_pem(pem)?,
            Algorithm::EdDSA => Self::from_ed_pem(pem)?,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                return Err(anyhow!(
                    "Algorithm {algorithm:?} is symmetric; a public key algorithm is required"
                ))
            }
        };

        key.with_algorithm(algorithm)
    }

    /// Switch to another algorithm of the same key family
    ///
    /// e.g. RS256 -> PS384, ES256 -> ES384
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Result<Self> {
        if family(algorithm) != family(self.algorithm) {
            return Err(anyhow!(
                "Algorithm {algorithm:?} does not match key family of {:?}",
                self.algorithm
            ));
        }

        self.algorithm = algorithm;
        Ok(self)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }

    fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        Self {
            key: Arc::new(key),
            algorithm,
        }
    }
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

#[derive(PartialEq, Eq)]
enum Family {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

fn family(algorithm: Algorithm) -> Family {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Family::Hmac,
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => Family::Rsa,
        Algorithm::ES256 | Algorithm::ES384 => Family::Ec,
        Algorithm::EdDSA => Family::Ed,
    }
}
