//! Decoded Claim Set
//!
//! The claim set is the token payload exactly as decoded. Nothing here is
//! evaluated during verification; the accessors exist for handlers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims decoded from a verified token
///
/// ## Design Notes
///
/// - Opaque: every claim is kept, registered or private
/// - Cloneable so handlers can move it out of request extensions
/// - Stored in request extensions by `CredentialsInterceptor`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    /// Raw value of a claim
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Deserialize a single claim into `T`
    ///
    /// Returns `None` when the claim is absent or does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.0
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Issuer (`iss`)
    pub fn issuer(&self) -> Option<&str> {
        self.str_claim("iss")
    }

    /// Subject (`sub`)
    pub fn subject(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    /// Principal (`prn`), the pre-standard predecessor of `sub`
    pub fn principal(&self) -> Option<&str> {
        self.str_claim("prn")
    }

    /// Audience (`aud`), accepting both the string and array forms
    pub fn audience(&self) -> Vec<&str> {
        match self.0.get("aud") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Space-delimited scopes (`scope`)
    pub fn scopes(&self) -> Vec<&str> {
        self.str_claim("scope")
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Token type (`typ`)
    pub fn token_type(&self) -> Option<&str> {
        self.str_claim("typ")
    }

    /// Expiration time (`exp`, Unix timestamp)
    pub fn expires_at(&self) -> Option<i64> {
        self.0.get("exp").and_then(Value::as_i64)
    }

    /// Issued at (`iat`, Unix timestamp)
    pub fn issued_at(&self) -> Option<i64> {
        self.0.get("iat").and_then(Value::as_i64)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
