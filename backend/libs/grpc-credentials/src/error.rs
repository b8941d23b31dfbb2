//! Error taxonomy for credential verification
//!
//! Every variant is a fixed, message-only value. At the gRPC boundary all of
//! them collapse to `Status::unauthenticated`, distinguished only by message.

use thiserror::Error;
use tonic::Status;

/// Result type for credential operations
pub type Result<T> = std::result::Result<T, CredentialsError>;

/// Reasons a call's credentials were rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CredentialsError {
    /// Token signature did not verify against the configured key
    #[error("credentials: verification error")]
    Verification,

    /// Token payload could not be decoded into a claim set
    #[error("credentials: decoding error")]
    Decoding,

    /// The call carried no metadata at all
    #[error("credentials: missing credentials")]
    CredentialsMissing,

    /// Metadata present, but no `authorization` entry
    #[error("credentials: authorization required")]
    AuthorizationRequired,

    /// `authorization` value malformed or carrying the wrong scheme
    #[error("credentials: token type invalid")]
    TokenTypeInvalid,
}

impl From<CredentialsError> for Status {
    fn from(err: CredentialsError) -> Self {
        Status::unauthenticated(err.to_string())
    }
}
