//! Client-side credentials interceptor
//!
//! Attaches an `authorization` entry to outgoing gRPC requests so they pass
//! a `CredentialsInterceptor` on the other side.

use crate::credentials::{AUTHORIZATION, DEFAULT_TOKEN_SCHEME};
use crate::error::{CredentialsError, Result};
use tonic::metadata::{AsciiMetadataValue, MetadataMap};
use tonic::service::Interceptor;
use tonic::{Request, Status};

/// Client-side interceptor that injects `"<scheme> <token>"` into metadata
///
/// The header value is formatted and validated once at construction.
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_credentials::CredentialsClientInterceptor;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let interceptor = CredentialsClientInterceptor::bearer("eyJhbGc...")?;
///
/// // let client = OrderServiceClient::with_interceptor(channel, interceptor);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CredentialsClientInterceptor {
    auth_header: AsciiMetadataValue,
}

impl CredentialsClientInterceptor {
    /// Interceptor sending `token` under the `Bearer` scheme
    pub fn bearer(token: &str) -> Result<Self> {
        Self::new(DEFAULT_TOKEN_SCHEME, token)
    }

    /// Interceptor sending `token` under `scheme`
    ///
    /// ## Errors
    ///
    /// `TokenTypeInvalid` if either part is empty, contains a space, or is
    /// not valid metadata ASCII; such a value could never be accepted by
    /// the server side.
    pub fn new(scheme: &str, token: &str) -> Result<Self> {
        if scheme.is_empty() || token.is_empty() || scheme.contains(' ') || token.contains(' ') {
            return Err(CredentialsError::TokenTypeInvalid);
        }

        let auth_header = AsciiMetadataValue::try_from(format!("{scheme} {token}"))
            .map_err(|_| CredentialsError::TokenTypeInvalid)?;

        Ok(Self { auth_header })
    }

    /// Forward the `authorization` entry of an incoming call
    ///
    /// Useful for gateways relaying the caller's credentials to backends.
    pub fn from_metadata(metadata: &MetadataMap) -> Result<Self> {
        let auth_header = metadata
            .get(AUTHORIZATION)
            .ok_or(CredentialsError::AuthorizationRequired)?;

        Ok(Self {
            auth_header: auth_header.clone(),
        })
    }
}

impl Interceptor for CredentialsClientInterceptor {
    fn call(&mut self, mut request: Request<()>) -> std::result::Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert(AUTHORIZATION, self.auth_header.clone());

        Ok(request)
    }
}
