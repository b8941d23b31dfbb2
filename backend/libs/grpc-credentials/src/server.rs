//! Server-side credentials interceptor
//!
//! Verifies the `authorization` metadata of incoming gRPC calls and stores
//! the resulting `ClaimSet` in request extensions for the handler.

use crate::claims::ClaimSet;
use crate::credentials::Credentials;
use std::future::Future;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::debug;

/// Server-side interceptor that verifies credentials and attaches claims
///
/// This interceptor:
/// 1. Extracts the first `authorization` value from gRPC metadata
/// 2. Checks the `<scheme> <token>` shape against the configured scheme
/// 3. Verifies and decodes the token via `Credentials`
/// 4. Stores the `ClaimSet` in request extensions
///
/// Any failure becomes `Status::unauthenticated` carrying the error message,
/// and the wrapped service never sees the call.
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_credentials::{CredentialsConfig, CredentialsInterceptor};
///
/// # fn example() -> anyhow::Result<()> {
/// let credentials = CredentialsConfig::from_env()?.build()?;
/// let interceptor = CredentialsInterceptor::new(credentials);
///
/// // let service = MyServiceServer::with_interceptor(MyService, interceptor);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CredentialsInterceptor {
    credentials: Credentials,
}

impl CredentialsInterceptor {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Verify `request` and invoke `handler` with the claims attached
    ///
    /// On a verification failure the handler is not called and the error is
    /// returned as-is. On success the handler's result is returned unchanged.
    ///
    /// ## Example
    ///
    /// ```rust,no_run
    /// use grpc_credentials::{ClaimsExt, CredentialsInterceptor};
    /// use tonic::{Request, Response, Status};
    ///
    /// # async fn example(interceptor: CredentialsInterceptor, request: Request<()>) -> Result<Response<String>, Status> {
    /// interceptor
    ///     .guard(request, |request| async move {
    ///         let claims = request.claims()?;
    ///         Ok::<_, Status>(Response::new(claims.subject().unwrap_or_default().to_string()))
    ///     })
    ///     .await
    /// # }
    /// ```
    pub async fn guard<T, R, F, Fut>(&self, mut request: Request<T>, handler: F) -> Result<R, Status>
    where
        F: FnOnce(Request<T>) -> Fut,
        Fut: Future<Output = Result<R, Status>>,
    {
        self.authenticate(&mut request)?;
        handler(request).await
    }

    fn authenticate<T>(&self, request: &mut Request<T>) -> Result<(), Status> {
        let claims: ClaimSet = self
            .credentials
            .verify_metadata(request.metadata())
            .map_err(|e| {
                debug!(error = %e, "Rejecting call with invalid credentials");
                Status::from(e)
            })?;

        debug!(
            subject = claims.subject().unwrap_or("-"),
            claims = claims.len(),
            "Credentials verified"
        );

        request.extensions_mut().insert(claims);
        Ok(())
    }
}

impl Interceptor for CredentialsInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        self.authenticate(&mut request)?;
        Ok(request)
    }
}
