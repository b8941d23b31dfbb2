//! Request extension trait for claim access in handlers

use crate::claims::ClaimSet;
use tonic::{Request, Status};

/// Access to the `ClaimSet` stored by `CredentialsInterceptor`
///
/// ```rust,no_run
/// use grpc_credentials::ClaimsExt;
/// use tonic::{Request, Response, Status};
///
/// async fn get_order(request: Request<()>) -> Result<Response<()>, Status> {
///     let claims = request.claims()?;
///     let _caller = claims.subject();
///     Ok(Response::new(()))
/// }
/// ```
pub trait ClaimsExt {
    /// Claims of the authenticated caller
    ///
    /// ## Errors
    ///
    /// `Status::unauthenticated` if no claims are attached, i.e. the
    /// interceptor is not installed on this service.
    fn claims(&self) -> Result<&ClaimSet, Status>;
}

impl<T> ClaimsExt for Request<T> {
    fn claims(&self) -> Result<&ClaimSet, Status> {
        self.extensions().get::<ClaimSet>().ok_or_else(|| {
            Status::unauthenticated("No claims found. Ensure CredentialsInterceptor is attached.")
        })
    }
}
