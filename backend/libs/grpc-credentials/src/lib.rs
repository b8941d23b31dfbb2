//! Bearer Token Credentials for gRPC Services
//!
//! This library verifies the bearer token carried in a call's
//! `authorization` metadata and hands the decoded claims to the handler.
//!
//! ## Core Components
//!
//! - **Credentials**: verifies a token (or the metadata carrying it) into a `ClaimSet`
//! - **CredentialsInterceptor**: server-side guard that rejects or annotates calls
//! - **CredentialsClientInterceptor**: attaches `authorization` to outgoing calls
//! - **ClaimsExt**: handler-side access to the verified claims
//! - **CredentialsConfig**: startup configuration from environment variables
//!
//! ## Pipeline
//!
//! ```text
//! metadata -> "authorization" -> "<scheme> <token>" -> signature -> claims -> handler
//! ```
//!
//! Every rejection is one of five `CredentialsError` kinds and reaches the
//! caller as `Status::unauthenticated` with the kind's message.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use grpc_credentials::{ClaimsExt, Credentials, CredentialsInterceptor, VerificationKey};
//! use tonic::{Request, Response, Status};
//!
//! # fn setup() -> anyhow::Result<()> {
//! let public_key = std::env::var("JWT_PUBLIC_KEY_PEM")?;
//! let credentials = Credentials::new(VerificationKey::from_rsa_pem(&public_key)?);
//! let interceptor = CredentialsInterceptor::new(credentials);
//!
//! // let service = OrderServiceServer::with_interceptor(OrderService, interceptor);
//! # Ok(())
//! # }
//!
//! async fn get_order(request: Request<()>) -> Result<Response<()>, Status> {
//!     let claims = request.claims()?;
//!     tracing::info!(subject = ?claims.subject(), "get_order");
//!     Ok(Response::new(()))
//! }
//! ```
//!
//! ## Decode-only Mode
//!
//! `Credentials::decode_only()` skips signature verification entirely and
//! only decodes the payload. It must be chosen explicitly (or via
//! `JWT_DECODE_ONLY=true`) and logs a warning when built.

mod claims;
mod client;
mod config;
mod credentials;
mod error;
mod extensions;
mod key;
mod server;

pub use claims::ClaimSet;
pub use client::CredentialsClientInterceptor;
pub use config::CredentialsConfig;
pub use credentials::{Credentials, AUTHORIZATION, DEFAULT_TOKEN_SCHEME};
pub use error::{CredentialsError, Result};
pub use extensions::ClaimsExt;
pub use key::{VerificationKey, DEFAULT_ALGORITHM};
pub use server::CredentialsInterceptor;

// Re-exports for convenience
pub use jsonwebtoken::Algorithm;
pub use tonic::Status;
