//! Registration and login.

use async_trait::async_trait;

use crate::backend::error::ApiResult;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};

/// Backend trait for accounts.
///
/// The server answers with the user record only; there is no token. The
/// returned [`Session`](crate::models::Session) is what the client persists.
#[async_trait]
pub trait AccountBackend: Send + Sync {
    /// Create an account.
    ///
    /// # Returns
    /// * `Ok(AuthResponse)` - The new user
    /// * `Err(ApiError)` with status 409 - Phone number or email already taken
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse>;

    /// Sign in.
    ///
    /// # Returns
    /// * `Ok(AuthResponse)` - The stored user
    /// * `Err(ApiError)` with status 401 - Unknown email or wrong password
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse>;
}
