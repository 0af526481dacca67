//! Login and registration.

use std::sync::Arc;

use crate::backend::{ApiError, ApiResult, FullBackend};
use crate::models::{LoginRequest, RegisterRequest, Session};
use crate::session::{landing_route, SessionContext, LOGOUT_ROUTE};

/// Outcome of a successful login or registration.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    pub message: String,
    pub session: Session,
    /// Where the user should be sent next.
    pub route: &'static str,
}

pub struct AuthView {
    backend: Arc<dyn FullBackend>,
    session: Arc<SessionContext>,
    pub alert: Option<String>,
}

impl AuthView {
    pub fn new(backend: Arc<dyn FullBackend>, session: Arc<SessionContext>) -> Self {
        Self {
            backend,
            session,
            alert: None,
        }
    }

    fn finish(&mut self, outcome: ApiResult<(String, Session)>) -> ApiResult<SignedIn> {
        let result = outcome.and_then(|(message, session)| {
            self.session.set_session(session.clone())?;
            Ok(SignedIn {
                message,
                route: landing_route(session.role),
                session,
            })
        });
        match &result {
            Ok(_) => self.alert = None,
            Err(e) => self.alert = Some(e.user_message()),
        }
        result
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ApiResult<SignedIn> {
        let outcome = if email.trim().is_empty() || password.is_empty() {
            Err(ApiError::validation("Email and Password are required"))
        } else {
            let request = LoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            };
            self.backend
                .login(&request)
                .await
                .map(|response| (response.message, response.user))
        };
        self.finish(outcome)
    }

    pub async fn register(&mut self, request: RegisterRequest) -> ApiResult<SignedIn> {
        let outcome = self
            .backend
            .register(&request)
            .await
            .map(|response| (response.message, response.user));
        self.finish(outcome)
    }

    /// Forget the session; returns the route to show next.
    pub fn logout(&mut self) -> ApiResult<&'static str> {
        self.session.clear_session()?;
        self.alert = None;
        Ok(LOGOUT_ROUTE)
    }
}
