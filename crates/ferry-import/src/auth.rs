//! Authenticated user extraction
//!
//! Session and token handling live in front of this crate. Whatever
//! authenticates the request stores an [`AuthContext`] in the request
//! extensions; handlers pull it out with [`RequireAuth`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use ferry_core::problemdetails::{self, Problem};
use ferry_core::UserRef;

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: UserRef,
}

impl AuthContext {
    pub fn new(user: UserRef) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> i32 {
        self.user.id
    }
}

/// Extractor that rejects the request with 401 when no user is attached
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthContext);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| {
                problemdetails::new(StatusCode::UNAUTHORIZED)
                    .with_title("Unauthorized")
                    .with_detail("Authentication credentials were not provided")
            })
    }
}
