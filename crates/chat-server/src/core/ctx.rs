use crate::core::error::{Error, Result};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the requesting participant's name
pub const USER_HEADER: &str = "user";

/// The participant a request is made on behalf of
#[derive(Clone, Debug)]
pub struct Ctx {
    user: String,
}

impl Ctx {
    pub fn new(user: String) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .ok_or(Error::MissingUser)?
            .to_str()
            .map_err(|_| Error::Validation("user header is not valid text".to_string()))?
            .trim();

        if user.is_empty() {
            return Err(Error::MissingUser);
        }

        Ok(Ctx::new(user.to_string()))
    }
}
