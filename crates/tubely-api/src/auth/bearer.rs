use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::convert::Infallible;

const BEARER_PREFIX: &str = "Bearer ";

/// Bearer token taken from the `Authorization` header, if one was sent.
///
/// Extraction never rejects: a missing or malformed header yields `None` and the
/// upload gate turns that into 401 once the content ID has been checked.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    fn parse(header: &str) -> Option<String> {
        let token = header.strip_prefix(BEARER_PREFIX)?.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(Self::parse);
        Ok(BearerToken(token))
    }
}
