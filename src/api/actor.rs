//! Acting staff identity.
//!
//! Authentication happens upstream; the gateway forwards the authenticated staff id
//! in `x-actor-id`. Handlers receive it as an explicit value and pass it down.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::domain::value_objects::StaffId;

pub const ACTOR_HEADER: &str = "x-actor-id";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor(pub Option<StaffId>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(StaffId::from);
        Ok(Self(id))
    }
}
