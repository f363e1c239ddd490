//! Shapes returned by the values API and the token endpoint.
//!
//! # Design
//! These mirror the mock-server's schema but are defined independently, so
//! integration tests catch drift between the two crates. Both derive
//! `Default` so they can be the target of a typed call whose body is empty.

use serde::{Deserialize, Serialize};

/// A single value resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thing {
    pub id: i64,
    pub name: String,
}

/// Body of a token exchange. Missing members decode to their defaults, so an
/// error reply reads as an empty token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}
