use serde::{Deserialize, Serialize};

/// Name of the http-only cookie that carries the session token.
pub const SESSION_COOKIE: &str = "auth_token";

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SuccessResponse {
    pub message: String,
}

/// Base URL of the storefront frontend; reset links point into it.
#[derive(Clone, Debug)]
pub struct FrontendUrl(pub String);
