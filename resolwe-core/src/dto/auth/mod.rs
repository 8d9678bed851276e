//! Authentication DTOs

use serde::{Deserialize, Serialize};

/// Credentials posted to the session login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
