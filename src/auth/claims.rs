use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Role, Status};

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: Uuid,      // user ID
    pub email: String,
    pub role: Role,
    pub status: Status,
    pub jti: Uuid,      // unique token ID
    pub iss: String,    // issuer
    pub iat: usize,     // issued at (unix timestamp)
    pub exp: usize,     // expires at (unix timestamp)
}
