use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload carried by every session credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,           // user ID
    pub upn: String,         // username
    pub groups: Vec<String>, // roles
    pub iat: usize,          // issued at (unix timestamp)
    pub exp: usize,          // expires at (unix timestamp)
    pub iss: String,         // issuer
    pub aud: String,         // audience
}
