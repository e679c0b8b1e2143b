use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Staff member resolved from a validated bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

impl From<JwtClaims> for AdminUser {
    fn from(claims: JwtClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        }
    }
}

/// Raw bearer token for routes that only check the header is present.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);
