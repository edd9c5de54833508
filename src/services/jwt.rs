use crate::error::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Distinguishes short-lived access tokens from long-lived refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user_id as string
    pub sub: String,
    /// Expiration time as Unix timestamp
    pub exp: i64,
    /// Issued at time as Unix timestamp
    pub iat: i64,
    pub token_type: TokenType,
}

/// Generates a signed JWT of the given type for a user.
///
/// # Example
/// ```rust,no_run
/// use clubhub::services::jwt::{generate_jwt, TokenType};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// let token = generate_jwt(Uuid::now_v7(), "my-secret", TokenType::Access, Duration::minutes(15))?;
/// # Ok::<(), clubhub::error::Error>(())
/// ```
pub fn generate_jwt(
    user_id: Uuid,
    secret: &str,
    token_type: TokenType,
    lifetime: Duration,
) -> Result<String> {
    let now = Utc::now();
    let expiration = now + lifetime;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp(),
        iat: now.timestamp(),
        token_type,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| Error::Internal(format!("Failed to generate JWT: {}", e)))
}

/// Verifies a JWT token and returns the claims if valid
///
/// # Errors
/// Returns an error if the token is invalid, expired, or has a bad signature
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        let error_msg = e.to_string().to_lowercase();
        if error_msg.contains("expired") {
            Error::Authentication("Token has expired".to_string())
        } else if error_msg.contains("signature") {
            Error::Authentication("Invalid token signature".to_string())
        } else {
            Error::Authentication(format!("Invalid token: {}", e))
        }
    })?;

    Ok(token_data.claims)
}

/// Verifies a token, checks it is of the `expected` type and returns the user ID.
pub fn get_user_id_from_token(token: &str, secret: &str, expected: TokenType) -> Result<Uuid> {
    let claims = verify_jwt(token, secret)?;
    if claims.token_type != expected {
        return Err(Error::Authentication(format!(
            "Expected a {} token",
            expected
        )));
    }
    Uuid::parse_str(&claims.sub)
        .map_err(|_| Error::Authentication("Invalid user_id in token".to_string()))
}

/// Validates an access token from the Authorization header and returns user_id.
/// Format: "Authorization: Bearer <token>"
pub fn authenticate_jwt_token(auth_header: Option<&str>, secret: &str) -> Result<Uuid> {
    let token = extract_token_from_header(auth_header)?;
    get_user_id_from_token(&token, secret, TokenType::Access)
}

/// Extracts the Bearer token from the Authorization header
fn extract_token_from_header(auth_header: Option<&str>) -> Result<String> {
    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            let token = header[7..].trim().to_string();
            if token.is_empty() {
                return Err(Error::Authentication("Empty token".to_string()));
            }
            Ok(token)
        }
        Some(_) => Err(Error::Authentication(
            "Invalid Authorization header format. Expected: 'Bearer <token>'".to_string(),
        )),
        None => Err(Error::Authentication("Missing Authorization header".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-testing";

    fn access_token(user_id: Uuid) -> String {
        generate_jwt(user_id, SECRET, TokenType::Access, Duration::minutes(15)).unwrap()
    }

    #[test]
    fn test_generate_jwt() {
        let token = access_token(Uuid::now_v7());
        assert!(!token.is_empty());
        assert!(token.contains('.'));
    }

    #[test]
    fn test_verify_jwt_valid() {
        let user_id = Uuid::now_v7();
        let claims = verify_jwt(&access_token(user_id), SECRET).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_verify_jwt_invalid_signature() {
        let token = access_token(Uuid::now_v7());
        assert!(verify_jwt(&token, "wrong-secret").is_err());
    }

    #[test]
    fn test_verify_jwt_expired() {
        let token =
            generate_jwt(Uuid::now_v7(), SECRET, TokenType::Access, Duration::minutes(-10)).unwrap();
        let err = verify_jwt(&token, SECRET).unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let user_id = Uuid::now_v7();
        let refresh = generate_jwt(user_id, SECRET, TokenType::Refresh, Duration::days(7)).unwrap();
        assert!(get_user_id_from_token(&refresh, SECRET, TokenType::Access).is_err());
        assert_eq!(
            get_user_id_from_token(&refresh, SECRET, TokenType::Refresh).unwrap(),
            user_id
        );
    }

    #[test]
    fn test_authenticate_jwt_token() {
        let user_id = Uuid::now_v7();
        let header = format!("Bearer {}", access_token(user_id));
        assert_eq!(authenticate_jwt_token(Some(&header), SECRET).unwrap(), user_id);
    }

    #[test]
    fn test_extract_token_from_header_missing() {
        assert!(extract_token_from_header(None).is_err());
    }

    #[test]
    fn test_extract_token_from_header_invalid_format() {
        assert!(extract_token_from_header(Some("InvalidFormat")).is_err());
    }

    #[test]
    fn test_extract_token_from_header_empty() {
        assert!(extract_token_from_header(Some("Bearer ")).is_err());
    }
}
