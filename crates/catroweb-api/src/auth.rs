use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;
use uuid::Uuid;

use catroweb_types::api::{Claims, LoginRequest, LoginResponse};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, run_db};

const TOKEN_LIFETIME_DAYS: i64 = 30;

/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let username = req.username.clone();
    let user = run_db(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    verify_password(&req.password, &user.password)?;

    if !user.enabled {
        return Err(ApiError::Unauthorized);
    }

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("Corrupt user id '{}': {}", user.id, e))?;

    let token = create_token(&state.jwt_secret, user_id, &user.username)?;

    info!("User {} logged in", user.username);
    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        token,
    }))
}

/// Hash with Argon2id and a random salt.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, stored_hash: &str) -> ApiResult<()> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("Corrupt password hash: {}", e))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::Unauthorized)
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::bearer_claims;
    use axum::http::{HeaderMap, HeaderValue, header};

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("secret123").unwrap();
        assert!(verify_password("secret123", &hash).is_ok());
        assert!(matches!(verify_password("wrong", &hash), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn issued_token_is_accepted_with_same_secret_only() {
        let user_id = Uuid::new_v4();
        let token = create_token("s3cret", user_id, "catty").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let claims = bearer_claims(&headers, "s3cret").unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "catty");
        assert!(bearer_claims(&headers, "other").is_none());
    }
}
