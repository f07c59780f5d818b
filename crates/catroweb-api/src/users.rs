use axum::{Json, extract::State, http::StatusCode, response::IntoResponse, response::Response};
use tracing::{info, warn};
use uuid::Uuid;

use catroweb_crypto::tokens::generate_upload_token;
use catroweb_db::users::{NewUser, is_unique_violation};
use catroweb_types::api::{RegisterRequest, RegisterResponse};

use crate::auth::{create_token, hash_password};
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, run_db};
use crate::validation::validate_registration;

/// POST /api/user
///
/// Validates every field, then creates an enabled account with a fresh upload
/// token. With `dry_run` set, a clean request answers 204 and stores nothing.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Response> {
    let (errors, req) = run_db(&state, move |db| {
        let errors = validate_registration(&req, |value| db.is_identifier_taken(value))?;
        Ok((errors, req))
    })
    .await?;

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if req.dry_run {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    // Validation guarantees all three are present
    let retry = req.clone();
    let (Some(email), Some(username), Some(password)) = (req.email, req.username, req.password)
    else {
        return Err(ApiError::BadRequest("incomplete registration".into()));
    };

    let password_hash = hash_password(&password)?;
    let upload_token = generate_upload_token();
    let user_id = Uuid::new_v4();

    let name = username.clone();
    let conflict = run_db(&state, move |db| {
        let created = db.create_user(&NewUser {
            id: &user_id.to_string(),
            username: &name,
            email: &email,
            password_hash: &password_hash,
            upload_token: &upload_token,
        });
        match created {
            Ok(()) => Ok(None),
            // A concurrent registration took the name or email after validation
            Err(e) if is_unique_violation(&e) => {
                let errors = validate_registration(&retry, |value| db.is_identifier_taken(value))?;
                if errors.is_empty() {
                    return Err(e);
                }
                Ok(Some(errors))
            }
            Err(e) => Err(e),
        }
    })
    .await?;

    if let Some(errors) = conflict {
        warn!("Registration of {} lost a race for its identifiers", username);
        return Err(ApiError::Validation(errors));
    }

    let token = create_token(&state.jwt_secret, user_id, &username)?;

    info!("Registered user {} ({})", username, user_id);
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })).into_response())
}

/// DELETE /api/user
pub async fn delete_user() -> ApiError {
    ApiError::NotImplemented
}

/// GET /api/user
pub async fn get_current_user() -> ApiError {
    ApiError::NotImplemented
}

/// PUT /api/user
pub async fn update_user() -> ApiError {
    ApiError::NotImplemented
}

/// GET /api/user/{id}
pub async fn get_user() -> ApiError {
    ApiError::NotImplemented
}

/// GET /api/users/search
pub async fn search_users() -> ApiError {
    ApiError::NotImplemented
}
