use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::info;

use catroweb_types::api::{Claims, ReactionQuery, ReactionRequest, ReactionSummary};
use catroweb_types::like::LikeType;

use crate::error::{ApiError, ApiResult};
use crate::middleware::bearer_claims;
use crate::state::{AppState, run_db};

/// POST /api/project/{id}/reaction
///
/// Adding a reaction the user already left is not an error; the existing
/// row and its timestamp are kept.
pub async fn add_reaction(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReactionRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let like_type = req.like_type;

    let pid = program_id.clone();
    let added = run_db(&state, move |db| {
        if db.get_program(&pid)?.is_none() {
            return Ok(None);
        }
        db.add_like(&pid, &user_id, like_type).map(Some)
    })
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Project {}", program_id)))?;

    if added {
        info!("{} reacted {} on project {}", claims.username, like_type, program_id);
    }

    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(serde_json::json!({ "added": added }))))
}

/// DELETE /api/project/{id}/reaction?type=...
pub async fn remove_reaction(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ReactionQuery>,
) -> ApiResult<StatusCode> {
    let user_id = claims.sub.to_string();
    let like_type = query.like_type;

    let pid = program_id.clone();
    let removed = run_db(&state, move |db| db.remove_like(&pid, &user_id, like_type)).await?;

    if !removed {
        return Err(ApiError::NotFound(format!("{} reaction on project {}", like_type, program_id)));
    }

    info!("{} removed {} from project {}", claims.username, like_type, program_id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/project/{id}/reactions
///
/// Public. A valid bearer token additionally reports the caller's own reactions.
pub async fn get_reactions(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<ReactionSummary>> {
    let viewer = bearer_claims(&headers, &state.jwt_secret).map(|c| c.sub.to_string());

    let pid = program_id.clone();
    let (counts, active) = run_db(&state, move |db| {
        if db.get_program(&pid)?.is_none() {
            return Ok(None);
        }
        let counts = db.like_counts(&pid)?;
        let active = viewer.map(|uid| db.user_like_types(&pid, &uid)).transpose()?;
        Ok(Some((counts, active)))
    })
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Project {}", program_id)))?;

    Ok(Json(summarize(&counts, active)))
}

fn summarize(counts: &[(LikeType, u64)], active_types: Option<Vec<LikeType>>) -> ReactionSummary {
    let mut summary = ReactionSummary {
        active_types,
        ..Default::default()
    };

    for &(like_type, count) in counts {
        summary.total += count;
        match like_type {
            LikeType::ThumbsUp => summary.thumbs_up = count,
            LikeType::Smile => summary.smile = count,
            LikeType::Love => summary.love = count,
            LikeType::Wow => summary.wow = count,
        }
    }

    summary
}
