use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use catroweb_db::Database;
use catroweb_db::models::{MediaFileRow, MediaPackageRow};
use catroweb_types::api::MediaFileResponse;
use catroweb_types::status::{MediaResponse, MediaStatus};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, run_db};

#[derive(Debug, Default, Deserialize)]
pub struct FlavorQuery {
    pub flavor: Option<String>,
}

/// A lookup that ended before reaching any file.
#[derive(Debug)]
struct Miss {
    status: MediaStatus,
    message: String,
}

impl Miss {
    fn package(name: &str) -> Self {
        Self {
            status: MediaStatus::PackageNotFound,
            message: format!("{} not found", name),
        }
    }

    fn category(name: &str) -> Self {
        Self {
            status: MediaStatus::CategoryNotFound,
            message: format!("{} not found", name),
        }
    }

    fn files() -> Self {
        Self {
            status: MediaStatus::FileNotFound,
            message: "No media files found".to_string(),
        }
    }
}

type Lookup = Result<Vec<MediaFileRow>, Miss>;

/// GET /api/media/files/json
pub async fn list_all_files(
    State(state): State<AppState>,
    Query(query): Query<FlavorQuery>,
) -> ApiResult<Response> {
    let lookup = run_db(&state, |db| Ok(Ok(db.get_all_media_files()?))).await?;
    Ok(file_list_response(&state, lookup, query.flavor.as_deref()))
}

/// GET /api/media/package/{package}/json
pub async fn list_package_files(
    State(state): State<AppState>,
    Path(package): Path<String>,
    Query(query): Query<FlavorQuery>,
) -> ApiResult<Response> {
    let lookup = run_db(&state, move |db| {
        let found = db.get_media_package_by_name(&package)?;
        package_files(db, found, &package, None)
    })
    .await?;
    Ok(file_list_response(&state, lookup, query.flavor.as_deref()))
}

/// GET /api/media/packageByNameUrl/{package}/json
pub async fn list_package_files_by_name_url(
    State(state): State<AppState>,
    Path(name_url): Path<String>,
    Query(query): Query<FlavorQuery>,
) -> ApiResult<Response> {
    let lookup = run_db(&state, move |db| {
        let found = db.get_media_package_by_name_url(&name_url)?;
        package_files(db, found, &name_url, None)
    })
    .await?;
    Ok(file_list_response(&state, lookup, query.flavor.as_deref()))
}

/// GET /api/media/package/{package}/{category}/json
pub async fn list_package_category_files(
    State(state): State<AppState>,
    Path((package, category)): Path<(String, String)>,
    Query(query): Query<FlavorQuery>,
) -> ApiResult<Response> {
    let lookup = run_db(&state, move |db| {
        let found = db.get_media_package_by_name(&package)?;
        package_files(db, found, &package, Some(&category))
    })
    .await?;
    Ok(file_list_response(&state, lookup, query.flavor.as_deref()))
}

/// GET /api/media/category/{category}/json
///
/// Matches the category name in every package.
pub async fn list_category_files(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<FlavorQuery>,
) -> ApiResult<Response> {
    let lookup = run_db(&state, move |db| {
        let ids = matching_category_ids(db, None, &category)?;
        if ids.is_empty() {
            return Ok(Err(Miss::category(&category)));
        }
        Ok(Ok(db.get_media_files_of_categories(&ids)?))
    })
    .await?;
    Ok(file_list_response(&state, lookup, query.flavor.as_deref()))
}

/// GET /api/media/file/{id}/json
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<FlavorQuery>,
) -> ApiResult<Response> {
    let file = match id.parse::<i64>() {
        Ok(file_id) => run_db(&state, move |db| db.get_media_file(file_id)).await?,
        Err(_) => None,
    };

    let visible = file.filter(|f| query.flavor.as_deref().is_none_or(|flavor| f.visible_to(flavor)));
    let body = match visible {
        Some(f) => MediaResponse::ok(to_response(&f)),
        None => MediaResponse::failure(MediaStatus::FileNotFound, format!("{} not found", id)),
    };
    Ok(media_response(&state, body))
}

/// GET /api/media/file/{id}/download
///
/// Streams the stored file and bumps its download counter.
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let not_found = || ApiError::NotFound(format!("Media file {}", id));
    let file_id: i64 = id.parse().map_err(|_| not_found())?;
    let file = run_db(&state, move |db| db.get_media_file(file_id))
        .await?
        .ok_or_else(not_found)?;

    // Extensions come from the catalog, but they end up in a path
    if file.extension.is_empty() || !file.extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        warn!("Media file {} has unusable extension '{}'", id, file.extension);
        return Err(not_found());
    }

    let path = state.media_dir.join(format!("{}.{}", file.id, file.extension));
    let handle = tokio::fs::File::open(&path).await.map_err(|e| {
        warn!("Failed to open media file {}: {}", path.display(), e);
        not_found()
    })?;

    run_db(&state, move |db| db.increment_media_file_downloads(file_id)).await?;
    info!("Serving media file {} ({}.{})", id, file.name, file.extension);

    Ok(attachment(&format!("{}.{}", file.name, file.extension), handle))
}

/// Stream `handle` as a download named `filename`.
pub(crate) fn attachment(filename: &str, handle: tokio::fs::File) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        filename.replace(['"', '\\', '\r', '\n'], "_")
    );
    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(handle)),
    )
        .into_response()
}

// -- Lookup helpers --

fn package_files(
    db: &Database,
    package: Option<MediaPackageRow>,
    requested: &str,
    category: Option<&str>,
) -> anyhow::Result<Lookup> {
    let Some(package) = package else {
        return Ok(Err(Miss::package(requested)));
    };

    let ids = match category {
        Some(name) => {
            let ids = matching_category_ids(db, Some(package.id), name)?;
            if ids.is_empty() {
                return Ok(Err(Miss::category(name)));
            }
            ids
        }
        None => db
            .get_media_categories(Some(package.id))?
            .into_iter()
            .map(|c| c.id)
            .collect(),
    };

    Ok(Ok(db.get_media_files_of_categories(&ids)?))
}

/// Category ids whose name equals `name`, ignoring case.
fn matching_category_ids(db: &Database, package_id: Option<i64>, name: &str) -> anyhow::Result<Vec<i64>> {
    let wanted = name.to_lowercase();
    Ok(db
        .get_media_categories(package_id)?
        .into_iter()
        .filter(|c| c.name.to_lowercase() == wanted)
        .map(|c| c.id)
        .collect())
}

// -- Response shaping --

fn file_list_response(state: &AppState, lookup: Lookup, flavor: Option<&str>) -> Response {
    let body = match lookup {
        Err(miss) => MediaResponse::failure(miss.status, miss.message),
        Ok(files) => {
            let files: Vec<MediaFileResponse> = files
                .iter()
                .filter(|f| flavor.is_none_or(|flavor| f.visible_to(flavor)))
                .map(to_response)
                .collect();

            if files.is_empty() {
                let miss = Miss::files();
                MediaResponse::failure(miss.status, miss.message)
            } else {
                MediaResponse::ok(files)
            }
        }
    };
    media_response(state, body)
}

fn media_response<T: Serialize>(state: &AppState, body: MediaResponse<T>) -> Response {
    let status = if state.legacy_status_in_body || body.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Json(body)).into_response()
}

fn to_response(file: &MediaFileRow) -> MediaFileResponse {
    MediaFileResponse {
        id: file.id,
        name: file.name.clone(),
        flavors: file.flavor_list(),
        package: file.package_name.clone(),
        category: file.category_name.clone(),
        author: file.author.clone(),
        extension: file.extension.clone(),
        download_url: format!("/api/media/file/{}/download", file.id),
    }
}
