use std::path::PathBuf;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::Response,
};
use tracing::{info, warn};

use catroweb_types::api::{Claims, LogFilesResponse};

use crate::error::{ApiError, ApiResult};
use crate::media::attachment;
use crate::state::{AppState, run_db};

/// GET /admin/logs
pub async fn list_logs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<LogFilesResponse>> {
    require_super_admin(&state, &claims).await?;

    let mut files = Vec::new();
    let mut entries = match tokio::fs::read_dir(&state.log_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Json(LogFilesResponse { files }));
        }
        Err(e) => return Err(anyhow::Error::from(e).into()),
    };

    while let Some(entry) = entries.next_entry().await.map_err(anyhow::Error::from)? {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if let (true, Some(name)) = (is_file, entry.file_name().to_str()) {
            files.push(name.to_string());
        }
    }
    files.sort();

    Ok(Json(LogFilesResponse { files }))
}

/// GET /admin/logs/{file}
pub async fn download_log(
    State(state): State<AppState>,
    Path(file): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    require_super_admin(&state, &claims).await?;

    let path = resolve_log_path(&state.log_dir, &file).await?;
    let handle = tokio::fs::File::open(&path).await.map_err(|e| {
        warn!("Failed to open log file {}: {}", path.display(), e);
        ApiError::NotFound(format!("Log file {}", file))
    })?;

    info!("{} downloaded log file {}", claims.username, file);
    Ok(attachment(&file, handle))
}

async fn require_super_admin(state: &AppState, claims: &Claims) -> ApiResult<()> {
    let user_id = claims.sub.to_string();
    let user = run_db(state, move |db| db.get_user_by_id(&user_id))
        .await?
        .filter(|u| u.enabled)
        .ok_or(ApiError::Unauthorized)?;

    if !user.super_admin {
        warn!("{} tried to access admin logs without privileges", user.username);
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

/// Resolve `name` to a regular file directly inside `log_dir`.
async fn resolve_log_path(log_dir: &std::path::Path, name: &str) -> ApiResult<PathBuf> {
    let is_plain_name = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..");
    if !is_plain_name {
        return Err(ApiError::BadRequest(format!("invalid log file name: {}", name)));
    }

    let not_found = || ApiError::NotFound(format!("Log file {}", name));

    let root = tokio::fs::canonicalize(log_dir).await.map_err(|_| not_found())?;
    let candidate = tokio::fs::canonicalize(root.join(name)).await.map_err(|_| not_found())?;

    // Symlinks could still point elsewhere
    if !candidate.starts_with(&root) {
        warn!("Log file {} resolves outside the log directory", name);
        return Err(not_found());
    }

    let metadata = tokio::fs::metadata(&candidate).await.map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::{Method, StatusCode, header};

    use crate::test_support::{TestApp, body_json};

    fn seeded() -> (TestApp, String, String) {
        let app = TestApp::new();
        let admin = app.user("admin", "secret1");
        app.state.db.set_super_admin(&admin, true).unwrap();
        let user = app.user("catty", "secret1");

        std::fs::write(app.state.log_dir.join("prod.log"), "line one\nline two\n").unwrap();
        std::fs::write(app.state.log_dir.join("dev.log"), "debug").unwrap();
        std::fs::create_dir(app.state.log_dir.join("archive")).unwrap();

        let admin_token = app.token_for(&admin, "admin");
        let user_token = app.token_for(&user, "catty");
        (app, admin_token, user_token)
    }

    #[tokio::test]
    async fn super_admin_downloads_log_as_attachment() {
        let (app, admin, _) = seeded();

        let response = app.request(Method::GET, "/admin/logs/prod.log", Some(&admin)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"prod.log\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"line one\nline two\n");
    }

    #[tokio::test]
    async fn quotes_in_log_names_are_escaped_in_header() {
        let (app, admin, _) = seeded();
        std::fs::write(app.state.log_dir.join("odd\"name.log"), "x").unwrap();

        let response = app.request(Method::GET, "/admin/logs/odd%22name.log", Some(&admin)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"odd_name.log\""
        );
    }

    #[tokio::test]
    async fn lists_only_files() {
        let (app, admin, _) = seeded();

        let response = app.request(Method::GET, "/admin/logs", Some(&admin)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["files"], serde_json::json!(["dev.log", "prod.log"]));
    }

    #[tokio::test]
    async fn gate_rejects_anonymous_and_regular_users() {
        let (app, _, user) = seeded();

        let response = app.request(Method::GET, "/admin/logs/prod.log", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app.request(Method::GET, "/admin/logs/prod.log", Some(&user)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.request(Method::GET, "/admin/logs", Some(&user)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn traversal_attempts_are_refused() {
        let (app, admin, _) = seeded();
        std::fs::write(app.state.log_dir.parent().unwrap().join("secret.txt"), "x").unwrap();

        for uri in [
            "/admin/logs/..%2Fsecret.txt",
            "/admin/logs/..",
            "/admin/logs/.hidden",
            "/admin/logs/a%5Cb",
        ] {
            let response = app.request(Method::GET, uri, Some(&admin)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[tokio::test]
    async fn missing_or_non_file_entries_are_404() {
        let (app, admin, _) = seeded();

        let response = app.request(Method::GET, "/admin/logs/nope.log", Some(&admin)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.request(Method::GET, "/admin/logs/archive", Some(&admin)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_out_of_the_log_dir_are_404() {
        let (app, admin, _) = seeded();
        let outside = app.state.log_dir.parent().unwrap().join("outside.txt");
        std::fs::write(&outside, "x").unwrap();
        std::os::unix::fs::symlink(&outside, app.state.log_dir.join("link.log")).unwrap();

        let response = app.request(Method::GET, "/admin/logs/link.log", Some(&admin)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
