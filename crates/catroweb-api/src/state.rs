use std::path::PathBuf;
use std::sync::Arc;

use tracing::error;

use catroweb_db::Database;

use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Directory served by the admin log download.
    pub log_dir: PathBuf,
    /// Directory holding media library files as `{id}.{extension}`.
    pub media_dir: PathBuf,
    /// Report media lookup failures only through `statusCode` in the body,
    /// always answering HTTP 200, as older app versions expect.
    pub legacy_status_in_body: bool,
}

/// Run blocking database work off the async runtime.
pub async fn run_db<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("database task failed"))
        })?
        .map_err(ApiError::from)
}
