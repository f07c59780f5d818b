use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, likes, logs, media, users};

/// Every route of the share API. Transport layers (CORS, tracing) are added
/// by the server binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route(
            "/api/user",
            post(users::register)
                .get(users::get_current_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/user/login", post(auth::login))
        .route("/api/user/{id}", get(users::get_user))
        .route("/api/users/search", get(users::search_users))
        .route("/api/media/files/json", get(media::list_all_files))
        .route("/api/media/package/{package}/json", get(media::list_package_files))
        .route(
            "/api/media/packageByNameUrl/{package}/json",
            get(media::list_package_files_by_name_url),
        )
        .route(
            "/api/media/package/{package}/{category}/json",
            get(media::list_package_category_files),
        )
        .route("/api/media/category/{category}/json", get(media::list_category_files))
        .route("/api/media/file/{id}/json", get(media::get_file))
        .route("/api/media/file/{id}/download", get(media::download_file))
        .route("/api/project/{id}/reactions", get(likes::get_reactions))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route(
            "/api/project/{id}/reaction",
            post(likes::add_reaction).delete(likes::remove_reaction),
        )
        .route("/admin/logs", get(logs::list_logs))
        .route("/admin/logs/{file}", get(logs::download_log))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
