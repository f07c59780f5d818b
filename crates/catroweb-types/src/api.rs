use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::like::LikeType;

// -- JWT Claims --

/// JWT claims issued on registration and login, checked by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Users --

/// Every field is optional on the wire so that a missing value is reported
/// as a validation message rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

/// Field name -> first failing rule's message.
pub type ValidationErrors = BTreeMap<&'static str, &'static str>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Reactions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactionRequest {
    #[serde(rename = "type")]
    pub like_type: LikeType,
}

#[derive(Debug, Deserialize)]
pub struct ReactionQuery {
    #[serde(rename = "type")]
    pub like_type: LikeType,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReactionSummary {
    pub total: u64,
    pub thumbs_up: u64,
    pub smile: u64,
    pub love: u64,
    pub wow: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_types: Option<Vec<LikeType>>,
}

// -- Media library --

/// Flat record for a single media file, independent of where it sits in
/// the package/category tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFileResponse {
    pub id: i64,
    pub name: String,
    pub flavors: Vec<String>,
    pub package: String,
    pub category: String,
    pub author: String,
    pub extension: String,
    pub download_url: String,
}

// -- Admin --

#[derive(Debug, Serialize, Deserialize)]
pub struct LogFilesResponse {
    pub files: Vec<String>,
}
