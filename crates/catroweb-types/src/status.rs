use serde::Serialize;

/// Application status codes carried in the `statusCode` field of media
/// library responses. Existing clients read these instead of the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStatus {
    Ok,
    PackageNotFound,
    CategoryNotFound,
    FileNotFound,
}

impl MediaStatus {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::PackageNotFound => 523,
            Self::CategoryNotFound => 524,
            Self::FileNotFound => 525,
        }
    }
}

/// Envelope for every media library response.
#[derive(Debug, Serialize)]
pub struct MediaResponse<T> {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> MediaResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status_code: MediaStatus::Ok.code(),
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(status: MediaStatus, message: impl Into<String>) -> Self {
        Self {
            status_code: status.code(),
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status_code == MediaStatus::Ok.code()
    }
}
