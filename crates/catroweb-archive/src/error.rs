use thiserror::Error;

pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk archive directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive entry escapes the target directory: {0}")]
    UnsafeEntry(String),

    #[error("Unexpected files in program archive: {}", .unexpected.join(", "))]
    InvalidFileStructure { unexpected: Vec<String> },
}
