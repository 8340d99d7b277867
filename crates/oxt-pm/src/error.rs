use oxt_semver::VersionParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequirementsError {
    // Manifest errors
    #[error("Failed to parse pyproject.toml: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to parse extension config: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid manifest: {message}")]
    InvalidManifest { message: String },

    // Package errors
    #[error("Package not found: {name}")]
    PackageNotFound { name: String },

    // Version constraint errors
    #[error(transparent)]
    Version(#[from] VersionParserError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RequirementsError {
    pub(crate) fn manifest(message: impl Into<String>) -> Self {
        RequirementsError::InvalidManifest {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RequirementsError>;
