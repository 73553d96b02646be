use thiserror::Error;

/// Main error type for the JVC importer library
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading MEDIAPRO.xml. All of them abort the run.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("MEDIAPRO.xml not found at {path}")]
    NotFound { path: String },

    #[error("Malformed XML in {path}: {reason}")]
    Xml { path: String, reason: String },

    #[error("Material '{clip}' has no <{element}> element")]
    MissingElement { clip: String, element: String },

    #[error("Material '{clip}' is missing attribute '{attribute}'")]
    MissingAttribute { clip: String, attribute: String },

    #[error("Material '{clip}' has invalid {attribute} = '{value}'")]
    InvalidAttribute {
        clip: String,
        attribute: String,
        value: String,
    },
}

/// Per-clip encoding errors
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Video file not found: {path}")]
    SourceNotFound { path: String },

    #[error("Failed to spawn {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Encoder exited with status {} while writing {output}", describe_code(.code))]
    ProcessFailed { output: String, code: Option<i32> },

    #[error("Encoder '{program}' is not available")]
    ToolUnavailable { program: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

/// Convenience type alias for Results using ImportError
pub type Result<T> = std::result::Result<T, ImportError>;

impl ImportError {
    /// Whether this error only concerns a single clip, so the batch can move on
    pub fn is_clip_scoped(&self) -> bool {
        match self {
            Self::Encode(EncodeError::ToolUnavailable { .. }) => false,
            Self::Encode(_) | Self::Io(_) => true,
            Self::Manifest(_) | Self::Config(_) => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Manifest(ManifestError::NotFound { path }) => {
                format!("MEDIAPRO.xml not found at '{}'. Is --source pointing at the SD card root?", path)
            }
            Self::Encode(EncodeError::SourceNotFound { path }) => {
                format!("Video file '{}' listed in the manifest is missing from the card.", path)
            }
            Self::Encode(EncodeError::ToolUnavailable { program }) => {
                format!("Could not run '{}'. Please install FFmpeg or set encoder.ffmpeg_path.", program)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
