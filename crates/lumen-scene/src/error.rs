use std::fmt;

/// An error raised while loading or validating a scene.
#[derive(Debug)]
pub enum SceneError {
    /// The scene file or a referenced binary could not be read.
    Io { path: String, source: std::io::Error },

    /// The scene file is not valid JSON.
    Json(serde_json::Error),

    /// The document does not follow the s72 layout.
    Structure(String),

    /// An object names another object that does not exist.
    UnknownReference { kind: &'static str, name: String, from: String },

    /// An attribute or index payload uses a format the loader cannot decode.
    UnsupportedFormat { context: String, format: String },

    /// A payload read runs past the end of its binary blob.
    OutOfBounds { src: String, offset: usize, len: usize, available: usize },

    /// A mesh index refers past the end of its vertex arrays.
    IndexOutOfRange { mesh: String, index: u32, vertex_count: usize },

    /// A texture file could not be decoded.
    Image { path: String, message: String },
}

impl SceneError {
    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        SceneError::Structure(msg.into())
    }
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Io { path, source } => write!(f, "failed to read '{path}': {source}"),
            SceneError::Json(e) => write!(f, "scene is not valid JSON: {e}"),
            SceneError::Structure(msg) => write!(f, "malformed scene: {msg}"),
            SceneError::UnknownReference { kind, name, from } => {
                write!(f, "'{from}' references unknown {kind} '{name}'")
            }
            SceneError::UnsupportedFormat { context, format } => {
                write!(f, "{context}: unsupported format '{format}'")
            }
            SceneError::OutOfBounds { src, offset, len, available } => write!(
                f,
                "read of {len} bytes at offset {offset} overruns '{src}' ({available} bytes)"
            ),
            SceneError::IndexOutOfRange { mesh, index, vertex_count } => write!(
                f,
                "mesh '{mesh}': index {index} out of range for {vertex_count} vertices"
            ),
            SceneError::Image { path, message } => {
                write!(f, "failed to decode texture '{path}': {message}")
            }
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Io { source, .. } => Some(source),
            SceneError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(e: serde_json::Error) -> Self {
        SceneError::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, SceneError>;
