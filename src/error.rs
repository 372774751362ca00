use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for persisted level data.
#[derive(Debug)]
pub enum WorldError {
    /// File I/O error
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// JSON error tied to a file on disk
    Json {
        /// File being decoded
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
    /// JSON error for in-memory text
    Parse(serde_json::Error),
    /// A layer's rows/cells do not match the declared map dimensions
    InvalidLayerSize {
        /// Layer name
        layer: String,
        /// Declared `(width, height)`
        expected: (usize, usize),
        /// Offending `(row length, row count)`
        found: (usize, usize),
    },
    /// A cell carries an id outside the known tile table
    UnknownTileId {
        /// Layer name
        layer: String,
        /// Column of the cell
        x: usize,
        /// Row of the cell
        y: usize,
        /// Raw id found
        id: u32,
    },
    /// Declared map dimensions exceed the loadable cell count
    MapTooLarge {
        /// Declared width in tiles
        width: usize,
        /// Declared height in tiles
        height: usize,
        /// Maximum cells per layer
        limit: usize,
    },
    /// Unsupported file format (non-JSON)
    UnsupportedFormat(String),
    /// Map file does not exist
    MapNotFound(PathBuf),
}

/// Result alias used by the persistence layer.
pub type Result<T> = std::result::Result<T, WorldError>;

impl From<serde_json::Error> for WorldError {
    fn from(err: serde_json::Error) -> Self {
        WorldError::Parse(err)
    }
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            WorldError::Json { path, source } => {
                write!(f, "JSON error in {}: {}", path.display(), source)
            }
            WorldError::Parse(e) => write!(f, "JSON parse error: {}", e),
            WorldError::InvalidLayerSize {
                layer,
                expected,
                found,
            } => write!(
                f,
                "Invalid layer size for layer '{}': expected {}x{}, found {}x{}",
                layer, expected.0, expected.1, found.0, found.1
            ),
            WorldError::UnknownTileId { layer, x, y, id } => {
                write!(f, "Unknown tile id {} in layer '{}' at ({}, {})", id, layer, x, y)
            }
            WorldError::MapTooLarge {
                width,
                height,
                limit,
            } => write!(
                f,
                "Map {}x{} exceeds the limit of {} cells per layer",
                width, height, limit
            ),
            WorldError::UnsupportedFormat(path) => write!(f, "Unsupported file format: {}", path),
            WorldError::MapNotFound(path) => write!(f, "Map file not found: {}", path.display()),
        }
    }
}

impl std::error::Error for WorldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorldError::Io { source, .. } => Some(source),
            WorldError::Json { source, .. } => Some(source),
            WorldError::Parse(e) => Some(e),
            _ => None,
        }
    }
}
