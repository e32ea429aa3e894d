//! Error types for the snapshot pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors computing a bounding box from a center and radius.
#[derive(Debug, Error)]
pub enum BoundsError {
    /// Center coordinate is NaN or infinite.
    #[error("Center ({lat}, {lon}) is not a finite coordinate")]
    NonFiniteCenter { lat: f64, lon: f64 },

    /// Radius or size must be strictly positive.
    #[error("Extent must be positive, got {0}")]
    NonPositiveExtent(f64),

    /// Latitude outside the supported range of the chosen projection.
    #[error("Latitude {lat} is outside the supported range (|lat| < {limit})")]
    UnsupportedLatitude { lat: f64, limit: f64 },

    /// Box would extend past ±180° longitude; wrapping boxes are not supported.
    #[error("Bounding box crosses the antimeridian (west {west}, east {east})")]
    CrossesAntimeridian { west: f64, east: f64 },

    /// Projection produced a box that is empty or inverted.
    #[error("Computed bounding box is degenerate")]
    Degenerate,
}

/// Errors from a single attempt against the query service.
///
/// These never escape the fetcher; they are logged and retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or transport level failure.
    #[error("Request failed: {0}")]
    Transport(String),

    /// Service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be read.
    #[error("Failed to read response: {0}")]
    Body(String),

    /// Response body is not a valid Overpass JSON document.
    #[error("Malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Snapshot for replay could not be read.
    #[error("Failed to read snapshot {path}: {source}")]
    Replay {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors drawing the map.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Pixmap could not be allocated for the requested size.
    #[error("Cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    /// Canvas pixels do not fill an image of the canvas size.
    #[error("Pixel buffer of {len} bytes does not match a {width}x{height} image")]
    PixelBuffer { width: u32, height: u32, len: usize },

    /// A feature's geometry could not be turned into a drawable path.
    #[error("Feature {index} of {layer} has no drawable path")]
    InvalidPath { layer: String, index: usize },
}

/// Run level errors. Anything reaching this type ends the run.
#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Bounds(#[from] BoundsError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

impl MapError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MapError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
