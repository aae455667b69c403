use thiserror::Error;

/// Raised when the source data of a raster image cannot be read.
///
/// Colour and bit-depth reduction never fail; only unreadable or malformed
/// input does, or an image the output format cannot describe.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Image data is unavailable: {0}")]
    Unreadable(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Raster data has {actual} bytes, expected {expected} for its dimensions")]
    DataLength { expected: usize, actual: usize },

    #[error("Unsupported packed sample depth {0}; expected 1, 2, 4 or 8 bits")]
    UnsupportedDepth(u8),

    #[error("Image {field} {value} exceeds the format limit of {limit}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        limit: u32,
    },
}

/// An [`EncodingError`] with the page and image it happened on.
#[derive(Error, Debug)]
#[error("Page {page}, image '{image}': {error}")]
pub struct PageImageError {
    pub page: usize,
    pub image: String,
    #[source]
    pub error: EncodingError,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error(transparent)]
    Image(#[from] PageImageError),
    #[error("Renderer used out of order: {0}")]
    State(String),
    #[error("Other rendering error: {0}")]
    Other(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

impl From<&str> for RenderError {
    fn from(s: &str) -> Self {
        RenderError::Other(s.to_string())
    }
}
