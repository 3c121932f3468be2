use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChromaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Channel plane size mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    ChannelMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ChromaError>;
