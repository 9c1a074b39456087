use thiserror::Error;

#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Story text is empty")]
    EmptyStory,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Scene processing error: {0}")]
    SceneError(String),

    #[error("Missing scene asset: {0}")]
    MissingAsset(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("FFmpeg error: {0}")]
    FfmpegError(String),
}

pub type Result<T> = std::result::Result<T, VideoError>;
