//! Turn a short story into a narrated, captioned video.
//!
//! The story is split into scenes by a chat model, each scene gets an image and
//! a narration clip, and ffmpeg stitches everything into one MP4.

pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scene;
pub mod video;

pub use config::Config;
pub use error::{Result, VideoError};
pub use pipeline::{Pipeline, RunReport};
