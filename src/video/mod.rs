mod caption;
mod ffmpeg;
mod generator;

pub use caption::{caption_font_size, caption_line_width, escape_filter_value, wrap_caption};
pub use ffmpeg::{probe_duration, run_ffmpeg};
pub use generator::{
    resolve_music, MusicMix, ProbedScene, RenderPlan, RenderSummary, SubClip, VideoGenerator,
};

use std::path::PathBuf;

/// 视频合成参数
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSettings {
    pub fps: u32,
    pub video_codec: String,
    pub audio_codec: String,
    /// 背景音乐相对原始音量的比例
    pub music_volume: f64,
    /// 字幕宽度占画面宽度的比例
    pub caption_width_ratio: f64,
    /// 512 像素宽画面上的字号，实际字号按画面宽度等比缩放
    pub caption_font_size: u32,
    /// 未设置时由 ffmpeg 通过 fontconfig 选择默认字体
    pub caption_font: Option<PathBuf>,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            fps: 24,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            music_volume: 0.1,
            caption_width_ratio: 0.9,
            caption_font_size: 24,
            caption_font: None,
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}
