use crate::error::{Result, VideoError};
use crate::video::VideoSettings;
use std::path::PathBuf;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";
pub const VOICE_ID: &str = "VOICE_ID";

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
const DEFAULT_TTS_MODEL: &str = "eleven_multilingual_v1";

/// 分镜数量，同时也是分镜结果被接受的最少行数
pub const DEFAULT_SCENE_COUNT: usize = 3;

/// 一次运行所需的全部配置，启动时解析一次，之后按引用传给各阶段
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub elevenlabs_api_key: String,
    pub voice_id: String,
    pub openai_base_url: String,
    pub elevenlabs_base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub image_size: String,
    pub tts_model: String,
    pub scene_count: usize,
    pub video: VideoSettings,
}

impl Config {
    /// 从进程环境变量读取配置（调用前应先执行 `dotenvy::dotenv()`）
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意 key -> value 查找函数构造配置，缺少的必填项会一次性全部报告
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            let found = value(key);
            if found.is_none() {
                missing.push(key);
            }
            found.unwrap_or_default()
        };

        let openai_api_key = required(OPENAI_API_KEY);
        let elevenlabs_api_key = required(ELEVENLABS_API_KEY);
        let voice_id = required(VOICE_ID);

        if !missing.is_empty() {
            return Err(VideoError::ConfigError(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let or_default = |key: &str, default: &str| value(key).unwrap_or_else(|| default.to_string());

        let video = VideoSettings {
            caption_font: value("CAPTION_FONT").map(PathBuf::from),
            ..VideoSettings::default()
        };

        Ok(Self {
            openai_api_key,
            elevenlabs_api_key,
            voice_id,
            openai_base_url: or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            elevenlabs_base_url: or_default("ELEVENLABS_BASE_URL", DEFAULT_ELEVENLABS_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            chat_model: or_default("OPENAI_CHAT_MODEL", DEFAULT_CHAT_MODEL),
            image_model: or_default("OPENAI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            image_size: or_default("OPENAI_IMAGE_SIZE", DEFAULT_IMAGE_SIZE),
            tts_model: or_default("ELEVENLABS_MODEL", DEFAULT_TTS_MODEL),
            scene_count: DEFAULT_SCENE_COUNT,
            video,
        })
    }
}
