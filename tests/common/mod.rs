#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use story_video::api::{ChatMessage, ImageGeneration, SpeechSynthesis, TextCompletion};
use story_video::{Config, Result, VideoError};

pub const STORY: &str = "A dog finds a key. The dog opens a door. The dog meets a friend.";

pub fn test_config() -> Config {
    let values: HashMap<&str, &str> = [
        ("OPENAI_API_KEY", "sk-test"),
        ("ELEVENLABS_API_KEY", "el-test"),
        ("VOICE_ID", "voice-test"),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| values.get(key).map(|v| v.to_string())).unwrap()
}

/// 固定返回一段文本，并记录收到的请求
pub struct StubCompletion {
    reply: std::result::Result<String, String>,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextCompletion for StubCompletion {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.reply.clone().map_err(VideoError::ApiError)
    }
}

/// 按调用顺序返回预设的图片字节
pub struct StubImages {
    payload: Vec<u8>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubImages {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ImageGeneration for StubImages {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.payload.clone())
    }
}

/// 每次调用依次取出一段音频；`fail_on` 指定第几次调用返回错误
pub struct StubSpeech {
    clips: Mutex<Vec<Vec<u8>>>,
    fail_on: Option<usize>,
    pub texts: Mutex<Vec<String>>,
}

impl StubSpeech {
    pub fn new(clips: Vec<Vec<u8>>) -> Self {
        Self {
            clips: Mutex::new(clips),
            fail_on: None,
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(clip: Vec<u8>, count: usize) -> Self {
        Self::new(vec![clip; count])
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }
}

#[async_trait]
impl SpeechSynthesis for StubSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let call = {
            let mut texts = self.texts.lock().unwrap();
            texts.push(text.to_string());
            texts.len() - 1
        };

        if self.fail_on == Some(call) {
            return Err(VideoError::ApiError("TTS API error (500): upstream failure".to_string()));
        }

        let mut clips = self.clips.lock().unwrap();
        if clips.is_empty() {
            return Err(VideoError::ApiError("no more stub audio".to_string()));
        }
        Ok(clips.remove(0))
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160]));
    let mut buffer = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
