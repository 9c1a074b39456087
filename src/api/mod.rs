mod elevenlabs;
mod openai;

pub use elevenlabs::ElevenLabsClient;
pub use openai::OpenAiClient;

use crate::error::Result;
use async_trait::async_trait;

/// 对话消息，对应 chat completions 接口里的 `{role, content}`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// 文本补全服务：返回模型生成的原始文本
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// 图片生成服务：根据提示词生成一张图片并返回下载后的原始字节
#[async_trait]
pub trait ImageGeneration: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;
}

/// 语音合成服务：返回合成后的音频字节（mp3）
#[async_trait]
pub trait SpeechSynthesis: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
