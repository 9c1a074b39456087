use super::SpeechSynthesis;
use crate::config::Config;
use crate::error::{Result, VideoError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

/// ElevenLabs 语音合成客户端，音色在启动时确定
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    api_key: String,
    base_url: String,
    voice_id: String,
    model_id: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct TextToSpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl ElevenLabsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            api_key: config.elevenlabs_api_key.clone(),
            base_url: config.elevenlabs_base_url.clone(),
            voice_id: config.voice_id.clone(),
            model_id: config.tts_model.clone(),
            client,
        })
    }

    fn speech_url(&self) -> String {
        format!("{}/text-to-speech/{}", self.base_url, self.voice_id)
    }
}

#[async_trait]
impl SpeechSynthesis for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        info!("Generating speech for text: {}", text);

        let request_body = TextToSpeechRequest {
            text,
            model_id: &self.model_id,
        };

        let response = self
            .client
            .post(self.speech_url())
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(VideoError::ApiError(format!(
                "TTS API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
