use super::{ChatMessage, ImageGeneration, TextCompletion};
use crate::config::Config;
use crate::error::{Result, VideoError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// OpenAI 客户端：负责分镜（chat completions）和图片生成（images）
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    chat_model: String,
    image_model: String,
    image_size: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
            chat_model: config.chat_model.clone(),
            image_model: config.image_model.clone(),
            image_size: config.image_size.clone(),
            client,
        })
    }

    /// 提交图片生成请求，返回图片的下载地址
    pub async fn request_image_url(&self, prompt: &str) -> Result<String> {
        info!("Generating image for prompt: {}", prompt);

        let request_body = ImageRequest {
            model: &self.image_model,
            prompt,
            size: &self.image_size,
            n: 1,
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(VideoError::ApiError(format!(
                "Image generation API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response.text().await?;
        let image_response: ImageResponse = serde_json::from_str(&response_text)?;
        first_image_url(image_response)
    }

    /// 普通 GET 下载图片内容
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading image from: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VideoError::ApiError(format!(
                "Image download failed ({}): {}",
                status, url
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl TextCompletion for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request_body = ChatRequest {
            model: &self.chat_model,
            messages,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(VideoError::ApiError(format!(
                "Chat completion API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response.text().await?;
        let chat_response: ChatResponse = serde_json::from_str(&response_text)?;
        first_choice_content(chat_response)
    }
}

#[async_trait]
impl ImageGeneration for OpenAiClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let url = self.request_image_url(prompt).await?;
        self.download(&url).await
    }
}

fn first_choice_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| VideoError::ApiError("Failed to extract generated text".to_string()))
}

fn first_image_url(response: ImageResponse) -> Result<String> {
    response
        .data
        .into_iter()
        .next()
        .and_then(|data| data.url)
        .ok_or_else(|| VideoError::ApiError("No image URL in response".to_string()))
}
