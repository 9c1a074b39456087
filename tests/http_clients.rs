mod common;

use common::{png_bytes, STORY};
use serde_json::json;
use story_video::api::{
    ChatMessage, ElevenLabsClient, ImageGeneration, OpenAiClient, SpeechSynthesis, TextCompletion,
};
use story_video::{Config, Pipeline, VideoError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// 图片下载地址是第三方 URL，不能带上 OpenAI 的凭证
struct WithoutAuthorization;

impl Match for WithoutAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn config_for(server: &MockServer) -> Config {
    let base_url = format!("{}/v1", server.uri());
    Config::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some("sk-test".to_string()),
        "ELEVENLABS_API_KEY" => Some("el-test".to_string()),
        "VOICE_ID" => Some("voice-test".to_string()),
        "OPENAI_BASE_URL" | "ELEVENLABS_BASE_URL" => Some(base_url.clone()),
        _ => None,
    })
    .unwrap()
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    }))
}

async fn mount_image(server: &MockServer, payload: Vec<u8>) {
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1,
            "data": [{"url": format!("{}/files/scene.png", server.uri())}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/scene.png"))
        .and(WithoutAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload))
        .mount(server)
        .await;
}

#[tokio::test]
async fn chat_completion_sends_bearer_model_and_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "Break the following text into 3 short scenes for a video."},
                {"role": "user", "content": STORY}
            ]
        })))
        .respond_with(chat_reply("one\ntwo\nthree"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server)).unwrap();
    let content = client
        .complete(&[
            ChatMessage::system("Break the following text into 3 short scenes for a video."),
            ChatMessage::user(STORY),
        ])
        .await
        .unwrap();

    assert_eq!(content, "one\ntwo\nthree");
}

#[tokio::test]
async fn chat_completion_error_status_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server)).unwrap();
    match client.complete(&[ChatMessage::user(STORY)]).await {
        Err(VideoError::ApiError(message)) => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid api key"));
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_chat_body_is_a_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server)).unwrap();
    let result = client.complete(&[ChatMessage::user(STORY)]).await;
    assert!(matches!(result, Err(VideoError::JsonError(_))));
}

#[tokio::test]
async fn image_is_requested_then_downloaded_without_credentials() {
    let server = MockServer::start().await;
    let payload = png_bytes(4, 4);

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "dall-e-3",
            "prompt": "A dog finds a key.",
            "size": "1024x1024",
            "n": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1,
            "data": [{"url": format!("{}/files/scene.png", server.uri())}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/scene.png"))
        .and(WithoutAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server)).unwrap();
    let image = client.generate_image("A dog finds a key.").await.unwrap();

    assert_eq!(image, payload);
}

#[tokio::test]
async fn image_service_error_skips_the_download() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server)).unwrap();
    match client.generate_image("a dog").await {
        Err(VideoError::ApiError(message)) => assert!(message.contains("500")),
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn failed_image_download_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"url": format!("{}/files/expired.png", server.uri())}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/expired.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server)).unwrap();
    match client.generate_image("a dog").await {
        Err(VideoError::ApiError(message)) => assert!(message.contains("404")),
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn speech_uses_voice_path_and_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice-test"))
        .and(header("xi-api-key", "el-test"))
        .and(header("accept", "audio/mpeg"))
        .and(WithoutAuthorization)
        .and(body_partial_json(json!({
            "text": "The dog opens a door.",
            "model_id": "eleven_multilingual_v1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3-narration".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new(&config_for(&server)).unwrap();
    let audio = client.synthesize("The dog opens a door.").await.unwrap();

    assert_eq!(audio, b"ID3-narration".to_vec());
}

#[tokio::test]
async fn speech_error_status_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice-test"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new(&config_for(&server)).unwrap();
    match client.synthesize("hello").await {
        Err(VideoError::ApiError(message)) => {
            assert!(message.contains("429"));
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn speech_failure_aborts_the_whole_run() {
    let server = MockServer::start().await;
    let config = config_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_reply("A dog finds a key.\nThe dog opens a door.\nThe dog meets a friend."))
        .expect(1)
        .mount(&server)
        .await;
    mount_image(&server, png_bytes(4, 4)).await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice-test"))
        .respond_with(ResponseTemplate::new(500).set_body_string("voice unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let openai = OpenAiClient::new(&config).unwrap();
    let elevenlabs = ElevenLabsClient::new(&config).unwrap();
    let work_dir = tempfile::tempdir().unwrap();

    let result = Pipeline::new(&openai, &openai, &elevenlabs, &config)
        .run(STORY, work_dir.path(), None)
        .await;

    match result {
        Err(VideoError::ApiError(message)) => assert!(message.contains("voice unavailable")),
        other => panic!("expected an API error, got {:?}", other),
    }
    assert!(!work_dir.path().join("scene_0.mp3").exists());
    assert!(!work_dir.path().join("output_video.mp4").exists());
}
