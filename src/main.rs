use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use story_video::api::{ElevenLabsClient, OpenAiClient};
use story_video::config::{ELEVENLABS_API_KEY, OPENAI_API_KEY, VOICE_ID};
use story_video::{Config, Pipeline, RunReport};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "story-video")]
#[command(about = "Turn a short story into a narrated video using AI images and speech", long_about = None)]
struct Args {
    /// Story text (3-4 sentences recommended)
    #[arg(short, long)]
    text: Option<String>,

    /// Read the story from a text file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Where to save the final video
    #[arg(short, long, default_value = "output.mp4")]
    output: PathBuf,

    /// Optional background music (mp3)
    #[arg(short, long)]
    music: Option<PathBuf>,

    /// OpenAI API key (overrides OPENAI_API_KEY)
    #[arg(long)]
    openai_api_key: Option<String>,

    /// ElevenLabs API key (overrides ELEVENLABS_API_KEY)
    #[arg(long)]
    elevenlabs_api_key: Option<String>,

    /// ElevenLabs voice id (overrides VOICE_ID)
    #[arg(long)]
    voice_id: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    // 加载环境变量
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // 启动时一次性解析全部凭证，缺失即退出
    let lookup = |key: &str| cli_override(&args, key).or_else(|| std::env::var(key).ok());
    let config = match Config::from_lookup(lookup) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!(
                "Error: please provide {}, {} and {} via environment, .env or command-line flags",
                OPENAI_API_KEY, ELEVENLABS_API_KEY, VOICE_ID
            );
            std::process::exit(1);
        }
    };

    // 获取输入文本
    let story = if let Some(text) = args.text.clone() {
        text
    } else if let Some(file_path) = &args.file {
        tokio::fs::read_to_string(file_path)
            .await
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?
    } else {
        eprintln!("Error: Either --text or --file must be provided");
        std::process::exit(1);
    };

    if story.trim().is_empty() {
        eprintln!("Error: the story text is empty");
        std::process::exit(1);
    }

    info!("Starting story video generation...");
    info!("Input text length: {} characters", story.len());

    match run_generation(&config, &story, args.music.as_deref(), &args.output).await {
        Ok(report) => {
            info!(
                "Video generated successfully: {} ({} scenes, {:.1}s{})",
                args.output.display(),
                report.scene_count,
                report.duration_secs,
                if report.music_mixed { ", with music" } else { "" }
            );
            Ok(())
        }
        Err(e) => {
            error!("Video generation failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cli_override(args: &Args, key: &str) -> Option<String> {
    match key {
        OPENAI_API_KEY => args.openai_api_key.clone(),
        ELEVENLABS_API_KEY => args.elevenlabs_api_key.clone(),
        VOICE_ID => args.voice_id.clone(),
        _ => None,
    }
}

async fn run_generation(
    config: &Config,
    story: &str,
    music: Option<&Path>,
    output: &Path,
) -> anyhow::Result<RunReport> {
    let openai = OpenAiClient::new(config)?;
    let elevenlabs = ElevenLabsClient::new(config)?;

    // 每次运行使用独立的临时目录，结束时自动删除
    let work_dir = tempfile::Builder::new()
        .prefix("story-video-")
        .tempdir()
        .context("Failed to create work directory")?;

    let pipeline = Pipeline::new(&openai, &openai, &elevenlabs, config);
    let report = pipeline.run(story, work_dir.path(), music).await?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::copy(&report.output, output)
        .await
        .with_context(|| format!("Failed to save video to {}", output.display()))?;

    Ok(report)
}
