use crate::api::{ImageGeneration, SpeechSynthesis, TextCompletion};
use crate::config::Config;
use crate::error::Result;
use crate::scene::{segment_story, AssetGenerator};
use crate::video::VideoGenerator;
use std::path::{Path, PathBuf};
use tracing::info;

pub const OUTPUT_FILE_NAME: &str = "output_video.mp4";

/// 一次生成的结果
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub output: PathBuf,
    pub scene_count: usize,
    /// 分镜退化为整段原文
    pub degraded: bool,
    pub duration_secs: f64,
    pub music_mixed: bool,
}

/// 分镜 -> 素材 -> 合成，三个阶段严格按顺序执行
pub struct Pipeline<'a> {
    completion: &'a dyn TextCompletion,
    images: &'a dyn ImageGeneration,
    speech: &'a dyn SpeechSynthesis,
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        completion: &'a dyn TextCompletion,
        images: &'a dyn ImageGeneration,
        speech: &'a dyn SpeechSynthesis,
        config: &'a Config,
    ) -> Self {
        Self {
            completion,
            images,
            speech,
            config,
        }
    }

    /// `work_dir` 必须是本次运行独占的临时目录
    pub async fn run(
        &self,
        story: &str,
        work_dir: &Path,
        music_path: Option<&Path>,
    ) -> Result<RunReport> {
        info!("Step 1/3: Generating scenes...");
        let segmentation = segment_story(self.completion, self.config.scene_count, story).await?;
        info!("Generated {} scenes", segmentation.scenes.len());

        info!("Step 2/3: Generating images and speech for each scene...");
        let assets = AssetGenerator::new(self.images, self.speech)
            .generate(&segmentation.scenes, work_dir)
            .await?;

        info!("Step 3/3: Generating final video...");
        let output_path = work_dir.join(OUTPUT_FILE_NAME);
        let summary = VideoGenerator::new(self.config.video.clone(), work_dir)
            .generate_video(&assets, &output_path, music_path)
            .await?;

        Ok(RunReport {
            output: summary.output,
            scene_count: summary.scene_count,
            degraded: segmentation.degraded,
            duration_secs: summary.duration_secs,
            music_mixed: summary.music_mixed,
        })
    }
}
