use super::{Scene, SceneAssets};
use crate::api::{ImageGeneration, SpeechSynthesis};
use crate::error::{Result, VideoError};
use std::path::Path;
use tracing::info;

/// 为每个分镜生成图片和配音，写入本次运行的临时目录
pub struct AssetGenerator<'a> {
    images: &'a dyn ImageGeneration,
    speech: &'a dyn SpeechSynthesis,
}

impl<'a> AssetGenerator<'a> {
    pub fn new(images: &'a dyn ImageGeneration, speech: &'a dyn SpeechSynthesis) -> Self {
        Self { images, speech }
    }

    /// 逐个分镜生成素材，任何一步失败都会中止整个流程
    pub async fn generate(&self, scenes: &[Scene], work_dir: &Path) -> Result<Vec<SceneAssets>> {
        let scene_count = scenes.len();
        let mut bundles = Vec::with_capacity(scene_count);

        for (idx, scene) in scenes.iter().enumerate() {
            let image_path = work_dir.join(format!("scene_{}.png", scene.index));
            let audio_path = work_dir.join(format!("scene_{}.mp3", scene.index));

            // 同一分镜的图片和语音互不依赖，可以同时请求
            let (image_data, audio_data) = tokio::try_join!(
                self.images.generate_image(&scene.caption),
                self.speech.synthesize(&scene.caption),
            )?;

            write_payload(&image_path, &image_data, "image").await?;
            write_payload(&audio_path, &audio_data, "audio").await?;

            info!(
                "Generated assets for scene {} ({}/{})",
                scene.index,
                idx + 1,
                scene_count
            );

            bundles.push(SceneAssets {
                index: scene.index,
                image_path,
                audio_path,
                caption: scene.caption.clone(),
            });
        }

        Ok(bundles)
    }
}

async fn write_payload(path: &Path, data: &[u8], kind: &str) -> Result<()> {
    if data.is_empty() {
        return Err(VideoError::ApiError(format!(
            "Received empty {} payload for {}",
            kind,
            path.display()
        )));
    }

    tokio::fs::write(path, data).await?;
    info!("Saved {} to: {}", kind, path.display());
    Ok(())
}
