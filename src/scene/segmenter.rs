use super::{Scene, Segmentation};
use crate::api::{ChatMessage, TextCompletion};
use crate::error::{Result, VideoError};
use tracing::{info, warn};

pub fn scene_instruction(scene_count: usize) -> String {
    format!(
        "Break the following text into {} short scenes for a video.",
        scene_count
    )
}

/// 调用大模型把故事拆成分镜
pub async fn segment_story(
    completion: &dyn TextCompletion,
    scene_count: usize,
    story: &str,
) -> Result<Segmentation> {
    if story.trim().is_empty() {
        return Err(VideoError::EmptyStory);
    }

    info!("Generating scenes from text ({} characters)...", story.len());

    let messages = [
        ChatMessage::system(scene_instruction(scene_count)),
        ChatMessage::user(story),
    ];
    let content = completion.complete(&messages).await?;

    let segmentation = split_scenes(&content, story, scene_count);
    if segmentation.degraded {
        warn!(
            "Model returned fewer than {} scene lines, using the whole story as a single scene",
            scene_count
        );
    }

    info!("Successfully generated {} scenes", segmentation.scenes.len());
    Ok(segmentation)
}

/// 按行切分模型输出；非空行少于 `min_scenes` 时退化为整段原文一个分镜
pub fn split_scenes(content: &str, story: &str, min_scenes: usize) -> Segmentation {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < min_scenes {
        return Segmentation {
            scenes: vec![Scene::new(0, story.to_string())],
            degraded: true,
        };
    }

    let scenes = lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| Scene::new(i, line.to_string()))
        .collect();

    Segmentation {
        scenes,
        degraded: false,
    }
}
