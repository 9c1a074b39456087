mod assets;
mod segmenter;

pub use assets::AssetGenerator;
pub use segmenter::{scene_instruction, segment_story, split_scenes};

use std::path::PathBuf;

/// 表示一个场景/分镜
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    /// 场景序号，从 0 开始连续编号
    pub index: usize,
    /// 台词/字幕，同时也是配音文本和画面提示词
    pub caption: String,
}

impl Scene {
    pub fn new(index: usize, caption: String) -> Self {
        Self { index, caption }
    }
}

/// 分镜结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub scenes: Vec<Scene>,
    /// 模型返回的行数不足，整段原文被当作唯一的分镜
    pub degraded: bool,
}

/// 单个分镜生成出的素材
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneAssets {
    pub index: usize,
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
    pub caption: String,
}
