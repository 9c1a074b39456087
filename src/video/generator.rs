use super::caption::{caption_font_size, escape_filter_value, wrap_caption};
use super::ffmpeg::{probe_duration, run_ffmpeg};
use super::VideoSettings;
use crate::error::{Result, VideoError};
use crate::scene::SceneAssets;
use image::ImageReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const AUDIO_SAMPLE_RATE: &str = "44100";
const AUDIO_CHANNELS: &str = "2";

/// 已经探测过时长和画面尺寸的分镜素材
#[derive(Debug, Clone)]
pub struct ProbedScene {
    pub assets: SceneAssets,
    pub duration: f64,
    pub image_width: u32,
}

/// 单个分镜的视频片段：静态图片 + 字幕 + 配音
#[derive(Debug, Clone, PartialEq)]
pub struct SubClip {
    pub index: usize,
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
    /// 已折行的字幕文本
    pub caption_text: String,
    pub caption_path: PathBuf,
    pub segment_path: PathBuf,
    pub duration: f64,
    pub font_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MusicMix {
    pub music_path: PathBuf,
    /// 拼接后、混入背景音乐前的中间文件
    pub merged_path: PathBuf,
}

/// 一次合成要执行的全部步骤，不涉及任何 IO
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub clips: Vec<SubClip>,
    pub concat_list: PathBuf,
    pub music: Option<MusicMix>,
    pub output: PathBuf,
    pub total_duration: f64,
}

impl RenderPlan {
    /// concat demuxer 的文件列表，片段与列表在同一目录，只写文件名
    pub fn concat_list_contents(&self) -> String {
        self.clips
            .iter()
            .map(|clip| {
                let name = clip
                    .segment_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("file '{}'\n", name.replace('\'', "'\\''"))
            })
            .collect()
    }

    /// 拼接结果写到哪里：有背景音乐时先写中间文件
    pub fn concat_target(&self) -> &Path {
        self.music
            .as_ref()
            .map(|mix| mix.merged_path.as_path())
            .unwrap_or(self.output.as_path())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub output: PathBuf,
    pub duration_secs: f64,
    pub scene_count: usize,
    pub music_mixed: bool,
}

/// 背景音乐只在路径存在时使用，缺失时记录警告并跳过
pub fn resolve_music(music: Option<&Path>) -> Option<PathBuf> {
    let path = music?;
    if path.is_file() {
        Some(path.to_path_buf())
    } else {
        warn!(
            "Background music not found at {}, continuing with narration only",
            path.display()
        );
        None
    }
}

pub struct VideoGenerator {
    settings: VideoSettings,
    work_dir: PathBuf,
}

impl VideoGenerator {
    pub fn new(settings: VideoSettings, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            work_dir: work_dir.into(),
        }
    }

    /// 以三个按序号对齐的列表作为输入合成视频
    pub async fn assemble(
        &self,
        image_paths: &[PathBuf],
        audio_paths: &[PathBuf],
        captions: &[String],
        output_path: &Path,
        music_path: Option<&Path>,
    ) -> Result<RenderSummary> {
        if image_paths.len() != audio_paths.len() || image_paths.len() != captions.len() {
            return Err(VideoError::SceneError(format!(
                "Mismatched scene inputs: {} images, {} audio clips, {} captions",
                image_paths.len(),
                audio_paths.len(),
                captions.len()
            )));
        }

        let scenes: Vec<SceneAssets> = image_paths
            .iter()
            .zip(audio_paths)
            .zip(captions)
            .enumerate()
            .map(|(index, ((image, audio), caption))| SceneAssets {
                index,
                image_path: image.clone(),
                audio_path: audio.clone(),
                caption: caption.clone(),
            })
            .collect();

        self.generate_video(&scenes, output_path, music_path).await
    }

    /// 合成最终视频
    pub async fn generate_video(
        &self,
        scenes: &[SceneAssets],
        output_path: &Path,
        music_path: Option<&Path>,
    ) -> Result<RenderSummary> {
        info!("Starting video generation...");

        let mut probed = Vec::with_capacity(scenes.len());
        for scene in scenes {
            ensure_asset(&scene.image_path).await?;
            ensure_asset(&scene.audio_path).await?;

            let duration = probe_duration(&self.settings.ffprobe, &scene.audio_path).await?;
            let (image_width, _) = ImageReader::open(&scene.image_path)?
                .with_guessed_format()?
                .into_dimensions()?;

            info!(
                "Scene {}: {:.2}s of narration, image width {}px",
                scene.index, duration, image_width
            );
            probed.push(ProbedScene {
                assets: scene.clone(),
                duration,
                image_width,
            });
        }

        let music = resolve_music(music_path);
        let plan = self.plan(probed, output_path, music)?;
        self.render(&plan).await?;

        info!(
            "Video generation completed: {} ({:.2}s)",
            plan.output.display(),
            plan.total_duration
        );

        Ok(RenderSummary {
            output: plan.output.clone(),
            duration_secs: plan.total_duration,
            scene_count: plan.clips.len(),
            music_mixed: plan.music.is_some(),
        })
    }

    /// 根据探测结果生成合成计划，片段按分镜序号升序排列
    pub fn plan(
        &self,
        mut scenes: Vec<ProbedScene>,
        output_path: &Path,
        music: Option<PathBuf>,
    ) -> Result<RenderPlan> {
        if scenes.is_empty() {
            return Err(VideoError::SceneError("No scenes to assemble".to_string()));
        }

        scenes.sort_by_key(|scene| scene.assets.index);

        let clips: Vec<SubClip> = scenes
            .into_iter()
            .map(|scene| {
                let font_size =
                    caption_font_size(self.settings.caption_font_size, scene.image_width);
                let caption_text = wrap_caption(
                    &scene.assets.caption,
                    scene.image_width,
                    self.settings.caption_width_ratio,
                    font_size,
                )
                .join("\n");
                let index = scene.assets.index;

                SubClip {
                    index,
                    image_path: scene.assets.image_path,
                    audio_path: scene.assets.audio_path,
                    caption_text,
                    caption_path: self.work_dir.join(format!("caption_{}.txt", index)),
                    segment_path: self.work_dir.join(format!("segment_{}.mp4", index)),
                    duration: scene.duration,
                    font_size,
                }
            })
            .collect();

        let total_duration = clips.iter().map(|clip| clip.duration).sum();

        Ok(RenderPlan {
            clips,
            concat_list: self.work_dir.join("concat.txt"),
            music: music.map(|music_path| MusicMix {
                music_path,
                merged_path: self.work_dir.join("merged.mp4"),
            }),
            output: output_path.to_path_buf(),
            total_duration,
        })
    }

    /// 按计划依次调用 ffmpeg
    pub async fn render(&self, plan: &RenderPlan) -> Result<()> {
        let ffmpeg = &self.settings.ffmpeg;

        for clip in &plan.clips {
            info!("Creating video segment for scene {}", clip.index);
            tokio::fs::write(&clip.caption_path, &clip.caption_text).await?;
            run_ffmpeg(ffmpeg, &self.segment_args(clip), "segment creation").await?;
        }

        info!("Concatenating {} video segments...", plan.clips.len());
        tokio::fs::write(&plan.concat_list, plan.concat_list_contents()).await?;
        run_ffmpeg(ffmpeg, &self.concat_args(plan), "concat").await?;

        if let Some(mix) = &plan.music {
            info!("Mixing background music from {}", mix.music_path.display());
            run_ffmpeg(ffmpeg, &self.mix_args(plan, mix), "music mix").await?;
        }

        // 清理中间文件
        tokio::fs::remove_file(&plan.concat_list).await.ok();
        if let Some(mix) = &plan.music {
            tokio::fs::remove_file(&mix.merged_path).await.ok();
        }
        for clip in &plan.clips {
            tokio::fs::remove_file(&clip.segment_path).await.ok();
            tokio::fs::remove_file(&clip.caption_path).await.ok();
        }

        Ok(())
    }

    /// 图片循环成静态画面，叠加底部居中字幕，并以配音作为音轨
    pub fn segment_args(&self, clip: &SubClip) -> Vec<String> {
        let fps = self.settings.fps.to_string();
        let border = (clip.font_size / 4).max(4);

        let mut drawtext = format!(
            "drawtext=textfile={}:expansion=none",
            escape_filter_value(&clip.caption_path.to_string_lossy())
        );
        if let Some(font) = &self.settings.caption_font {
            drawtext.push_str(&format!(
                ":fontfile={}",
                escape_filter_value(&font.to_string_lossy())
            ));
        }
        drawtext.push_str(&format!(
            ":fontsize={size}:fontcolor=white:box=1:boxcolor=black:boxborderw={border}:line_spacing={spacing}:x=(w-text_w)/2:y=h-text_h-{border}",
            size = clip.font_size,
            border = border,
            spacing = clip.font_size / 6,
        ));

        // libx264 + yuv420p 要求宽高为偶数
        let filter = format!("scale=trunc(iw/2)*2:trunc(ih/2)*2,{}", drawtext);

        vec![
            "-y".into(),
            "-loop".into(),
            "1".into(),
            "-framerate".into(),
            fps.clone(),
            "-i".into(),
            path_arg(&clip.image_path),
            "-i".into(),
            path_arg(&clip.audio_path),
            "-vf".into(),
            filter,
            "-map".into(),
            "0:v:0".into(),
            "-map".into(),
            "1:a:0".into(),
            "-t".into(),
            format!("{:.3}", clip.duration),
            "-r".into(),
            fps,
            "-c:v".into(),
            self.settings.video_codec.clone(),
            "-tune".into(),
            "stillimage".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-c:a".into(),
            self.settings.audio_codec.clone(),
            "-ar".into(),
            AUDIO_SAMPLE_RATE.into(),
            "-ac".into(),
            AUDIO_CHANNELS.into(),
            path_arg(&clip.segment_path),
        ]
    }

    /// 片段之间直接硬切拼接
    pub fn concat_args(&self, plan: &RenderPlan) -> Vec<String> {
        vec![
            "-y".into(),
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            path_arg(&plan.concat_list),
            "-c".into(),
            "copy".into(),
            path_arg(plan.concat_target()),
        ]
    }

    /// 背景音乐循环、降低音量并截到总时长，再与配音混合
    pub fn mix_args(&self, plan: &RenderPlan, mix: &MusicMix) -> Vec<String> {
        let total = format!("{:.3}", plan.total_duration);
        let filter = format!(
            "[1:a]volume={volume},atrim=duration={total},asetpts=PTS-STARTPTS[bg];[0:a][bg]amix=inputs=2:duration=first:dropout_transition=0:normalize=0[aout]",
            volume = self.settings.music_volume,
            total = total,
        );

        vec![
            "-y".into(),
            "-i".into(),
            path_arg(&mix.merged_path),
            "-stream_loop".into(),
            "-1".into(),
            "-i".into(),
            path_arg(&mix.music_path),
            "-filter_complex".into(),
            filter,
            "-map".into(),
            "0:v:0".into(),
            "-map".into(),
            "[aout]".into(),
            "-c:v".into(),
            "copy".into(),
            "-c:a".into(),
            self.settings.audio_codec.clone(),
            "-t".into(),
            total,
            path_arg(&plan.output),
        ]
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

async fn ensure_asset(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        Ok(_) => Err(VideoError::MissingAsset(format!(
            "{} is empty or not a file",
            path.display()
        ))),
        Err(e) => Err(VideoError::MissingAsset(format!("{}: {}", path.display(), e))),
    }
}
