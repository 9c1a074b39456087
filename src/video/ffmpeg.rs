use crate::error::{Result, VideoError};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// 用 ffprobe 读取媒体文件时长（秒）
pub async fn probe_duration(ffprobe: &Path, path: &Path) -> Result<f64> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| VideoError::FfmpegError(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let error = String::from_utf8_lossy(&output.stderr);
        return Err(VideoError::FfmpegError(format!(
            "ffprobe failed for {}: {}",
            path.display(),
            error.trim()
        )));
    }

    parse_duration(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
        VideoError::FfmpegError(format!(
            "ffprobe returned no usable duration for {}",
            path.display()
        ))
    })
}

fn parse_duration(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|duration| duration.is_finite() && *duration > 0.0)
}

/// 运行一次 ffmpeg，失败时带上 stderr
pub async fn run_ffmpeg(ffmpeg: &Path, args: &[String], step: &str) -> Result<()> {
    debug!("ffmpeg {}", args.join(" "));

    let output = Command::new(ffmpeg)
        .args(args)
        .output()
        .await
        .map_err(|e| VideoError::FfmpegError(format!("Failed to run FFmpeg: {}", e)))?;

    if !output.status.success() {
        let error = String::from_utf8_lossy(&output.stderr);
        return Err(VideoError::FfmpegError(format!(
            "FFmpeg {} failed: {}",
            step, error
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ffprobe_duration_output() {
        assert_eq!(parse_duration("3.526531\n"), Some(3.526531));
        assert_eq!(parse_duration("\n  2.5  \n"), Some(2.5));
    }

    #[test]
    fn rejects_missing_or_invalid_durations() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("N/A"), None);
        assert_eq!(parse_duration("0.000000"), None);
    }
}
