use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::config::FfmpegConfig;

/// Check if ffmpeg is available, returning its version line.
pub async fn check_ffmpeg_available() -> Result<String> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .context("Failed to execute ffmpeg")?;

    if !output.status.success() {
        anyhow::bail!("ffmpeg not available");
    }

    let version = String::from_utf8_lossy(&output.stdout);
    Ok(version.lines().next().unwrap_or("unknown").to_string())
}

/// Arguments for a web-friendly H.264/AAC re-encode of `input_path`.
pub fn compress_args(input_path: &Path, output_path: &Path, config: &FfmpegConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input_path.into()];
    args.extend(
        [
            "-vf".to_string(),
            format!("scale=-2:{}", config.max_height),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-crf".to_string(),
            config.crf.to_string(),
            "-preset".to_string(),
            config.preset.clone(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            format!("{}k", config.audio_bitrate),
            "-movflags".to_string(),
            "+faststart".to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(output_path.into());
    args
}

/// Re-encode a video; fails when ffmpeg exits unsuccessfully.
pub async fn compress_video(input_path: &Path, output_path: &Path, config: &FfmpegConfig) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }

    let output = Command::new("ffmpeg")
        .args(compress_args(input_path, output_path, config))
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .context("Failed to execute ffmpeg")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
        anyhow::bail!(
            "ffmpeg failed ({}): {}",
            output.status,
            tail.into_iter().rev().collect::<Vec<_>>().join("\n")
        );
    }

    Ok(())
}
