use anyhow::Context;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

use crate::{
    config::Config,
    ffmpeg,
    files::{collect_video_files, format_bytes, relative_slash_path, ExtensionMatch},
    models::CompressionStats,
};

/// Re-encode the local library into the compressed directory.
pub async fn run(config: &Config) -> anyhow::Result<CompressionStats> {
    println!("🎬 Video compressor (FFmpeg)\n");
    println!("{}", super::rule());

    let version = ffmpeg::check_ffmpeg_available().await.context(
        "FFmpeg is not installed or not in PATH \
         (Windows: winget install FFmpeg, macOS: brew install ffmpeg, Linux: sudo apt install ffmpeg)",
    )?;
    println!("✅ FFmpeg detected: {}\n", version);

    println!("⚙️  Settings:");
    println!("   Max height: {}p", config.ffmpeg.max_height);
    println!("   CRF (quality): {}", config.ffmpeg.crf);
    println!("   Preset: {}", config.ffmpeg.preset);
    println!("   Audio: {}kbps\n", config.ffmpeg.audio_bitrate);

    compress_library(config).await
}

/// Compress every video not already compressed, continuing past failures.
pub async fn compress_library(config: &Config) -> anyhow::Result<CompressionStats> {
    let files =
        collect_video_files(&config.videos_dir, &config.extension, ExtensionMatch::IgnoreCase).await?;

    let mut stats = CompressionStats::default();
    if files.is_empty() {
        println!("📭 No videos found in {:?}", config.videos_dir);
        return Ok(stats);
    }

    println!("📁 Found {} videos\n", files.len());
    println!("{}", super::rule());

    fs::create_dir_all(&config.compressed_dir)
        .await
        .with_context(|| format!("Failed to create {:?}", config.compressed_dir))?;

    let total = files.len();
    for (index, input_path) in files.iter().enumerate() {
        let relative = relative_slash_path(input_path, &config.videos_dir);
        let output_path = config.compressed_dir.join(&relative);

        println!("\n[{}/{}] 📹 {}", index + 1, total, relative);

        let original_size = match fs::metadata(input_path).await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                error!("[compress] ❌ {}: failed to read input: {}", relative, e);
                stats.errors += 1;
                continue;
            }
        };

        if let Some(compressed_size) = existing_size(&output_path).await {
            if compressed_size < original_size {
                println!("   ⏭️  Already compressed ({})", format_bytes(compressed_size));
                stats.original += original_size;
                stats.compressed += compressed_size;
                stats.skipped += 1;
                continue;
            }
        }

        stats.original += original_size;
        println!("   📊 Original: {}", format_bytes(original_size));
        println!("   ⏳ Compressing...");

        let result = ffmpeg::compress_video(input_path, &output_path, &config.ffmpeg).await;

        match (result, existing_size(&output_path).await) {
            (Ok(()), Some(compressed_size)) => {
                stats.compressed += compressed_size;
                stats.processed += 1;
                let saved = original_size as f64 - compressed_size as f64;
                let percent = if original_size > 0 {
                    saved / original_size as f64 * 100.0
                } else {
                    0.0
                };
                println!(
                    "   ✅ Compressed: {} (-{:.1}%)",
                    format_bytes(compressed_size),
                    percent
                );
            }
            (Ok(()), None) => {
                error!("[compress] ❌ {}: ffmpeg produced no output", relative);
                stats.compressed += original_size;
                stats.errors += 1;
            }
            (Err(e), _) => {
                error!("[compress] ❌ {}: {:#}", relative, e);
                stats.compressed += original_size;
                stats.errors += 1;
            }
        }
    }

    print_summary(config, &stats, total);
    info!(
        "[compress] done: {} processed, {} skipped, {} errors",
        stats.processed, stats.skipped, stats.errors
    );

    Ok(stats)
}

async fn existing_size(path: &Path) -> Option<u64> {
    fs::metadata(path).await.ok().filter(|m| m.is_file()).map(|m| m.len())
}

fn print_summary(config: &Config, stats: &CompressionStats, total: usize) {
    println!("\n{}", super::rule());
    println!("📊 FINAL SUMMARY\n");
    println!("   ✅ Processed: {}", stats.processed);
    println!("   ⏭️  Skipped: {}", stats.skipped);
    println!("   ❌ Errors: {}", stats.errors);
    println!("   📁 Total: {}", total);
    println!("\n💾 SPACE:");
    println!("   Original: {}", format_bytes(stats.original));
    println!("   Compressed: {}", format_bytes(stats.compressed));
    let savings = stats.savings();
    let sign = if savings < 0 { "-" } else { "" };
    println!(
        "   Saved: {}{} ({:.1}%)",
        sign,
        format_bytes(savings.unsigned_abs()),
        stats.savings_percent()
    );
    println!("\n📂 Compressed videos in: {:?}", config.compressed_dir);

    if stats.compressed <= config.storage_quota_bytes {
        println!(
            "\n✅ The compressed videos fit in the {} storage quota!",
            format_bytes(config.storage_quota_bytes)
        );
    } else {
        let over = stats.compressed - config.storage_quota_bytes;
        println!(
            "\n⚠️  Still over the {} quota by {}",
            format_bytes(config.storage_quota_bytes),
            format_bytes(over)
        );
        println!("   Consider raising the CRF or lowering the resolution in config.toml.");
    }
}
