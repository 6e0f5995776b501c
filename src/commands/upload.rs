use anyhow::Context;
use bytes::Bytes;
use std::collections::HashSet;
use std::path::Path;
use tracing::{error, info};

use crate::{
    blob::{self, BlobStore},
    config::Config,
    files::{collect_video_files, relative_slash_path, ExtensionMatch},
    models::{Access, UploadResult},
};

const VIDEO_CONTENT_TYPE: &str = "video/mp4";

#[derive(Debug, Default)]
pub struct UploadSummary {
    pub total: usize,
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub results: Vec<UploadResult>,
}

/// Upload every local video that is not already in the store.
///
/// `compressed` picks the compressed output directory instead of the
/// original videos directory.
pub async fn run(
    config: &Config,
    store: &dyn BlobStore,
    compressed: bool,
) -> anyhow::Result<UploadSummary> {
    let source_dir = if compressed {
        &config.compressed_dir
    } else {
        &config.videos_dir
    };

    println!("🎬 Uploading videos to the blob store...\n");
    if compressed {
        println!("📦 Mode: uploading COMPRESSED videos\n");
    }

    if !source_dir.is_dir() {
        let hint = if compressed {
            ". Run `videoteca compress` first"
        } else {
            ""
        };
        anyhow::bail!("Directory {:?} does not exist{}", source_dir, hint);
    }

    let files = collect_video_files(source_dir, &config.extension, ExtensionMatch::Exact).await?;
    println!("📁 Found {} videos in {:?}\n", files.len(), source_dir);

    let existing: HashSet<String> = blob::list_all(store, &config.prefix, config.page_limit)
        .await
        .context("Failed to list existing blobs")?
        .into_iter()
        .map(|b| b.pathname)
        .collect();

    let mut summary = UploadSummary {
        total: files.len(),
        ..Default::default()
    };

    for file_path in &files {
        let relative = relative_slash_path(file_path, source_dir);
        let pathname = format!("{}{}", config.prefix, relative);

        if existing.contains(&pathname) {
            println!("⏭️  Skipping (already uploaded): {}", relative);
            summary.skipped += 1;
            continue;
        }

        println!("📤 Uploading: {}", relative);

        match upload_file(store, file_path, &pathname).await {
            Ok(url) => {
                println!("   ✅ Uploaded: {}\n", url);
                summary.uploaded += 1;
                summary.results.push(UploadResult {
                    local_path: file_path.to_string_lossy().into_owned(),
                    blob_url: url,
                    pathname,
                });
            }
            Err(e) => {
                error!("[upload] ❌ Failed to upload {}: {:#}", relative, e);
                summary.failed += 1;
            }
        }
    }

    println!("\n{}", super::rule());
    println!("📊 Summary:");
    println!("   ✅ Uploaded: {}", summary.uploaded);
    println!("   ⏭️  Skipped: {}", summary.skipped);
    if summary.failed > 0 {
        println!("   ❌ Failed: {}", summary.failed);
    }
    println!("   📁 Total: {}", summary.total);

    if !summary.results.is_empty() {
        write_manifest(&config.manifest_path, &summary.results).await?;
        println!("\n💾 URLs saved to: {:?}", config.manifest_path);
    }

    info!(
        "[upload] done: {} uploaded, {} skipped, {} failed",
        summary.uploaded, summary.skipped, summary.failed
    );

    Ok(summary)
}

async fn upload_file(store: &dyn BlobStore, file_path: &Path, pathname: &str) -> anyhow::Result<String> {
    let data = tokio::fs::read(file_path)
        .await
        .with_context(|| format!("Failed to read {:?}", file_path))?;
    let result = store
        .put(pathname, Bytes::from(data), VIDEO_CONTENT_TYPE, Access::Public)
        .await?;
    Ok(result.url)
}

async fn write_manifest(path: &Path, results: &[UploadResult]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(results)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {:?}", path))
}
