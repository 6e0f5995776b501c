use std::collections::BTreeMap;

use crate::{
    blob::{self, BlobStore},
    config::Config,
    files::format_mb,
    listing::{split_path, UNCATEGORIZED},
    models::BlobRecord,
};

#[derive(Debug, Default)]
pub struct ListSummary {
    pub by_folder: BTreeMap<String, Vec<BlobRecord>>,
    pub count: usize,
    pub total_size: u64,
}

/// Group blobs by their raw category folder, keeping listing order inside
/// each group.
pub fn group_by_folder(blobs: Vec<BlobRecord>, prefix: &str) -> BTreeMap<String, Vec<BlobRecord>> {
    let mut groups: BTreeMap<String, Vec<BlobRecord>> = BTreeMap::new();
    for blob in blobs {
        let relative = blob.pathname.strip_prefix(prefix).unwrap_or(&blob.pathname);
        let folder = split_path(relative).0.unwrap_or(UNCATEGORIZED).to_string();
        groups.entry(folder).or_default().push(blob);
    }
    groups
}

pub async fn run(config: &Config, store: &dyn BlobStore) -> anyhow::Result<ListSummary> {
    println!("📋 Listing videos in the blob store...\n");

    let blobs = blob::list_all(store, &config.prefix, config.page_limit).await?;
    if blobs.is_empty() {
        println!("📭 No videos uploaded yet");
        return Ok(ListSummary::default());
    }

    let count = blobs.len();
    let total_size = blobs.iter().map(|b| b.size).sum();
    let by_folder = group_by_folder(blobs, &config.prefix);

    for (folder, blobs) in &by_folder {
        println!("\n📁 {}", folder);
        println!("{}", "─".repeat(40));
        for blob in blobs {
            let name = blob.pathname.rsplit('/').next().unwrap_or(&blob.pathname);
            println!("   🎬 {} ({})", name, format_mb(blob.size));
        }
    }

    println!("\n{}", super::rule());
    println!("📊 Total: {} videos", count);
    println!("💾 Total size: {}", format_mb(total_size));

    Ok(ListSummary {
        by_folder,
        count,
        total_size,
    })
}
