use anyhow::Context;
use tracing::info;

use crate::{
    blob::{self, BlobStore},
    config::Config,
};

/// Delete every blob under the configured prefix. Stops at the first failed
/// delete. Returns the number of deleted blobs.
pub async fn run(config: &Config, store: &dyn BlobStore) -> anyhow::Result<usize> {
    println!("🗑️  Deleting every video from the blob store...\n");

    let blobs = blob::list_all(store, &config.prefix, config.page_limit).await?;
    if blobs.is_empty() {
        println!("📭 No videos to delete");
        return Ok(0);
    }

    println!("📁 Found {} videos to delete\n", blobs.len());

    let mut deleted = 0;
    for blob in &blobs {
        println!("🗑️  Deleting: {}", blob.pathname);
        store
            .delete(&blob.url)
            .await
            .with_context(|| format!("Failed to delete {} after {} deletions", blob.pathname, deleted))?;
        deleted += 1;
    }

    info!("[clear] deleted {} blobs under {:?}", deleted, config.prefix);

    println!("\n{}", super::rule());
    println!("✅ Deleted {} videos", deleted);
    println!("📦 Upload the compressed videos with:");
    println!("   videoteca upload --compressed");

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::testing::{blob, FakeStore};
    use crate::models::BlobPage;

    #[tokio::test]
    async fn deletes_blobs_from_every_page() {
        let mut store = FakeStore::default();
        store.pages.insert(
            None,
            BlobPage {
                blobs: vec![blob("videos/1. A/a.mp4", 1)],
                cursor: Some("2".to_string()),
            },
        );
        store.pages.insert(
            Some("2".to_string()),
            BlobPage {
                blobs: vec![blob("videos/2. B/b.mp4", 1)],
                cursor: None,
            },
        );

        let deleted = run(&Config::default(), &store).await.unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(
            *store.deletes.lock().unwrap(),
            vec![
                "https://store.example/videos/1.%20A/a.mp4".to_string(),
                "https://store.example/videos/2.%20B/b.mp4".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn empty_store_deletes_nothing() {
        let store = FakeStore::default();
        assert_eq!(run(&Config::default(), &store).await.unwrap(), 0);
        assert!(store.deletes.lock().unwrap().is_empty());
    }
}
