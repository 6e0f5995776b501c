use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::info;

use crate::blob::{self, BlobStore};
use crate::config::Config;
use crate::error::ListingError;
use crate::models::{BlobRecord, VideoEntry};

/// Category used when a video sits directly under the prefix.
pub const UNCATEGORIZED: &str = "Sin categoría";
/// Order assigned to folders without a leading numeral.
pub const UNORDERED: u64 = 999;

// ASCII digits only; `\d` would also match other scripts' numerals.
static ORDER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)\.").unwrap());
static ORDER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+\.\s*").unwrap());

/// Lists the videos kept in the blob store, sorted for display.
#[derive(Clone)]
pub struct VideoLister {
    store: Option<Arc<dyn BlobStore>>,
    prefix: String,
    extension: String,
    page_limit: u32,
}

impl VideoLister {
    /// `store` is `None` when no credential was configured; listing then
    /// fails with [`ListingError::Configuration`].
    pub fn new(config: &Config, store: Option<Arc<dyn BlobStore>>) -> Self {
        Self {
            store,
            prefix: config.prefix.clone(),
            extension: config.extension.clone(),
            page_limit: config.page_limit,
        }
    }

    pub async fn list_videos(&self) -> Result<Vec<VideoEntry>, ListingError> {
        let store = self.store.as_deref().ok_or(ListingError::Configuration)?;

        let blobs = blob::list_all(store, &self.prefix, self.page_limit).await?;
        let total = blobs.len();
        let videos = build_entries(&blobs, &self.prefix, &self.extension);

        info!(
            "[listing] {} videos out of {} blobs under {:?}",
            videos.len(),
            total,
            self.prefix
        );

        Ok(videos)
    }
}

/// Filter, derive and sort entries from a complete blob listing.
pub fn build_entries(blobs: &[BlobRecord], prefix: &str, extension: &str) -> Vec<VideoEntry> {
    let mut videos: Vec<VideoEntry> = blobs
        .iter()
        .filter(|blob| blob.pathname.ends_with(extension))
        .map(|blob| to_entry(blob, prefix, extension))
        .collect();

    videos.sort_by(compare_entries);
    videos
}

fn to_entry(blob: &BlobRecord, prefix: &str, extension: &str) -> VideoEntry {
    let relative = blob.pathname.strip_prefix(prefix).unwrap_or(&blob.pathname);
    let (folder, file) = split_path(relative);

    let file_name = file.strip_suffix(extension).unwrap_or(file).to_string();
    let folder = folder.unwrap_or(UNCATEGORIZED);

    VideoEntry {
        src: blob.url.clone(),
        category: category_name(folder),
        category_order: category_order(folder),
        file_name,
        size: blob.size,
    }
}

/// Split a relative path into its parent folder (when present) and file name.
pub fn split_path(relative: &str) -> (Option<&str>, &str) {
    let mut segments = relative.rsplit('/');
    let file = segments.next().unwrap_or(relative);
    let folder = segments.next().filter(|folder| !folder.is_empty());
    (folder, file)
}

/// Leading `N.` of a folder name, or [`UNORDERED`].
pub fn category_order(folder: &str) -> u64 {
    ORDER_PATTERN
        .captures(folder)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(UNORDERED)
}

/// Folder name with the leading `N. ` removed.
pub fn category_name(folder: &str) -> String {
    ORDER_PREFIX.replace(folder, "").into_owned()
}

fn compare_entries(a: &VideoEntry, b: &VideoEntry) -> Ordering {
    a.category_order
        .cmp(&b.category_order)
        .then_with(|| locale_compare(&a.file_name, &b.file_name))
}

/// Compare strings the way a user-facing sort would: accents and case are
/// ignored first, then accents break ties, then case (lowercase first).
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| -> Vec<char> {
        s.chars()
            .flat_map(char::to_lowercase)
            .map(strip_accent)
            .collect()
    };
    let secondary = |s: &str| -> Vec<char> { s.chars().flat_map(char::to_lowercase).collect() };
    let tertiary = |s: &str| -> Vec<bool> { s.chars().map(char::is_uppercase).collect() };

    primary(a)
        .cmp(&primary(b))
        .then_with(|| secondary(a).cmp(&secondary(b)))
        .then_with(|| tertiary(a).cmp(&tertiary(b)))
        .then_with(|| a.cmp(b))
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::testing::{blob, FakeStore};
    use crate::models::BlobPage;

    fn lister(store: FakeStore) -> VideoLister {
        VideoLister::new(&Config::default(), Some(Arc::new(store) as Arc<dyn BlobStore>))
    }

    #[test]
    fn ordered_folder_is_parsed_and_stripped() {
        assert_eq!(category_order("3. Alevin B"), 3);
        assert_eq!(category_name("3. Alevin B"), "Alevin B");
        assert_eq!(category_order("12.Juvenil"), 12);
        assert_eq!(category_name("12.Juvenil"), "Juvenil");
    }

    #[test]
    fn unordered_folder_is_kept() {
        assert_eq!(category_order("Sin Categoria"), UNORDERED);
        assert_eq!(category_name("Sin Categoria"), "Sin Categoria");
        assert_eq!(category_order("3 Alevin"), UNORDERED);
    }

    #[test]
    fn large_numeral_keeps_its_order() {
        assert_eq!(category_order("99999999999. Big"), 99_999_999_999);
        assert_eq!(category_name("99999999999. Big"), "Big");

        let entries = build_entries(
            &[
                blob("videos/99999999999. Big/a.mp4", 1),
                blob("videos/Otros/b.mp4", 1),
            ],
            "videos/",
            ".mp4",
        );
        assert_eq!(entries[0].category, "Otros");
        assert_eq!(entries[1].category, "Big");
    }

    #[test]
    fn numeral_beyond_u64_is_unordered() {
        assert_eq!(category_order("123456789012345678901234. Huge"), UNORDERED);
        assert_eq!(category_name("123456789012345678901234. Huge"), "Huge");
    }

    #[test]
    fn non_ascii_digits_are_not_an_order() {
        for folder in ["\u{0663}. Alevin", "\u{FF13}. Alevin"] {
            assert_eq!(category_order(folder), UNORDERED);
            assert_eq!(category_name(folder), folder);
        }
    }

    #[test]
    fn file_under_prefix_gets_placeholder_category() {
        let entries = build_entries(&[blob("videos/suelto.mp4", 5)], "videos/", ".mp4");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, UNCATEGORIZED);
        assert_eq!(entries[0].category_order, UNORDERED);
        assert_eq!(entries[0].file_name, "suelto");
    }

    #[test]
    fn non_matching_extensions_are_excluded() {
        let blobs = vec![
            blob("videos/1. A/clip.mov", 1),
            blob("videos/1. A/clip.MP4", 1),
            blob("videos/1. A/notes.txt", 1),
            blob("videos/1. A/clip.mp4", 1),
        ];
        let entries = build_entries(&blobs, "videos/", ".mp4");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, "clip");
    }

    #[test]
    fn worked_example() {
        let blobs = vec![
            blob("videos/2. Benjamin/01 Pedro.mp4", 200),
            blob("videos/1. Alevin A/05 Maria.mp4", 100),
        ];
        let entries = build_entries(&blobs, "videos/", ".mp4");

        assert_eq!(
            entries,
            vec![
                VideoEntry {
                    src: blobs[1].url.clone(),
                    category: "Alevin A".to_string(),
                    category_order: 1,
                    file_name: "05 Maria".to_string(),
                    size: 100,
                },
                VideoEntry {
                    src: blobs[0].url.clone(),
                    category: "Benjamin".to_string(),
                    category_order: 2,
                    file_name: "01 Pedro".to_string(),
                    size: 200,
                },
            ]
        );
    }

    #[test]
    fn entries_are_sorted_by_order_then_name() {
        let blobs = vec![
            blob("videos/Otros/zeta.mp4", 1),
            blob("videos/2. B/beta.mp4", 1),
            blob("videos/10. J/alpha.mp4", 1),
            blob("videos/2. B/Álvaro.mp4", 1),
            blob("videos/2. B/alba.mp4", 1),
            blob("videos/1. A/omega.mp4", 1),
        ];
        let entries = build_entries(&blobs, "videos/", ".mp4");

        let keys: Vec<(u64, &str)> = entries
            .iter()
            .map(|e| (e.category_order, e.file_name.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (1, "omega"),
                (2, "alba"),
                (2, "Álvaro"),
                (2, "beta"),
                (10, "alpha"),
                (999, "zeta"),
            ]
        );
        for pair in entries.windows(2) {
            assert!(pair[0].category_order <= pair[1].category_order);
        }
    }

    #[test]
    fn padded_and_plain_folders_share_display_name() {
        let blobs = vec![
            blob("videos/01. Team/b.mp4", 1),
            blob("videos/1. Team/a.mp4", 1),
        ];
        let entries = build_entries(&blobs, "videos/", ".mp4");

        assert!(entries.iter().all(|e| e.category == "Team"));
        assert!(entries.iter().all(|e| e.category_order == 1));
        assert_eq!(entries[0].file_name, "a");
    }

    #[test]
    fn locale_compare_ignores_case_and_accents_first() {
        assert_eq!(locale_compare("alba", "Álvaro"), Ordering::Less);
        assert_eq!(locale_compare("maria", "María"), Ordering::Less);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("Zoe", "adam"), Ordering::Greater);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
    }

    #[tokio::test]
    async fn two_pages_are_fetched_and_merged() {
        let mut store = FakeStore::default();
        store.pages.insert(
            None,
            BlobPage {
                blobs: vec![
                    blob("videos/2. Benjamin/01 Pedro.mp4", 200),
                    blob("videos/2. Benjamin/cover.jpg", 10),
                ],
                cursor: Some("page-2".to_string()),
            },
        );
        store.pages.insert(
            Some("page-2".to_string()),
            BlobPage {
                blobs: vec![blob("videos/1. Alevin A/05 Maria.mp4", 100)],
                cursor: None,
            },
        );
        let store = Arc::new(store);
        let lister = VideoLister::new(&Config::default(), Some(store.clone() as Arc<dyn BlobStore>));

        let videos = lister.list_videos().await.unwrap();

        assert_eq!(store.call_count(), 2);
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].file_name, "05 Maria");
        assert_eq!(videos[1].file_name, "01 Pedro");
    }

    #[tokio::test]
    async fn missing_store_is_a_configuration_error() {
        let lister = VideoLister::new(&Config::default(), None);
        let err = lister.list_videos().await.unwrap_err();
        assert!(matches!(err, ListingError::Configuration));
    }

    #[tokio::test]
    async fn failed_page_fails_the_listing() {
        let mut store = FakeStore::default();
        store.pages.insert(
            None,
            BlobPage {
                blobs: vec![blob("videos/1. A/a.mp4", 1)],
                cursor: Some("page-2".to_string()),
            },
        );
        store.fail_on = Some(Some("page-2".to_string()));

        let err = lister(store).list_videos().await.unwrap_err();
        assert!(matches!(err, ListingError::Retrieval(_)));
    }
}
