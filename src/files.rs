use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// How file names are matched against an extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionMatch {
    Exact,
    IgnoreCase,
}

/// Recursively collect files under `dir` ending in `extension`, sorted by path.
/// A missing directory yields an empty list.
pub async fn collect_video_files(
    dir: &Path,
    extension: &str,
    matching: ExtensionMatch,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.exists() {
        return Ok(files);
    }

    let wanted = extension.to_lowercase();
    let mut dirs_to_process = vec![dir.to_path_buf()];

    while let Some(current_dir) = dirs_to_process.pop() {
        let mut entries = match fs::read_dir(&current_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("[files] Failed to read directory {:?}: {}", current_dir, e);
                continue;
            }
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    warn!("[files] Failed to get file type for {:?}: {}", path, e);
                    continue;
                }
            };

            if file_type.is_dir() {
                dirs_to_process.push(path);
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let matches = match matching {
                ExtensionMatch::Exact => name.ends_with(extension),
                ExtensionMatch::IgnoreCase => name.to_lowercase().ends_with(&wanted),
            };
            if matches {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// `path` relative to `base`, always with `/` separators.
pub fn relative_slash_path(path: &Path, base: &Path) -> String {
    let relative = pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf());
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Human readable size, e.g. `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Size in megabytes with two decimals.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}
