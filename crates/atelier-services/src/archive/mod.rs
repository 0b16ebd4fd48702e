//! ZIP bulk download of stored files

use anyhow::{Context, Result};
use atelier_storage::{is_absolute_url, BucketKind, Buckets};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

use crate::services::Services;

/// One stored file to put into an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub bucket: BucketKind,
    pub path: String,
    pub file_name: String,
}

impl ArchiveEntry {
    pub fn new(bucket: BucketKind, path: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bucket,
            path: path.into(),
            file_name: file_name.into(),
        }
    }
}

/// Keep only the base name of an entry so nothing escapes the archive root.
fn sanitize_entry_name(file_name: &str, fallback: &str) -> String {
    Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// `photo.png`, `photo (1).png`, `photo (2).png`, ...
fn unique_entry_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name.as_str(), ""),
    };
    let mut n = 1;
    loop {
        let candidate = format!("{} ({}){}", stem, n, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Download every entry from its bucket and pack them into a deflated ZIP.
pub async fn create_zip_archive(buckets: &Buckets, entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        let mut used = HashSet::new();

        for (index, entry) in entries.iter().enumerate() {
            let data = buckets
                .get(entry.bucket)
                .download(&entry.path)
                .await
                .with_context(|| format!("Failed to download file: {}", entry.path))?;

            let name = unique_entry_name(
                sanitize_entry_name(&entry.file_name, &format!("file_{}", index + 1)),
                &mut used,
            );

            zip.start_file(name.as_str(), options)
                .with_context(|| format!("Failed to add file to ZIP: {}", name))?;
            zip.write_all(&data)
                .with_context(|| format!("Failed to write file data to ZIP: {}", name))?;
        }

        zip.finish().context("Failed to finalize ZIP archive")?;
    }

    Ok(buffer)
}

/// Every stored file of a lineage: assets, edits, and videos with a bucket
/// path. Provider-hosted videos are left out.
pub async fn lineage_entries(
    services: &Services,
    lineage_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<ArchiveEntry>> {
    services.lineages.get(lineage_id, user_id).await?;

    let (assets, images, videos) = tokio::try_join!(
        services.media_assets.list_by_lineage(lineage_id, user_id),
        services.edited_images.list_by_lineage(lineage_id, user_id),
        services.generated_videos.list_by_lineage(lineage_id, user_id),
    )?;

    let mut entries = Vec::with_capacity(assets.len() + images.len() + videos.len());
    for asset in assets {
        if is_absolute_url(&asset.storage_path) {
            continue;
        }
        entries.push(ArchiveEntry::new(
            BucketKind::MediaAssets,
            asset.storage_path,
            asset.file_name,
        ));
    }
    for image in images {
        if is_absolute_url(&image.storage_path) {
            continue;
        }
        let name = stored_name(&image.storage_path, &format!("edit-v{}.png", image.version));
        entries.push(ArchiveEntry::new(
            BucketKind::EditedImages,
            image.storage_path,
            name,
        ));
    }
    for video in videos {
        match video.storage_path {
            Some(path) if is_absolute_url(&path) => {
                tracing::warn!(video_id = %video.id, "Skipping externally hosted video");
            }
            Some(path) if !path.trim().is_empty() => {
                let name = stored_name(&path, &format!("video-{}.mp4", video.id.simple()));
                entries.push(ArchiveEntry::new(BucketKind::GeneratedVideos, path, name));
            }
            _ => {}
        }
    }

    Ok(entries)
}

/// Build a ZIP of everything stored for a lineage.
pub async fn lineage_archive(
    services: &Services,
    lineage_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<u8>> {
    let entries = lineage_entries(services, lineage_id, user_id).await?;
    tracing::info!(lineage_id = %lineage_id, files = entries.len(), "Building lineage archive");
    create_zip_archive(&services.buckets, &entries).await
}

/// Name after the generated `{unique}-` prefix of a stored path.
fn stored_name(path: &str, fallback: &str) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.split_once('-') {
        Some((_, name)) if !name.is_empty() => name.to_string(),
        _ if !base.is_empty() => base.to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_names_cannot_escape() {
        assert_eq!(sanitize_entry_name("../../etc/passwd", "fallback"), "passwd");
        assert_eq!(sanitize_entry_name("beach.png", "fallback"), "beach.png");
        assert_eq!(sanitize_entry_name("", "fallback"), "fallback");
        assert_eq!(sanitize_entry_name("..", "fallback"), "fallback");
    }

    #[test]
    fn duplicate_names_get_a_counter() {
        let mut used = HashSet::new();
        assert_eq!(unique_entry_name("a.png".into(), &mut used), "a.png");
        assert_eq!(unique_entry_name("a.png".into(), &mut used), "a (1).png");
        assert_eq!(unique_entry_name("a.png".into(), &mut used), "a (2).png");
        assert_eq!(unique_entry_name("README".into(), &mut used), "README");
        assert_eq!(unique_entry_name("README".into(), &mut used), "README (1)");
    }

    #[test]
    fn stored_names_drop_the_unique_prefix() {
        assert_eq!(
            stored_name("u/p/0f8e2c6d9b1a4e7f8a9b0c1d2e3f4a5b-sunset.png", "x"),
            "sunset.png"
        );
        assert_eq!(stored_name("u/p/plain.png", "x"), "plain.png");
        assert_eq!(stored_name("", "x"), "x");
    }
}
