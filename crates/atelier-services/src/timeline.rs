//! Lineage graph assembly
//!
//! A lineage is rendered as a graph: the root media asset, every edit made
//! from it and every video generated from those images. Rows are fetched
//! flat and joined here in a single pass.

use std::sync::Arc;

use atelier_core::models::{
    EditedImage, GeneratedVideo, MediaAsset, NodeData, TimelineData, TimelineEdge, TimelineNode,
};
use atelier_core::AppError;
use atelier_db::{
    EditedImageStore, GeneratedVideoStore, LineageStore, MediaAssetStore, VideoSourceStore,
};
use atelier_storage::{resolve_display_url, Buckets};
use futures::future::try_join_all;
use uuid::Uuid;

const LABEL_MAX_CHARS: usize = 48;

#[derive(Clone)]
pub struct TimelineAssembler {
    lineages: Arc<dyn LineageStore>,
    assets: Arc<dyn MediaAssetStore>,
    images: Arc<dyn EditedImageStore>,
    videos: Arc<dyn GeneratedVideoStore>,
    sources: Arc<dyn VideoSourceStore>,
    buckets: Buckets,
}

impl TimelineAssembler {
    pub fn new(
        lineages: Arc<dyn LineageStore>,
        assets: Arc<dyn MediaAssetStore>,
        images: Arc<dyn EditedImageStore>,
        videos: Arc<dyn GeneratedVideoStore>,
        sources: Arc<dyn VideoSourceStore>,
        buckets: Buckets,
    ) -> Self {
        Self {
            lineages,
            assets,
            images,
            videos,
            sources,
            buckets,
        }
    }

    /// Build the derivation graph of one lineage.
    ///
    /// Edits hang off their `parent_id`, else their `source_asset_id`, else
    /// the lineage root. Videos hang off every image they were generated
    /// from. Nodes are ordered oldest first. Any failed fetch fails the
    /// whole call.
    #[tracing::instrument(skip(self))]
    pub async fn get_timeline_data(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<TimelineData, AppError> {
        let start = std::time::Instant::now();

        let lineage = self
            .lineages
            .get(lineage_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lineage {} not found", lineage_id)))?;
        let root = lineage.root_media_asset_id;

        let (assets, images, videos) = tokio::try_join!(
            self.assets.list_by_lineage(lineage_id, user_id),
            self.images.list_by_lineage(lineage_id, user_id),
            self.videos.list_by_lineage(lineage_id, user_id),
        )?;

        let video_sources = try_join_all(
            videos
                .iter()
                .map(|video| self.sources.list_by_video(video.id)),
        )
        .await?;

        let mut timeline = TimelineData::default();
        timeline.nodes.reserve(assets.len() + images.len() + videos.len());

        for asset in assets {
            timeline.nodes.push(self.asset_node(asset));
        }

        for image in images {
            let from = image.derived_from().unwrap_or(root);
            timeline.edges.push(TimelineEdge::new(from, image.id));
            timeline.nodes.push(self.image_node(image));
        }

        for (video, sources) in videos.into_iter().zip(video_sources) {
            for source in &sources {
                timeline.edges.push(TimelineEdge::new(source.source_id, video.id));
            }
            timeline.nodes.push(self.video_node(video));
        }

        // Stable, so rows sharing a timestamp keep their fetch order
        timeline.nodes.sort_by_key(|node| node.created_at);

        tracing::debug!(
            lineage_id = %lineage_id,
            nodes = timeline.nodes.len(),
            edges = timeline.edges.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Timeline assembled"
        );

        Ok(timeline)
    }

    fn asset_node(&self, asset: MediaAsset) -> TimelineNode {
        TimelineNode {
            id: asset.id,
            label: asset.file_name.clone(),
            display_url: Some(resolve_display_url(
                self.buckets.media_assets.as_ref(),
                &asset.storage_path,
            )),
            created_at: asset.created_at,
            data: NodeData::MediaAsset(asset),
        }
    }

    fn image_node(&self, mut image: EditedImage) -> TimelineNode {
        let url = resolve_display_url(self.buckets.edited_images.as_ref(), &image.storage_path);
        image.image_url = Some(url.clone());
        let label = if image.prompt.trim().is_empty() {
            format!("Edit v{}", image.version)
        } else {
            truncate_label(&image.prompt)
        };
        TimelineNode {
            id: image.id,
            label,
            display_url: Some(url),
            created_at: image.created_at,
            data: NodeData::EditedImage(image),
        }
    }

    fn video_node(&self, mut video: GeneratedVideo) -> TimelineNode {
        let url = video
            .storage_path
            .as_deref()
            .filter(|path| !path.trim().is_empty())
            .map(|path| resolve_display_url(self.buckets.generated_videos.as_ref(), path));
        video.video_url = url.clone();
        let label = match video.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => truncate_label(&video.prompt),
        };
        TimelineNode {
            id: video.id,
            label,
            display_url: url,
            created_at: video.created_at,
            data: NodeData::GeneratedVideo(video),
        }
    }
}

fn truncate_label(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= LABEL_MAX_CHARS {
        return text.to_string();
    }
    let mut label: String = text.chars().take(LABEL_MAX_CHARS - 1).collect();
    label.push('…');
    label
}
