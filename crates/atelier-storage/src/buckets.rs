use std::sync::Arc;

use crate::{BucketKind, Storage};

/// The three buckets files are stored in
#[derive(Clone)]
pub struct Buckets {
    pub media_assets: Arc<dyn Storage>,
    pub edited_images: Arc<dyn Storage>,
    pub generated_videos: Arc<dyn Storage>,
}

impl Buckets {
    pub fn new(
        media_assets: Arc<dyn Storage>,
        edited_images: Arc<dyn Storage>,
        generated_videos: Arc<dyn Storage>,
    ) -> Self {
        Self {
            media_assets,
            edited_images,
            generated_videos,
        }
    }

    pub fn get(&self, kind: BucketKind) -> &Arc<dyn Storage> {
        match kind {
            BucketKind::MediaAssets => &self.media_assets,
            BucketKind::EditedImages => &self.edited_images,
            BucketKind::GeneratedVideos => &self.generated_videos,
        }
    }
}
