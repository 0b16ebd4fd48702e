//! In-memory stores and storage for service tests
//!
//! Every store and bucket call is appended to a shared `CallLog` so tests can
//! assert which remote calls happened and in what order. Failures are
//! injected per operation name (`"lineages.create"`, `"delete"`, ...).

#![allow(dead_code)]

use async_trait::async_trait;
use atelier_core::models::{
    EditedImage, GeneratedVideo, Lineage, MediaAsset, NewEditedImage, NewGeneratedVideo,
    NewLineage, NewMediaAsset, NewProject, NewVideoSource, Project, SourceType,
    UpdateEditedImage, UpdateGeneratedVideo, UpdateLineage, UpdateMediaAsset, UpdateProject,
    VideoSource, VideoStatus,
};
use atelier_core::AppError;
use atelier_db::{
    EditedImageStore, GeneratedVideoStore, LineageStore, MediaAssetStore, ProjectStore,
    VideoSourceStore,
};
use atelier_services::{Services, Stores};
use atelier_storage::{Buckets, Storage, StorageBackend, StorageError, StorageResult};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Ordered record of remote calls, shared by all mocks of one test
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

#[derive(Default)]
struct Tables {
    projects: Vec<Project>,
    media_assets: Vec<MediaAsset>,
    edited_images: Vec<EditedImage>,
    generated_videos: Vec<GeneratedVideo>,
    video_sources: Vec<VideoSource>,
    lineages: Vec<Lineage>,
}

/// All six tables in memory. Rows get strictly increasing `created_at`.
pub struct MemoryDb {
    tables: Mutex<Tables>,
    failures: Mutex<HashSet<&'static str>>,
    clock: Mutex<DateTime<Utc>>,
    log: CallLog,
}

impl MemoryDb {
    pub fn new(log: CallLog) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            failures: Mutex::new(HashSet::new()),
            clock: Mutex::new(Utc::now() - ChronoDuration::days(1)),
            log,
        }
    }

    /// Make every later call of `operation` fail, e.g. `"lineages.create"`.
    pub fn fail_on(&self, operation: &'static str) {
        self.failures.lock().unwrap().insert(operation);
    }

    fn call(&self, operation: &'static str) -> Result<(), AppError> {
        self.log.push(format!("db:{}", operation));
        if self.failures.lock().unwrap().contains(operation) {
            return Err(AppError::Database(sqlx::Error::Protocol(format!(
                "injected failure in {}",
                operation
            ))));
        }
        Ok(())
    }

    fn tick(&self) -> DateTime<Utc> {
        let mut clock = self.clock.lock().unwrap();
        *clock += ChronoDuration::seconds(1);
        *clock
    }

    // Seeding, bypassing the call log

    pub fn seed_project(&self, user_id: Uuid, name: &str) -> Project {
        let now = self.tick();
        let project = Project {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            description: None,
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
            preview_images: vec![],
        };
        self.tables.lock().unwrap().projects.push(project.clone());
        project
    }

    pub fn seed_asset(
        &self,
        project: &Project,
        lineage_id: Option<Uuid>,
        file_name: &str,
        file_type: &str,
    ) -> MediaAsset {
        let now = self.tick();
        let asset = MediaAsset {
            id: Uuid::new_v4(),
            project_id: project.id,
            user_id: project.user_id,
            lineage_id,
            file_name: file_name.to_string(),
            file_type: file_type.to_string(),
            file_size: 1024,
            width: None,
            height: None,
            storage_path: format!("{}/{}/{}", project.user_id, project.id, file_name),
            sort_order: 0,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().media_assets.push(asset.clone());
        asset
    }

    /// A root asset and the lineage it roots
    pub fn seed_lineage(&self, project: &Project, file_name: &str) -> (Lineage, MediaAsset) {
        let lineage_id = Uuid::new_v4();
        let root = self.seed_asset(project, Some(lineage_id), file_name, "image/png");
        let now = self.tick();
        let lineage = Lineage {
            id: lineage_id,
            project_id: project.id,
            user_id: project.user_id,
            root_media_asset_id: root.id,
            name: Some(file_name.to_string()),
            metadata: json!({}),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().lineages.push(lineage.clone());
        (lineage, root)
    }

    pub fn seed_image(
        &self,
        lineage: &Lineage,
        parent_id: Option<Uuid>,
        source_asset_id: Option<Uuid>,
        prompt: &str,
    ) -> EditedImage {
        let now = self.tick();
        let image = EditedImage {
            id: Uuid::new_v4(),
            project_id: lineage.project_id,
            user_id: lineage.user_id,
            lineage_id: Some(lineage.id),
            parent_id,
            source_asset_id,
            prompt: prompt.to_string(),
            context: json!({}),
            ai_model: "test-model".to_string(),
            storage_path: format!("{}/{}/edit-{}.png", lineage.user_id, lineage.project_id, now.timestamp()),
            width: None,
            height: None,
            version: 1,
            created_at: now,
            updated_at: now,
            image_url: None,
        };
        self.tables.lock().unwrap().edited_images.push(image.clone());
        image
    }

    pub fn seed_video(&self, lineage: &Lineage, storage_path: Option<&str>) -> GeneratedVideo {
        let now = self.tick();
        let video = GeneratedVideo {
            id: Uuid::new_v4(),
            project_id: lineage.project_id,
            user_id: lineage.user_id,
            lineage_id: Some(lineage.id),
            name: None,
            prompt: "slow zoom".to_string(),
            model: "test-video".to_string(),
            generation_params: json!({}),
            storage_path: storage_path.map(String::from),
            status: VideoStatus::Completed,
            created_at: now,
            completed_at: Some(now),
            updated_at: now,
            video_url: None,
        };
        self.tables
            .lock()
            .unwrap()
            .generated_videos
            .push(video.clone());
        video
    }

    pub fn seed_source(
        &self,
        video: &GeneratedVideo,
        source_type: SourceType,
        source_id: Uuid,
    ) -> VideoSource {
        let source = VideoSource {
            id: Uuid::new_v4(),
            video_id: video.id,
            source_type,
            source_id,
            sort_order: 0,
            created_at: self.tick(),
        };
        self.tables
            .lock()
            .unwrap()
            .video_sources
            .push(source.clone());
        source
    }

    // Inspection

    pub fn asset_exists(&self, id: Uuid) -> bool {
        self.tables.lock().unwrap().media_assets.iter().any(|a| a.id == id)
    }

    pub fn asset_count(&self) -> usize {
        self.tables.lock().unwrap().media_assets.len()
    }

    pub fn video_count(&self) -> usize {
        self.tables.lock().unwrap().generated_videos.len()
    }

    pub fn lineages_rooted_at(&self, asset_id: Uuid) -> Vec<Lineage> {
        self.tables
            .lock()
            .unwrap()
            .lineages
            .iter()
            .filter(|l| l.root_media_asset_id == asset_id)
            .cloned()
            .collect()
    }

    pub fn video_exists(&self, id: Uuid) -> bool {
        self.tables
            .lock()
            .unwrap()
            .generated_videos
            .iter()
            .any(|v| v.id == id)
    }

    pub fn sources_of(&self, video_id: Uuid) -> Vec<VideoSource> {
        self.tables
            .lock()
            .unwrap()
            .video_sources
            .iter()
            .filter(|s| s.video_id == video_id)
            .cloned()
            .collect()
    }
}

fn newest_first<T, F>(mut rows: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    rows
}

#[async_trait]
impl ProjectStore for MemoryDb {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Project>, AppError> {
        self.call("projects.list")?;
        let rows = self
            .tables
            .lock()
            .unwrap()
            .projects
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |p: &Project| p.created_at))
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<Project>, AppError> {
        self.call("projects.get")?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .projects
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }

    async fn create(&self, new: &NewProject) -> Result<Project, AppError> {
        self.call("projects.create")?;
        let now = self.tick();
        let project = Project {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            name: new.name.clone(),
            description: new.description.clone(),
            thumbnail_url: new.thumbnail_url.clone(),
            created_at: now,
            updated_at: now,
            preview_images: vec![],
        };
        self.tables.lock().unwrap().projects.push(project.clone());
        Ok(project)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateProject,
    ) -> Result<Option<Project>, AppError> {
        self.call("projects.update")?;
        let now = self.tick();
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .projects
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
            .map(|p| {
                changes.apply_to(p);
                p.updated_at = now;
                p.clone()
            }))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        self.call("projects.delete")?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.projects.len();
        tables
            .projects
            .retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(tables.projects.len() < before)
    }
}

#[async_trait]
impl MediaAssetStore for MemoryDb {
    async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<MediaAsset>, AppError> {
        self.call("media_assets.list_by_project")?;
        let rows = self
            .tables
            .lock()
            .unwrap()
            .media_assets
            .iter()
            .filter(|a| a.project_id == project_id && a.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |a: &MediaAsset| a.created_at))
    }

    async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<MediaAsset>, AppError> {
        self.call("media_assets.list_by_lineage")?;
        let rows = self
            .tables
            .lock()
            .unwrap()
            .media_assets
            .iter()
            .filter(|a| a.lineage_id == Some(lineage_id) && a.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |a: &MediaAsset| a.created_at))
    }

    async fn recent_images(
        &self,
        user_id: Uuid,
        project_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<MediaAsset>, AppError> {
        self.call("media_assets.recent_images")?;
        let rows: Vec<MediaAsset> = self
            .tables
            .lock()
            .unwrap()
            .media_assets
            .iter()
            .filter(|a| a.user_id == user_id && project_ids.contains(&a.project_id) && a.is_image())
            .cloned()
            .collect();

        let mut per_project: HashMap<Uuid, usize> = HashMap::new();
        Ok(newest_first(rows, |a: &MediaAsset| a.created_at)
            .into_iter()
            .filter(|a| {
                let seen = per_project.entry(a.project_id).or_default();
                *seen += 1;
                *seen as i64 <= limit
            })
            .collect())
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        self.call("media_assets.get")?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .media_assets
            .iter()
            .find(|a| a.id == id && a.user_id == user_id)
            .cloned())
    }

    async fn create(&self, new: &NewMediaAsset) -> Result<MediaAsset, AppError> {
        self.call("media_assets.create")?;
        let now = self.tick();
        let asset = MediaAsset {
            id: Uuid::new_v4(),
            project_id: new.project_id,
            user_id: new.user_id,
            lineage_id: new.lineage_id,
            file_name: new.file_name.clone(),
            file_type: new.file_type.clone(),
            file_size: new.file_size,
            width: new.width,
            height: new.height,
            storage_path: new.storage_path.clone(),
            sort_order: new.sort_order,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().media_assets.push(asset.clone());
        Ok(asset)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateMediaAsset,
    ) -> Result<Option<MediaAsset>, AppError> {
        self.call("media_assets.update")?;
        let now = self.tick();
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .media_assets
            .iter_mut()
            .find(|a| a.id == id && a.user_id == user_id)
            .map(|a| {
                changes.apply_to(a);
                a.updated_at = now;
                a.clone()
            }))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        self.call("media_assets.delete")?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.media_assets.len();
        tables
            .media_assets
            .retain(|a| !(a.id == id && a.user_id == user_id));
        Ok(tables.media_assets.len() < before)
    }
}

#[async_trait]
impl EditedImageStore for MemoryDb {
    async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<EditedImage>, AppError> {
        self.call("edited_images.list_by_project")?;
        let rows = self
            .tables
            .lock()
            .unwrap()
            .edited_images
            .iter()
            .filter(|i| i.project_id == project_id && i.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |i: &EditedImage| i.created_at))
    }

    async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<EditedImage>, AppError> {
        self.call("edited_images.list_by_lineage")?;
        let rows = self
            .tables
            .lock()
            .unwrap()
            .edited_images
            .iter()
            .filter(|i| i.lineage_id == Some(lineage_id) && i.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |i: &EditedImage| i.created_at))
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<EditedImage>, AppError> {
        self.call("edited_images.get")?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .edited_images
            .iter()
            .find(|i| i.id == id && i.user_id == user_id)
            .cloned())
    }

    async fn create(&self, new: &NewEditedImage) -> Result<EditedImage, AppError> {
        self.call("edited_images.create")?;
        let now = self.tick();
        let image = EditedImage {
            id: Uuid::new_v4(),
            project_id: new.project_id,
            user_id: new.user_id,
            lineage_id: new.lineage_id,
            parent_id: new.parent_id,
            source_asset_id: new.source_asset_id,
            prompt: new.prompt.clone(),
            context: new.context.clone(),
            ai_model: new.ai_model.clone(),
            storage_path: new.storage_path.clone(),
            width: new.width,
            height: new.height,
            version: new.version,
            created_at: now,
            updated_at: now,
            image_url: None,
        };
        self.tables.lock().unwrap().edited_images.push(image.clone());
        Ok(image)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateEditedImage,
    ) -> Result<Option<EditedImage>, AppError> {
        self.call("edited_images.update")?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .edited_images
            .iter_mut()
            .find(|i| i.id == id && i.user_id == user_id)
            .map(|i| {
                changes.apply_to(i);
                i.clone()
            }))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        self.call("edited_images.delete")?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.edited_images.len();
        tables
            .edited_images
            .retain(|i| !(i.id == id && i.user_id == user_id));
        Ok(tables.edited_images.len() < before)
    }
}

#[async_trait]
impl GeneratedVideoStore for MemoryDb {
    async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<GeneratedVideo>, AppError> {
        self.call("generated_videos.list_by_project")?;
        let rows = self
            .tables
            .lock()
            .unwrap()
            .generated_videos
            .iter()
            .filter(|v| v.project_id == project_id && v.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |v: &GeneratedVideo| v.created_at))
    }

    async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<GeneratedVideo>, AppError> {
        self.call("generated_videos.list_by_lineage")?;
        let rows = self
            .tables
            .lock()
            .unwrap()
            .generated_videos
            .iter()
            .filter(|v| v.lineage_id == Some(lineage_id) && v.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |v: &GeneratedVideo| v.created_at))
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<GeneratedVideo>, AppError> {
        self.call("generated_videos.get")?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .generated_videos
            .iter()
            .find(|v| v.id == id && v.user_id == user_id)
            .cloned())
    }

    async fn create(&self, new: &NewGeneratedVideo) -> Result<GeneratedVideo, AppError> {
        self.call("generated_videos.create")?;
        let now = self.tick();
        let video = GeneratedVideo {
            id: Uuid::new_v4(),
            project_id: new.project_id,
            user_id: new.user_id,
            lineage_id: new.lineage_id,
            name: new.name.clone(),
            prompt: new.prompt.clone(),
            model: new.model.clone(),
            generation_params: new.generation_params.clone(),
            storage_path: new.storage_path.clone(),
            status: new.status,
            created_at: now,
            completed_at: None,
            updated_at: now,
            video_url: None,
        };
        self.tables
            .lock()
            .unwrap()
            .generated_videos
            .push(video.clone());
        Ok(video)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateGeneratedVideo,
    ) -> Result<Option<GeneratedVideo>, AppError> {
        self.call("generated_videos.update")?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .generated_videos
            .iter_mut()
            .find(|v| v.id == id && v.user_id == user_id)
            .map(|v| {
                changes.apply_to(v);
                v.clone()
            }))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        self.call("generated_videos.delete")?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.generated_videos.len();
        tables
            .generated_videos
            .retain(|v| !(v.id == id && v.user_id == user_id));
        Ok(tables.generated_videos.len() < before)
    }
}

#[async_trait]
impl VideoSourceStore for MemoryDb {
    async fn list_by_video(&self, video_id: Uuid) -> Result<Vec<VideoSource>, AppError> {
        self.call("video_sources.list_by_video")?;
        let mut rows: Vec<VideoSource> = self.sources_of(video_id);
        rows.sort_by_key(|s| s.sort_order);
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<VideoSource>, AppError> {
        self.call("video_sources.get")?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .video_sources
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn create(&self, new: &NewVideoSource) -> Result<VideoSource, AppError> {
        self.call("video_sources.create")?;
        let source = VideoSource {
            id: Uuid::new_v4(),
            video_id: new.video_id,
            source_type: new.source_type,
            source_id: new.source_id,
            sort_order: new.sort_order,
            created_at: self.tick(),
        };
        self.tables
            .lock()
            .unwrap()
            .video_sources
            .push(source.clone());
        Ok(source)
    }

    async fn create_many(&self, sources: &[NewVideoSource]) -> Result<Vec<VideoSource>, AppError> {
        self.call("video_sources.create_many")?;
        let created: Vec<VideoSource> = sources
            .iter()
            .map(|new| VideoSource {
                id: Uuid::new_v4(),
                video_id: new.video_id,
                source_type: new.source_type,
                source_id: new.source_id,
                sort_order: new.sort_order,
                created_at: self.tick(),
            })
            .collect();
        self.tables
            .lock()
            .unwrap()
            .video_sources
            .extend(created.iter().cloned());
        Ok(created)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.call("video_sources.delete")?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.video_sources.len();
        tables.video_sources.retain(|s| s.id != id);
        Ok(tables.video_sources.len() < before)
    }
}

#[async_trait]
impl LineageStore for MemoryDb {
    async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Lineage>, AppError> {
        self.call("lineages.list_by_project")?;
        let rows = self
            .tables
            .lock()
            .unwrap()
            .lineages
            .iter()
            .filter(|l| l.project_id == project_id && l.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |l: &Lineage| l.created_at))
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<Lineage>, AppError> {
        self.call("lineages.get")?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .lineages
            .iter()
            .find(|l| l.id == id && l.user_id == user_id)
            .cloned())
    }

    async fn create(&self, new: &NewLineage) -> Result<Lineage, AppError> {
        self.call("lineages.create")?;
        let now = self.tick();
        let lineage = Lineage {
            id: Uuid::new_v4(),
            project_id: new.project_id,
            user_id: new.user_id,
            root_media_asset_id: new.root_media_asset_id,
            name: new.name.clone(),
            metadata: new.metadata.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().lineages.push(lineage.clone());
        Ok(lineage)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateLineage,
    ) -> Result<Option<Lineage>, AppError> {
        self.call("lineages.update")?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .lineages
            .iter_mut()
            .find(|l| l.id == id && l.user_id == user_id)
            .map(|l| {
                changes.apply_to(l);
                l.clone()
            }))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        self.call("lineages.delete")?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.lineages.len();
        tables
            .lineages
            .retain(|l| !(l.id == id && l.user_id == user_id));
        Ok(tables.lineages.len() < before)
    }
}

/// Mock storage bucket that keeps files in memory
pub struct MockStorage {
    bucket: String,
    files: Mutex<HashMap<String, Vec<u8>>>,
    failures: Mutex<HashSet<&'static str>>,
    log: CallLog,
}

impl MockStorage {
    pub fn new(bucket: &str, log: CallLog) -> Self {
        Self {
            bucket: bucket.to_string(),
            files: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashSet::new()),
            log,
        }
    }

    /// Make every later `upload`, `download` or `delete` fail.
    pub fn fail_on(&self, operation: &'static str) {
        self.failures.lock().unwrap().insert(operation);
    }

    pub fn set_file(&self, path: &str, data: Vec<u8>) {
        self.files.lock().unwrap().insert(path.to_string(), data);
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    fn call(&self, operation: &'static str) -> StorageResult<()> {
        self.log.push(format!("storage:{}.{}", self.bucket, operation));
        if self.failures.lock().unwrap().contains(operation) {
            return Err(StorageError::BackendError(format!(
                "injected failure in {}",
                operation
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload(&self, path: &str, _content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        self.call("upload")?;
        self.files.lock().unwrap().insert(path.to_string(), data);
        Ok(path.to_string())
    }

    async fn download(&self, path: &str) -> StorageResult<Vec<u8>> {
        self.call("download")?;
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn delete(&self, paths: &[String]) -> StorageResult<()> {
        self.call("delete")?;
        let mut files = self.files.lock().unwrap();
        for path in paths {
            files.remove(path);
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://cdn.test/{}/{}", self.bucket, path)
    }

    async fn signed_url(&self, path: &str, expires_in: Duration) -> StorageResult<String> {
        self.call("signed_url")?;
        Ok(format!(
            "https://cdn.test/{}/{}?expires_in={}",
            self.bucket,
            path,
            expires_in.as_secs()
        ))
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(path))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Services wired to in-memory mocks
pub struct TestEnv {
    pub log: CallLog,
    pub db: Arc<MemoryDb>,
    pub media: Arc<MockStorage>,
    pub edits: Arc<MockStorage>,
    pub videos: Arc<MockStorage>,
    pub services: Services,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_preview_limit(4)
    }

    pub fn with_preview_limit(limit: i64) -> Self {
        let log = CallLog::default();
        let db = Arc::new(MemoryDb::new(log.clone()));
        let media = Arc::new(MockStorage::new("media-assets", log.clone()));
        let edits = Arc::new(MockStorage::new("edited-images", log.clone()));
        let videos = Arc::new(MockStorage::new("generated-videos", log.clone()));

        let stores = Stores {
            projects: db.clone(),
            media_assets: db.clone(),
            edited_images: db.clone(),
            generated_videos: db.clone(),
            video_sources: db.clone(),
            lineages: db.clone(),
        };
        let buckets = Buckets::new(media.clone(), edits.clone(), videos.clone());
        let services = Services::new(stores, buckets, limit);

        Self {
            log,
            db,
            media,
            edits,
            videos,
            services,
        }
    }
}
