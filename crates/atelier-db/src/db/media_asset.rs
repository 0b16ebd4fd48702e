use atelier_core::models::{MediaAsset, NewMediaAsset, UpdateMediaAsset};
use atelier_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const MEDIA_ASSET_COLUMNS: &str = "id, project_id, user_id, lineage_id, file_name, file_type, \
     file_size, width, height, storage_path, sort_order, created_at, updated_at";

/// Repository for uploaded media assets
#[derive(Clone)]
pub struct MediaAssetRepository {
    pool: PgPool,
}

impl MediaAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select"))]
    pub async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<MediaAsset>, AppError> {
        let assets = sqlx::query_as::<Postgres, MediaAsset>(&format!(
            "SELECT {} FROM media_assets WHERE project_id = $1 AND user_id = $2 ORDER BY created_at DESC",
            MEDIA_ASSET_COLUMNS
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assets)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select"))]
    pub async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<MediaAsset>, AppError> {
        let assets = sqlx::query_as::<Postgres, MediaAsset>(&format!(
            "SELECT {} FROM media_assets WHERE lineage_id = $1 AND user_id = $2 ORDER BY created_at DESC",
            MEDIA_ASSET_COLUMNS
        ))
        .bind(lineage_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assets)
    }

    /// Most recent image assets of each given project, at most `limit` per
    /// project, newest first within a project.
    #[tracing::instrument(skip(self, project_ids), fields(db.table = "media_assets", db.operation = "select", projects = project_ids.len()))]
    pub async fn recent_images(
        &self,
        user_id: Uuid,
        project_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<MediaAsset>, AppError> {
        if project_ids.is_empty() || limit <= 0 {
            return Ok(Vec::new());
        }

        let assets = sqlx::query_as::<Postgres, MediaAsset>(&format!(
            r#"
            SELECT {cols} FROM (
                SELECT {cols},
                       ROW_NUMBER() OVER (PARTITION BY project_id ORDER BY created_at DESC) AS rn
                FROM media_assets
                WHERE user_id = $1
                  AND project_id = ANY($2)
                  AND lower(file_type) LIKE 'image/%'
            ) ranked
            WHERE rn <= $3
            ORDER BY project_id, created_at DESC
            "#,
            cols = MEDIA_ASSET_COLUMNS
        ))
        .bind(user_id)
        .bind(project_ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(assets)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select", db.record_id = %id))]
    pub async fn get_asset(&self, id: Uuid, user_id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        let asset = sqlx::query_as::<Postgres, MediaAsset>(&format!(
            "SELECT {} FROM media_assets WHERE id = $1 AND user_id = $2",
            MEDIA_ASSET_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "media_assets", db.operation = "insert"))]
    pub async fn create_asset(&self, new: &NewMediaAsset) -> Result<MediaAsset, AppError> {
        let asset = sqlx::query_as::<Postgres, MediaAsset>(&format!(
            r#"
            INSERT INTO media_assets (
                project_id, user_id, lineage_id, file_name, file_type, file_size,
                width, height, storage_path, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            MEDIA_ASSET_COLUMNS
        ))
        .bind(new.project_id)
        .bind(new.user_id)
        .bind(new.lineage_id)
        .bind(&new.file_name)
        .bind(&new.file_type)
        .bind(new.file_size)
        .bind(new.width)
        .bind(new.height)
        .bind(&new.storage_path)
        .bind(new.sort_order)
        .fetch_one(&self.pool)
        .await?;

        Ok(asset)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "media_assets", db.operation = "update", db.record_id = %id))]
    pub async fn update_asset(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateMediaAsset,
    ) -> Result<Option<MediaAsset>, AppError> {
        let mut query = String::from("UPDATE media_assets SET updated_at = NOW()");
        let mut bind_index = 1;

        if changes.file_name.is_some() {
            query.push_str(&format!(", file_name = ${}", bind_index));
            bind_index += 1;
        }
        if changes.sort_order.is_some() {
            query.push_str(&format!(", sort_order = ${}", bind_index));
            bind_index += 1;
        }
        if changes.lineage_id.is_some() {
            query.push_str(&format!(", lineage_id = ${}", bind_index));
            bind_index += 1;
        }

        query.push_str(&format!(
            " WHERE id = ${} AND user_id = ${} RETURNING {}",
            bind_index,
            bind_index + 1,
            MEDIA_ASSET_COLUMNS
        ));

        let mut query_builder = sqlx::query_as::<Postgres, MediaAsset>(&query);
        if let Some(ref file_name) = changes.file_name {
            query_builder = query_builder.bind(file_name);
        }
        if let Some(sort_order) = changes.sort_order {
            query_builder = query_builder.bind(sort_order);
        }
        if let Some(lineage_id) = changes.lineage_id {
            query_builder = query_builder.bind(lineage_id);
        }
        query_builder = query_builder.bind(id).bind(user_id);

        let asset = query_builder.fetch_optional(&self.pool).await?;

        Ok(asset)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_asset(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM media_assets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
