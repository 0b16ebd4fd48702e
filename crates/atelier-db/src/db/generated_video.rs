use atelier_core::models::{GeneratedVideo, NewGeneratedVideo, UpdateGeneratedVideo};
use atelier_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const GENERATED_VIDEO_COLUMNS: &str = "id, project_id, user_id, lineage_id, name, prompt, \
     model, generation_params, storage_path, status, created_at, completed_at, updated_at";

/// Repository for generated videos
#[derive(Clone)]
pub struct GeneratedVideoRepository {
    pool: PgPool,
}

impl GeneratedVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "generated_videos", db.operation = "select"))]
    pub async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<GeneratedVideo>, AppError> {
        let videos = sqlx::query_as::<Postgres, GeneratedVideo>(&format!(
            "SELECT {} FROM generated_videos WHERE project_id = $1 AND user_id = $2 ORDER BY created_at DESC",
            GENERATED_VIDEO_COLUMNS
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    #[tracing::instrument(skip(self), fields(db.table = "generated_videos", db.operation = "select"))]
    pub async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<GeneratedVideo>, AppError> {
        let videos = sqlx::query_as::<Postgres, GeneratedVideo>(&format!(
            "SELECT {} FROM generated_videos WHERE lineage_id = $1 AND user_id = $2 ORDER BY created_at DESC",
            GENERATED_VIDEO_COLUMNS
        ))
        .bind(lineage_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    #[tracing::instrument(skip(self), fields(db.table = "generated_videos", db.operation = "select", db.record_id = %id))]
    pub async fn get_video(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GeneratedVideo>, AppError> {
        let video = sqlx::query_as::<Postgres, GeneratedVideo>(&format!(
            "SELECT {} FROM generated_videos WHERE id = $1 AND user_id = $2",
            GENERATED_VIDEO_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "generated_videos", db.operation = "insert"))]
    pub async fn create_video(&self, new: &NewGeneratedVideo) -> Result<GeneratedVideo, AppError> {
        let video = sqlx::query_as::<Postgres, GeneratedVideo>(&format!(
            r#"
            INSERT INTO generated_videos (
                project_id, user_id, lineage_id, name, prompt, model,
                generation_params, storage_path, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            GENERATED_VIDEO_COLUMNS
        ))
        .bind(new.project_id)
        .bind(new.user_id)
        .bind(new.lineage_id)
        .bind(&new.name)
        .bind(&new.prompt)
        .bind(&new.model)
        .bind(&new.generation_params)
        .bind(&new.storage_path)
        .bind(new.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "generated_videos", db.operation = "update", db.record_id = %id))]
    pub async fn update_video(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateGeneratedVideo,
    ) -> Result<Option<GeneratedVideo>, AppError> {
        let mut query = String::from("UPDATE generated_videos SET updated_at = NOW()");
        let mut bind_index = 1;

        if changes.name.is_some() {
            query.push_str(&format!(", name = ${}", bind_index));
            bind_index += 1;
        }
        if changes.storage_path.is_some() {
            query.push_str(&format!(", storage_path = ${}", bind_index));
            bind_index += 1;
        }
        if changes.status.is_some() {
            query.push_str(&format!(", status = ${}", bind_index));
            bind_index += 1;
        }
        if changes.completed_at.is_some() {
            query.push_str(&format!(", completed_at = ${}", bind_index));
            bind_index += 1;
        }

        query.push_str(&format!(
            " WHERE id = ${} AND user_id = ${} RETURNING {}",
            bind_index,
            bind_index + 1,
            GENERATED_VIDEO_COLUMNS
        ));

        let mut query_builder = sqlx::query_as::<Postgres, GeneratedVideo>(&query);
        if let Some(ref name) = changes.name {
            query_builder = query_builder.bind(name);
        }
        if let Some(ref storage_path) = changes.storage_path {
            query_builder = query_builder.bind(storage_path);
        }
        if let Some(status) = changes.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(completed_at) = changes.completed_at {
            query_builder = query_builder.bind(completed_at);
        }
        query_builder = query_builder.bind(id).bind(user_id);

        let video = query_builder.fetch_optional(&self.pool).await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "generated_videos", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_video(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let rows_affected =
            sqlx::query("DELETE FROM generated_videos WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows_affected > 0)
    }
}
