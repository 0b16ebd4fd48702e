use atelier_core::models::{NewVideoSource, VideoSource};
use atelier_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const VIDEO_SOURCE_COLUMNS: &str = "id, video_id, source_type, source_id, sort_order, created_at";

/// Repository for video source links
///
/// The table has no owner column. Callers confirm the referenced video
/// belongs to the acting user before calling in.
#[derive(Clone)]
pub struct VideoSourceRepository {
    pool: PgPool,
}

impl VideoSourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "video_sources", db.operation = "select"))]
    pub async fn list_by_video(&self, video_id: Uuid) -> Result<Vec<VideoSource>, AppError> {
        let sources = sqlx::query_as::<Postgres, VideoSource>(&format!(
            "SELECT {} FROM video_sources WHERE video_id = $1 ORDER BY sort_order ASC, created_at ASC",
            VIDEO_SOURCE_COLUMNS
        ))
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sources)
    }

    #[tracing::instrument(skip(self), fields(db.table = "video_sources", db.operation = "select", db.record_id = %id))]
    pub async fn get_source(&self, id: Uuid) -> Result<Option<VideoSource>, AppError> {
        let source = sqlx::query_as::<Postgres, VideoSource>(&format!(
            "SELECT {} FROM video_sources WHERE id = $1",
            VIDEO_SOURCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(source)
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "video_sources", db.operation = "insert", video_id = %new.video_id))]
    pub async fn create_source(&self, new: &NewVideoSource) -> Result<VideoSource, AppError> {
        let source = sqlx::query_as::<Postgres, VideoSource>(&format!(
            r#"
            INSERT INTO video_sources (video_id, source_type, source_id, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            VIDEO_SOURCE_COLUMNS
        ))
        .bind(new.video_id)
        .bind(new.source_type)
        .bind(new.source_id)
        .bind(new.sort_order)
        .fetch_one(&self.pool)
        .await?;

        Ok(source)
    }

    /// Insert several links in one transaction; either all rows land or none do.
    #[tracing::instrument(skip(self, sources), fields(db.table = "video_sources", db.operation = "insert", count = sources.len()))]
    pub async fn create_sources(
        &self,
        sources: &[NewVideoSource],
    ) -> Result<Vec<VideoSource>, AppError> {
        let mut tx = self.pool.begin().await?;
        let query = format!(
            r#"
            INSERT INTO video_sources (video_id, source_type, source_id, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            VIDEO_SOURCE_COLUMNS
        );

        let mut created = Vec::with_capacity(sources.len());
        for new in sources {
            let source = sqlx::query_as::<Postgres, VideoSource>(&query)
                .bind(new.video_id)
                .bind(new.source_type)
                .bind(new.source_id)
                .bind(new.sort_order)
                .fetch_one(&mut *tx)
                .await?;
            created.push(source);
        }

        tx.commit().await?;
        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "video_sources", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_source(&self, id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM video_sources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
