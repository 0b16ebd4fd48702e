use atelier_core::models::{Lineage, NewLineage, UpdateLineage};
use atelier_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const LINEAGE_COLUMNS: &str =
    "id, project_id, user_id, root_media_asset_id, name, metadata, created_at, updated_at";

/// Repository for lineages
#[derive(Clone)]
pub struct LineageRepository {
    pool: PgPool,
}

impl LineageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "lineages", db.operation = "select"))]
    pub async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Lineage>, AppError> {
        let lineages = sqlx::query_as::<Postgres, Lineage>(&format!(
            "SELECT {} FROM lineages WHERE project_id = $1 AND user_id = $2 ORDER BY created_at DESC",
            LINEAGE_COLUMNS
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lineages)
    }

    #[tracing::instrument(skip(self), fields(db.table = "lineages", db.operation = "select", db.record_id = %id))]
    pub async fn get_lineage(&self, id: Uuid, user_id: Uuid) -> Result<Option<Lineage>, AppError> {
        let lineage = sqlx::query_as::<Postgres, Lineage>(&format!(
            "SELECT {} FROM lineages WHERE id = $1 AND user_id = $2",
            LINEAGE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lineage)
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "lineages", db.operation = "insert", root = %new.root_media_asset_id))]
    pub async fn create_lineage(&self, new: &NewLineage) -> Result<Lineage, AppError> {
        let lineage = sqlx::query_as::<Postgres, Lineage>(&format!(
            r#"
            INSERT INTO lineages (project_id, user_id, root_media_asset_id, name, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            LINEAGE_COLUMNS
        ))
        .bind(new.project_id)
        .bind(new.user_id)
        .bind(new.root_media_asset_id)
        .bind(&new.name)
        .bind(&new.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(lineage)
    }

    /// Update name and/or metadata. The root asset column is never written.
    #[tracing::instrument(skip(self, changes), fields(db.table = "lineages", db.operation = "update", db.record_id = %id))]
    pub async fn update_lineage(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateLineage,
    ) -> Result<Option<Lineage>, AppError> {
        let mut query = String::from("UPDATE lineages SET updated_at = NOW()");
        let mut bind_index = 1;

        if changes.name.is_some() {
            query.push_str(&format!(", name = ${}", bind_index));
            bind_index += 1;
        }
        if changes.metadata.is_some() {
            query.push_str(&format!(", metadata = ${}", bind_index));
            bind_index += 1;
        }

        query.push_str(&format!(
            " WHERE id = ${} AND user_id = ${} RETURNING {}",
            bind_index,
            bind_index + 1,
            LINEAGE_COLUMNS
        ));

        let mut query_builder = sqlx::query_as::<Postgres, Lineage>(&query);
        if let Some(ref name) = changes.name {
            query_builder = query_builder.bind(name);
        }
        if let Some(ref metadata) = changes.metadata {
            query_builder = query_builder.bind(metadata);
        }
        query_builder = query_builder.bind(id).bind(user_id);

        let lineage = query_builder.fetch_optional(&self.pool).await?;

        Ok(lineage)
    }

    #[tracing::instrument(skip(self), fields(db.table = "lineages", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_lineage(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM lineages WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
