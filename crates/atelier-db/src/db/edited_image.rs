use atelier_core::models::{EditedImage, NewEditedImage, UpdateEditedImage};
use atelier_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const EDITED_IMAGE_COLUMNS: &str = "id, project_id, user_id, lineage_id, parent_id, \
     source_asset_id, prompt, context, ai_model, storage_path, width, height, version, \
     created_at, updated_at";

/// Repository for AI-edited images
#[derive(Clone)]
pub struct EditedImageRepository {
    pool: PgPool,
}

impl EditedImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "edited_images", db.operation = "select"))]
    pub async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<EditedImage>, AppError> {
        let images = sqlx::query_as::<Postgres, EditedImage>(&format!(
            "SELECT {} FROM edited_images WHERE project_id = $1 AND user_id = $2 ORDER BY created_at DESC",
            EDITED_IMAGE_COLUMNS
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    #[tracing::instrument(skip(self), fields(db.table = "edited_images", db.operation = "select"))]
    pub async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<EditedImage>, AppError> {
        let images = sqlx::query_as::<Postgres, EditedImage>(&format!(
            "SELECT {} FROM edited_images WHERE lineage_id = $1 AND user_id = $2 ORDER BY created_at DESC",
            EDITED_IMAGE_COLUMNS
        ))
        .bind(lineage_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    #[tracing::instrument(skip(self), fields(db.table = "edited_images", db.operation = "select", db.record_id = %id))]
    pub async fn get_image(&self, id: Uuid, user_id: Uuid) -> Result<Option<EditedImage>, AppError> {
        let image = sqlx::query_as::<Postgres, EditedImage>(&format!(
            "SELECT {} FROM edited_images WHERE id = $1 AND user_id = $2",
            EDITED_IMAGE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "edited_images", db.operation = "insert"))]
    pub async fn create_image(&self, new: &NewEditedImage) -> Result<EditedImage, AppError> {
        let image = sqlx::query_as::<Postgres, EditedImage>(&format!(
            r#"
            INSERT INTO edited_images (
                project_id, user_id, lineage_id, parent_id, source_asset_id, prompt,
                context, ai_model, storage_path, width, height, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            EDITED_IMAGE_COLUMNS
        ))
        .bind(new.project_id)
        .bind(new.user_id)
        .bind(new.lineage_id)
        .bind(new.parent_id)
        .bind(new.source_asset_id)
        .bind(&new.prompt)
        .bind(&new.context)
        .bind(&new.ai_model)
        .bind(&new.storage_path)
        .bind(new.width)
        .bind(new.height)
        .bind(new.version)
        .fetch_one(&self.pool)
        .await?;

        Ok(image)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "edited_images", db.operation = "update", db.record_id = %id))]
    pub async fn update_image(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateEditedImage,
    ) -> Result<Option<EditedImage>, AppError> {
        let mut query = String::from("UPDATE edited_images SET updated_at = NOW()");
        let mut bind_index = 1;

        if changes.prompt.is_some() {
            query.push_str(&format!(", prompt = ${}", bind_index));
            bind_index += 1;
        }
        if changes.context.is_some() {
            query.push_str(&format!(", context = ${}", bind_index));
            bind_index += 1;
        }
        if changes.version.is_some() {
            query.push_str(&format!(", version = ${}", bind_index));
            bind_index += 1;
        }

        query.push_str(&format!(
            " WHERE id = ${} AND user_id = ${} RETURNING {}",
            bind_index,
            bind_index + 1,
            EDITED_IMAGE_COLUMNS
        ));

        let mut query_builder = sqlx::query_as::<Postgres, EditedImage>(&query);
        if let Some(ref prompt) = changes.prompt {
            query_builder = query_builder.bind(prompt);
        }
        if let Some(ref context) = changes.context {
            query_builder = query_builder.bind(context);
        }
        if let Some(version) = changes.version {
            query_builder = query_builder.bind(version);
        }
        query_builder = query_builder.bind(id).bind(user_id);

        let image = query_builder.fetch_optional(&self.pool).await?;

        Ok(image)
    }

    #[tracing::instrument(skip(self), fields(db.table = "edited_images", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_image(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM edited_images WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
