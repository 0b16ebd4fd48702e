use atelier_core::models::{NewProject, Project, UpdateProject};
use atelier_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const PROJECT_COLUMNS: &str =
    "id, user_id, name, description, thumbnail_url, created_at, updated_at";

/// Repository for projects
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a user's projects, newest first
    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "select"))]
    pub async fn list_projects(&self, user_id: Uuid) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<Postgres, Project>(&format!(
            "SELECT {} FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
            PROJECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    /// Get project by ID (user-scoped)
    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "select", db.record_id = %id))]
    pub async fn get_project(&self, id: Uuid, user_id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(&format!(
            "SELECT {} FROM projects WHERE id = $1 AND user_id = $2",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "projects", db.operation = "insert"))]
    pub async fn create_project(&self, new: &NewProject) -> Result<Project, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(&format!(
            r#"
            INSERT INTO projects (user_id, name, description, thumbnail_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(new.user_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.thumbnail_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    /// Update the fields present in `changes`. Returns `None` when no
    /// project with this id belongs to the user.
    #[tracing::instrument(skip(self, changes), fields(db.table = "projects", db.operation = "update", db.record_id = %id))]
    pub async fn update_project(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateProject,
    ) -> Result<Option<Project>, AppError> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_index = 1;

        if changes.name.is_some() {
            query.push_str(&format!(", name = ${}", bind_index));
            bind_index += 1;
        }
        if changes.description.is_some() {
            query.push_str(&format!(", description = ${}", bind_index));
            bind_index += 1;
        }
        if changes.thumbnail_url.is_some() {
            query.push_str(&format!(", thumbnail_url = ${}", bind_index));
            bind_index += 1;
        }

        query.push_str(&format!(
            " WHERE id = ${} AND user_id = ${} RETURNING {}",
            bind_index,
            bind_index + 1,
            PROJECT_COLUMNS
        ));

        let mut query_builder = sqlx::query_as::<Postgres, Project>(&query);
        if let Some(ref name) = changes.name {
            query_builder = query_builder.bind(name);
        }
        if let Some(ref description) = changes.description {
            query_builder = query_builder.bind(description);
        }
        if let Some(ref thumbnail_url) = changes.thumbnail_url {
            query_builder = query_builder.bind(thumbnail_url);
        }
        query_builder = query_builder.bind(id).bind(user_id);

        let project = query_builder.fetch_optional(&self.pool).await?;

        Ok(project)
    }

    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_project(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
