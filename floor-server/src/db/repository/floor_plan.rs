//! Floor Plan Repository

use super::{BaseRepository, RepoError, RepoResult, new_record_id};
use crate::db::models::FloorPlan;
use shared::models::{FloorPlanCreate, FloorPlanStatus, FloorPlanUpdate, Obstacle};
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "floor_plan";

/// Obstacles 先转为 JSON，保证枚举以字符串形式入库
fn obstacles_value(obstacles: &[Obstacle]) -> RepoResult<serde_json::Value> {
    serde_json::to_value(obstacles)
        .map_err(|e| RepoError::Validation(format!("Invalid obstacles: {}", e)))
}

#[derive(Clone)]
pub struct FloorPlanRepository {
    base: BaseRepository,
}

impl FloorPlanRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all floor plans, optionally by status, ordered by name
    pub async fn find_all(&self, status: Option<FloorPlanStatus>) -> RepoResult<Vec<FloorPlan>> {
        let plans: Vec<FloorPlan> = match status {
            Some(status) => self
                .base
                .db()
                .query("SELECT * FROM floor_plan WHERE status = $status ORDER BY name")
                .bind(("status", status.as_str()))
                .await?
                .take(0)?,
            None => self
                .base
                .db()
                .query("SELECT * FROM floor_plan ORDER BY name")
                .await?
                .take(0)?,
        };
        Ok(plans)
    }

    /// Find floor plan by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<FloorPlan>> {
        let plan: Option<FloorPlan> = self.base.db().select(id.clone()).await?;
        Ok(plan)
    }

    /// Find floor plan by name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<FloorPlan>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM floor_plan WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let plans: Vec<FloorPlan> = result.take(0)?;
        Ok(plans.into_iter().next())
    }

    /// Create a new floor plan
    pub async fn create(&self, data: FloorPlanCreate, created_by: RecordId) -> RepoResult<FloorPlan> {
        let name = data.name.trim().to_string();
        if self.find_by_name(&name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Floor plan '{}' already exists",
                name
            )));
        }

        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE $id SET
                    name = $name,
                    description = $description,
                    dimensions = $dimensions,
                    status = $status,
                    obstacles = $obstacles,
                    created_by = $actor,
                    last_modified_by = $actor,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("id", new_record_id(TABLE)))
            .bind(("name", name))
            .bind(("description", data.description))
            .bind(("dimensions", data.dimensions))
            .bind(("status", data.status.as_str()))
            .bind(("obstacles", obstacles_value(&data.obstacles)?))
            .bind(("actor", created_by))
            .bind(("now", now))
            .await?;

        let created: Option<FloorPlan> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create floor plan".to_string()))
    }

    /// Update a floor plan
    pub async fn update(
        &self,
        id: &RecordId,
        data: FloorPlanUpdate,
        actor: RecordId,
    ) -> RepoResult<FloorPlan> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Floor plan {} not found", id)))?;

        let name = data
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name.clone());
        if name != existing.name
            && let Some(found) = self.find_by_name(&name).await?
            && found.id != existing.id
        {
            return Err(RepoError::Duplicate(format!(
                "Floor plan '{}' already exists",
                name
            )));
        }

        // 手动构建 UPDATE 语句，避免 created_by 被序列化为字符串
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name,
                    description = $description,
                    dimensions = $dimensions,
                    status = $status,
                    last_modified_by = $actor,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("name", name))
            .bind(("description", data.description.or(existing.description)))
            .bind(("dimensions", data.dimensions.unwrap_or(existing.dimensions)))
            .bind(("status", data.status.unwrap_or(existing.status).as_str()))
            .bind(("actor", actor))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<FloorPlan>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Floor plan {} not found", id)))
    }

    /// Change status only
    pub async fn update_status(
        &self,
        id: &RecordId,
        status: FloorPlanStatus,
        actor: RecordId,
    ) -> RepoResult<FloorPlan> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = $status, last_modified_by = $actor, updated_at = $now RETURN AFTER",
            )
            .bind(("thing", id.clone()))
            .bind(("status", status.as_str()))
            .bind(("actor", actor))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<FloorPlan>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Floor plan {} not found", id)))
    }

    /// Replace the obstacle layout
    pub async fn replace_obstacles(
        &self,
        id: &RecordId,
        obstacles: Vec<Obstacle>,
        actor: RecordId,
    ) -> RepoResult<FloorPlan> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET obstacles = $obstacles, last_modified_by = $actor, updated_at = $now RETURN AFTER",
            )
            .bind(("thing", id.clone()))
            .bind(("obstacles", obstacles_value(&obstacles)?))
            .bind(("actor", actor))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<FloorPlan>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Floor plan {} not found", id)))
    }

    /// Hard delete a floor plan
    pub async fn delete(&self, id: &RecordId) -> RepoResult<bool> {
        let deleted: Option<FloorPlan> = self.base.db().delete(id.clone()).await?;
        Ok(deleted.is_some())
    }
}
