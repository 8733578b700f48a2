//! Dining Table Repository

use super::{BaseRepository, RepoError, RepoResult, new_record_id};
use crate::db::models::{DiningTable, NewDiningTable, TableFilter};
use shared::models::{DiningTableUpdate, Position, TableStatus};
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "dining_table";

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find tables matching the filter, ordered by number
    pub async fn find_all(&self, filter: TableFilter) -> RepoResult<Vec<DiningTable>> {
        let mut conditions = Vec::new();
        if filter.floor_plan.is_some() {
            conditions.push("floor_plan = $floor_plan");
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.min_capacity.is_some() {
            conditions.push("capacity >= $min_capacity");
        }

        let mut sql = String::from("SELECT * FROM dining_table");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY number");

        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query(sql)
            .bind(("floor_plan", filter.floor_plan))
            .bind(("status", filter.status.map(|s| s.as_str())))
            .bind(("min_capacity", filter.min_capacity))
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find all tables in a floor plan
    pub async fn find_by_floor_plan(&self, floor_plan: &RecordId) -> RepoResult<Vec<DiningTable>> {
        self.find_all(TableFilter {
            floor_plan: Some(floor_plan.clone()),
            ..Default::default()
        })
        .await
    }

    /// Count tables in a floor plan
    pub async fn count_by_floor_plan(&self, floor_plan: &RecordId) -> RepoResult<usize> {
        Ok(self.find_by_floor_plan(floor_plan).await?.len())
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<DiningTable>> {
        let table: Option<DiningTable> = self.base.db().select(id.clone()).await?;
        Ok(table)
    }

    /// Find several tables at once (missing ids are skipped)
    pub async fn find_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE id IN $ids ORDER BY number")
            .bind(("ids", ids.to_vec()))
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by number in floor plan
    pub async fn find_by_number(
        &self,
        floor_plan: &RecordId,
        number: i32,
    ) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE floor_plan = $floor_plan AND number = $number LIMIT 1")
            .bind(("floor_plan", floor_plan.clone()))
            .bind(("number", number))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Create a new dining table
    pub async fn create(&self, data: NewDiningTable, actor: RecordId) -> RepoResult<DiningTable> {
        // Check duplicate number in same floor plan
        if self
            .find_by_number(&data.floor_plan, data.number)
            .await?
            .is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Table number {} already exists in this floor plan",
                data.number
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE $id SET
                    number = $number,
                    capacity = $capacity,
                    shape = $shape,
                    position = $position,
                    rotation = $rotation,
                    dimensions = $dimensions,
                    status = 'free',
                    floor_plan = $floor_plan,
                    last_modified_by = $actor,
                    last_modified_at = $now
                RETURN AFTER"#,
            )
            .bind(("id", new_record_id(TABLE)))
            .bind(("number", data.number))
            .bind(("capacity", data.capacity))
            .bind(("shape", data.shape.as_str()))
            .bind(("position", data.position))
            .bind(("rotation", data.rotation))
            .bind(("dimensions", data.dimensions))
            .bind(("floor_plan", data.floor_plan))
            .bind(("actor", actor))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<DiningTable> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Create many tables in one floor plan, all or nothing
    pub async fn create_batch(
        &self,
        floor_plan: &RecordId,
        items: Vec<NewDiningTable>,
        actor: RecordId,
    ) -> RepoResult<Vec<DiningTable>> {
        let mut numbers: Vec<i32> = items.iter().map(|t| t.number).collect();
        numbers.sort_unstable();
        if let Some(w) = numbers.windows(2).find(|w| w[0] == w[1]) {
            return Err(RepoError::Duplicate(format!(
                "Table number {} appears more than once in the batch",
                w[0]
            )));
        }

        let existing = self.find_by_floor_plan(floor_plan).await?;
        if let Some(clash) = existing.iter().find(|t| numbers.binary_search(&t.number).is_ok()) {
            return Err(RepoError::Duplicate(format!(
                "Table number {} already exists in this floor plan",
                clash.number
            )));
        }

        let rows: Vec<serde_json::Value> = items
            .iter()
            .map(|t| {
                serde_json::json!({
                    "key": shared::util::snowflake_id(),
                    "number": t.number,
                    "capacity": t.capacity,
                    "shape": t.shape.as_str(),
                    "position": t.position,
                    "rotation": t.rotation,
                    "dimensions": t.dimensions,
                })
            })
            .collect();

        self.base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                FOR $row IN $rows {
                    CREATE type::thing('dining_table', $row.key) SET
                        number = $row.number,
                        capacity = $row.capacity,
                        shape = $row.shape,
                        position = $row.position,
                        rotation = $row.rotation,
                        dimensions = $row.dimensions,
                        status = 'free',
                        floor_plan = $floor_plan,
                        last_modified_by = $actor,
                        last_modified_at = $now;
                };
                COMMIT TRANSACTION;"#,
            )
            .bind(("rows", rows))
            .bind(("floor_plan", floor_plan.clone()))
            .bind(("actor", actor))
            .bind(("now", now_millis()))
            .await?
            .check()?;

        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE floor_plan = $floor_plan AND number IN $numbers ORDER BY number")
            .bind(("floor_plan", floor_plan.clone()))
            .bind(("numbers", numbers))
            .await?;
        let created: Vec<DiningTable> = result.take(0)?;
        Ok(created)
    }

    /// Update a dining table
    pub async fn update(
        &self,
        id: &RecordId,
        data: DiningTableUpdate,
        actor: RecordId,
    ) -> RepoResult<DiningTable> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))?;

        let number = data.number.unwrap_or(existing.number);
        if number != existing.number
            && let Some(found) = self.find_by_number(&existing.floor_plan, number).await?
            && found.id != existing.id
        {
            return Err(RepoError::Duplicate(format!(
                "Table number {} already exists in this floor plan",
                number
            )));
        }

        // 手动构建 UPDATE 语句，避免 floor_plan 被序列化为字符串
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    number = $number,
                    capacity = $capacity,
                    shape = $shape,
                    position = $position,
                    rotation = $rotation,
                    dimensions = $dimensions,
                    last_modified_by = $actor,
                    last_modified_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("number", number))
            .bind(("capacity", data.capacity.unwrap_or(existing.capacity)))
            .bind(("shape", data.shape.unwrap_or(existing.shape).as_str()))
            .bind(("position", data.position.unwrap_or(existing.position)))
            .bind(("rotation", data.rotation.unwrap_or(existing.rotation)))
            .bind(("dimensions", data.dimensions.unwrap_or(existing.dimensions)))
            .bind(("actor", actor))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<DiningTable>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))
    }

    /// Move a table (position + optional rotation)
    pub async fn update_position(
        &self,
        id: &RecordId,
        position: Position,
        rotation: Option<f64>,
        actor: RecordId,
    ) -> RepoResult<DiningTable> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    position = $position,
                    rotation = IF $rotation != NONE THEN $rotation ELSE rotation END,
                    last_modified_by = $actor,
                    last_modified_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("position", position))
            .bind(("rotation", rotation))
            .bind(("actor", actor))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<DiningTable>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))
    }

    /// Direct status edit
    pub async fn update_status(
        &self,
        id: &RecordId,
        status: TableStatus,
        actor: RecordId,
    ) -> RepoResult<DiningTable> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = $status, last_modified_by = $actor, last_modified_at = $now RETURN AFTER",
            )
            .bind(("thing", id.clone()))
            .bind(("status", status.as_str()))
            .bind(("actor", actor))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<DiningTable>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))
    }

    /// Hard delete a dining table
    pub async fn delete(&self, id: &RecordId) -> RepoResult<bool> {
        let deleted: Option<DiningTable> = self.base.db().delete(id.clone()).await?;
        Ok(deleted.is_some())
    }
}
