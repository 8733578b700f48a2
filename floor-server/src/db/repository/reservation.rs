//! Reservation Repository
//!
//! 预订写入与桌台状态级联在同一个事务中完成。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Reservation, ReservationFilter};
use shared::models::{CustomerInfo, ReservationStatus, TableStatus};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

fn active_statuses() -> Vec<&'static str> {
    ReservationStatus::ACTIVE.iter().map(|s| s.as_str()).collect()
}

/// 完整的预订记录 (写入用，RecordId 保持原生类型)
#[derive(Debug, Clone)]
pub struct ReservationWrite {
    pub id: RecordId,
    pub user: Option<RecordId>,
    pub customer_info: Option<CustomerInfo>,
    pub start_time: i64,
    pub end_time: i64,
    pub tables: Vec<RecordId>,
    pub floor_plan: RecordId,
    pub status: ReservationStatus,
    pub guests: i32,
    pub special_occasion: bool,
    pub special_occasion_details: Option<String>,
    pub notes: Option<String>,
    pub created_by: RecordId,
    pub last_modified_by: RecordId,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Reservation> for ReservationWrite {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r
                .id
                .clone()
                .unwrap_or_else(|| super::new_record_id("reservation")),
            user: r.user.clone(),
            customer_info: r.customer_info.clone(),
            start_time: r.start_time,
            end_time: r.end_time,
            tables: r.tables.clone(),
            floor_plan: r.floor_plan.clone(),
            status: r.status,
            guests: r.guests,
            special_occasion: r.special_occasion,
            special_occasion_details: r.special_occasion_details.clone(),
            notes: r.notes.clone(),
            created_by: r.created_by.clone(),
            last_modified_by: r.last_modified_by.clone(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// 桌台状态级联: 把 `tables` 设为 `status`
#[derive(Debug, Clone, PartialEq)]
pub struct TableCascade {
    pub tables: Vec<RecordId>,
    pub status: TableStatus,
}

#[derive(Clone, Copy)]
enum WriteMode {
    Create,
    Update,
}

#[derive(Clone)]
pub struct ReservationRepository {
    base: BaseRepository,
}

impl ReservationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find reservations matching the filter, start time ascending
    pub async fn find(&self, filter: ReservationFilter) -> RepoResult<Vec<Reservation>> {
        let mut conditions = Vec::new();
        if filter.from.is_some() {
            conditions.push("start_time >= $from");
        }
        if filter.to.is_some() {
            conditions.push("start_time < $to");
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.user.is_some() {
            conditions.push("user = $user");
        }
        if filter.table.is_some() {
            conditions.push("tables CONTAINS $table");
        }
        if filter.floor_plan.is_some() {
            conditions.push("floor_plan = $floor_plan");
        }

        let mut sql = String::from("SELECT * FROM reservation");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY start_time ASC");

        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query(sql)
            .bind(("from", filter.from))
            .bind(("to", filter.to))
            .bind(("status", filter.status.map(|s| s.as_str())))
            .bind(("user", filter.user))
            .bind(("table", filter.table))
            .bind(("floor_plan", filter.floor_plan))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// All reservations of one user, start time descending
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query("SELECT * FROM reservation WHERE user = $user ORDER BY start_time DESC")
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// Find reservation by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Reservation>> {
        let reservation: Option<Reservation> = self.base.db().select(id.clone()).await?;
        Ok(reservation)
    }

    /// Active reservations sharing a table with `tables` whose range intersects `[start, end)`
    pub async fn find_overlapping(
        &self,
        tables: &[RecordId],
        start: i64,
        end: i64,
        exclude: Option<&RecordId>,
    ) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM reservation
                WHERE status IN $active
                    AND tables CONTAINSANY $tables
                    AND start_time < $end
                    AND end_time > $start
                    AND id != $exclude
                ORDER BY start_time ASC"#,
            )
            .bind(("active", active_statuses()))
            .bind(("tables", tables.to_vec()))
            .bind(("start", start))
            .bind(("end", end))
            .bind(("exclude", exclude.cloned()))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// Active reservations of a floor plan intersecting `[start, end)`
    pub async fn find_active_in_window(
        &self,
        floor_plan: &RecordId,
        start: i64,
        end: i64,
    ) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM reservation
                WHERE floor_plan = $floor_plan
                    AND status IN $active
                    AND start_time < $end
                    AND end_time > $start"#,
            )
            .bind(("floor_plan", floor_plan.clone()))
            .bind(("active", active_statuses()))
            .bind(("start", start))
            .bind(("end", end))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// Whether an active reservation ending after `now` references the table
    pub async fn has_upcoming_for_table(&self, table: &RecordId, now: i64) -> RepoResult<bool> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM reservation
                WHERE status IN $active AND tables CONTAINS $table AND end_time > $now
                LIMIT 1"#,
            )
            .bind(("active", active_statuses()))
            .bind(("table", table.clone()))
            .bind(("now", now))
            .await?
            .take(0)?;
        Ok(!reservations.is_empty())
    }

    /// Insert a new reservation and apply the table cascades atomically
    pub async fn create(
        &self,
        data: ReservationWrite,
        cascades: &[TableCascade],
    ) -> RepoResult<Reservation> {
        self.write(WriteMode::Create, data, cascades).await
    }

    /// Overwrite an existing reservation and apply the table cascades atomically
    pub async fn update(
        &self,
        data: ReservationWrite,
        cascades: &[TableCascade],
    ) -> RepoResult<Reservation> {
        self.write(WriteMode::Update, data, cascades).await
    }

    async fn write(
        &self,
        mode: WriteMode,
        data: ReservationWrite,
        cascades: &[TableCascade],
    ) -> RepoResult<Reservation> {
        let verb = match mode {
            WriteMode::Create => "CREATE",
            WriteMode::Update => "UPDATE",
        };

        let mut sql = String::from("BEGIN TRANSACTION;\n");
        sql.push_str(verb);
        sql.push_str(
            r#" $id SET
                user = $user,
                customer_info = $customer_info,
                start_time = $start_time,
                end_time = $end_time,
                tables = $tables,
                floor_plan = $floor_plan,
                status = $status,
                guests = $guests,
                special_occasion = $special_occasion,
                special_occasion_details = $special_occasion_details,
                notes = $notes,
                created_by = $created_by,
                last_modified_by = $last_modified_by,
                created_at = $created_at,
                updated_at = $updated_at;
            "#,
        );
        for i in 0..cascades.len() {
            sql.push_str(&format!(
                "UPDATE $cascade_tables_{i} SET status = $cascade_status_{i}, last_modified_by = $last_modified_by, last_modified_at = $updated_at;\n"
            ));
        }
        sql.push_str("COMMIT TRANSACTION;");

        let id = data.id.clone();
        let customer_info = data
            .customer_info
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| RepoError::Validation(format!("Invalid customer info: {}", e)))?;

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("id", data.id))
            .bind(("user", data.user))
            .bind(("customer_info", customer_info))
            .bind(("start_time", data.start_time))
            .bind(("end_time", data.end_time))
            .bind(("tables", data.tables))
            .bind(("floor_plan", data.floor_plan))
            .bind(("status", data.status.as_str()))
            .bind(("guests", data.guests))
            .bind(("special_occasion", data.special_occasion))
            .bind(("special_occasion_details", data.special_occasion_details))
            .bind(("notes", data.notes))
            .bind(("created_by", data.created_by))
            .bind(("last_modified_by", data.last_modified_by))
            .bind(("created_at", data.created_at))
            .bind(("updated_at", data.updated_at));
        for (i, cascade) in cascades.iter().enumerate() {
            query = query
                .bind((format!("cascade_tables_{i}"), cascade.tables.clone()))
                .bind((format!("cascade_status_{i}"), cascade.status.as_str()));
        }
        query.await?.check()?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepoError::Database(format!("Reservation {} missing after write", id)))
    }
}
