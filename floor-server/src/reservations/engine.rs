//! 预订引擎
//!
//! 所有写操作遵循同一流程：
//!
//! 1. 锁定涉及的桌台 ([`TableLocks`])；加锁前先排除不存在的桌台
//! 2. 锁内重新读取预订与桌台，校验状态与权限
//! 3. 冲突检测 ([`overlap::validate`])
//! 4. 预订写入 + 桌台状态级联 (同一事务)

use std::collections::HashSet;
use std::sync::Arc;

use shared::models::{
    CustomerInfo, ReservationCreate, ReservationStatus, ReservationUpdate, TableStatus,
};
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use validator::Validate;

use super::availability::{self, Availability};
use super::error::{ReservationError, ReservationResult};
use super::locks::{TableLockGuard, TableLocks};
use super::overlap::{self, OverlapQuery, TimeRange};
use super::policy;
use super::state_machine::{self, ReservationAction};
use crate::auth::CurrentUser;
use crate::db::models::{DiningTable, Reservation, ReservationFilter};
use crate::db::repository::{
    DiningTableRepository, FloorPlanRepository, ReservationRepository, ReservationWrite,
    TableCascade, UserRepository, new_record_id, parse_record_id,
};
use crate::utils::error::validation_message;

const RESERVATION: &str = "reservation";
const DINING_TABLE: &str = "dining_table";
const FLOOR_PLAN: &str = "floor_plan";
const USER: &str = "user";

fn parse_id(table: &str, id: &str) -> ReservationResult<RecordId> {
    parse_record_id(table, id)
        .map_err(|_| ReservationError::Validation(format!("Invalid {} id: {}", table, id)))
}

fn validate_payload<T: Validate>(payload: &T) -> ReservationResult<()> {
    payload
        .validate()
        .map_err(|e| ReservationError::Validation(validation_message(&e)))
}

/// 去重并保持原有顺序
fn dedup_ids(ids: impl IntoIterator<Item = RecordId>) -> Vec<RecordId> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.to_string()))
        .collect()
}

/// `a` 中不在 `b` 里的桌台
fn difference(a: &[RecordId], b: &[RecordId]) -> Vec<RecordId> {
    a.iter().filter(|t| !b.contains(t)).cloned().collect()
}

fn append_note(notes: Option<String>, line: String) -> Option<String> {
    match notes {
        Some(existing) if !existing.trim().is_empty() => Some(format!("{}\n{}", existing, line)),
        _ => Some(line),
    }
}

/// 预订引擎 - 冲突检测、状态流转与桌台级联
#[derive(Clone)]
pub struct ReservationEngine {
    reservations: ReservationRepository,
    tables: DiningTableRepository,
    floor_plans: FloorPlanRepository,
    users: UserRepository,
    locks: Arc<TableLocks>,
}

impl ReservationEngine {
    pub fn new(db: Surreal<Db>, locks: Arc<TableLocks>) -> Self {
        Self {
            reservations: ReservationRepository::new(db.clone()),
            tables: DiningTableRepository::new(db.clone()),
            floor_plans: FloorPlanRepository::new(db.clone()),
            users: UserRepository::new(db),
            locks,
        }
    }

    // ========== Queries ==========

    /// 按条件列出预订 (start_time 升序)
    pub async fn list(&self, filter: ReservationFilter) -> ReservationResult<Vec<Reservation>> {
        Ok(self.reservations.find(filter).await?)
    }

    /// 某用户的全部预订 (start_time 降序)
    ///
    /// 与 [`get`](Self::get) 同一规则: 本人或有 view_reservations 者。
    pub async fn list_for_user(
        &self,
        actor: &CurrentUser,
        user_id: &str,
    ) -> ReservationResult<Vec<Reservation>> {
        let user = parse_id(USER, user_id)?;
        if !policy::can_view_user(actor, &user.to_string()) {
            return Err(ReservationError::Forbidden(
                "You can only view your own reservations".to_string(),
            ));
        }
        Ok(self.reservations.find_by_user(&user).await?)
    }

    /// 获取单个预订
    pub async fn get(&self, actor: &CurrentUser, id: &str) -> ReservationResult<Reservation> {
        let rid = parse_id(RESERVATION, id)?;
        let reservation = self.load(&rid).await?;
        if !policy::can_view(actor, &reservation) {
            return Err(ReservationError::Forbidden(
                "You are not allowed to view this reservation".to_string(),
            ));
        }
        Ok(reservation)
    }

    /// 平面图在时间窗口内的可用桌台
    pub async fn availability(
        &self,
        floor_plan: &str,
        start_time: i64,
        end_time: i64,
        guests: Option<i32>,
    ) -> ReservationResult<Availability> {
        let window = TimeRange::new(start_time, end_time)?;
        if guests.is_some_and(|g| g < 1) {
            return Err(ReservationError::Validation(
                "guests must be at least 1".to_string(),
            ));
        }

        let fp = parse_id(FLOOR_PLAN, floor_plan)?;
        if self.floor_plans.find_by_id(&fp).await?.is_none() {
            return Err(ReservationError::FloorPlanNotFound(fp.to_string()));
        }

        let tables = self.tables.find_by_floor_plan(&fp).await?;
        if tables.is_empty() {
            return Err(ReservationError::NoTables(fp.to_string()));
        }

        let busy = self
            .reservations
            .find_active_in_window(&fp, window.start, window.end)
            .await?;
        Ok(availability::compute(&fp, tables, &busy, window, guests))
    }

    // ========== Commands ==========

    /// 新建预订
    ///
    /// 自助用户 (USER) 只能为自己预订，初始状态 pending；
    /// 员工可为任意用户或散客预订，初始状态 confirmed 并锁定桌台。
    pub async fn create(
        &self,
        actor: &CurrentUser,
        payload: ReservationCreate,
    ) -> ReservationResult<Reservation> {
        validate_payload(&payload)?;
        let range = TimeRange::new(payload.start_time, payload.end_time)?;
        let actor_id = parse_id(USER, &actor.id)?;

        let floor_plan = parse_id(FLOOR_PLAN, &payload.floor_plan)?;
        if self.floor_plans.find_by_id(&floor_plan).await?.is_none() {
            return Err(ReservationError::FloorPlanNotFound(floor_plan.to_string()));
        }

        let table_ids = payload
            .tables
            .iter()
            .map(|t| parse_id(DINING_TABLE, t))
            .collect::<ReservationResult<Vec<_>>>()?;
        let tables = dedup_ids(table_ids);
        self.check_tables(&tables, &floor_plan).await?;

        let (user, customer_info) = self.resolve_owner(actor, &actor_id, &payload).await?;
        let status = state_machine::initial_status(actor.role);

        let _guard = self.locks.acquire(&tables).await;
        // 加锁前的桌台可能已被删除
        self.check_tables(&tables, &floor_plan).await?;

        overlap::validate(
            &self.reservations,
            &OverlapQuery {
                tables: &tables,
                range,
                exclude: None,
            },
        )
        .await?;

        let now = now_millis();
        let write = ReservationWrite {
            id: new_record_id(RESERVATION),
            user,
            customer_info,
            start_time: range.start,
            end_time: range.end,
            tables: tables.clone(),
            floor_plan,
            status,
            guests: payload.guests,
            special_occasion: payload.special_occasion,
            special_occasion_details: payload.special_occasion_details,
            notes: payload.notes,
            created_by: actor_id.clone(),
            last_modified_by: actor_id,
            created_at: now,
            updated_at: now,
        };

        let cascades: Vec<TableCascade> = state_machine::cascade_for(status)
            .map(|status| TableCascade {
                tables: tables.clone(),
                status,
            })
            .into_iter()
            .collect();

        let created = self.reservations.create(write, &cascades).await?;
        tracing::info!(
            reservation_id = %created.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            status = %created.status,
            tables = created.tables.len(),
            actor = %actor.id,
            "Reservation created"
        );
        Ok(created)
    }

    /// 修改预订
    ///
    /// 本人或有编辑权限者可改；修改 status 需要编辑权限。
    /// 终态预订不可修改。
    pub async fn update(
        &self,
        actor: &CurrentUser,
        id: &str,
        payload: ReservationUpdate,
    ) -> ReservationResult<Reservation> {
        validate_payload(&payload)?;
        let rid = parse_id(RESERVATION, id)?;
        let actor_id = parse_id(USER, &actor.id)?;
        let touches_schedule = payload.touches_schedule();

        let requested_tables = payload
            .tables
            .as_ref()
            .map(|tables| {
                tables
                    .iter()
                    .map(|t| parse_id(DINING_TABLE, t))
                    .collect::<ReservationResult<Vec<_>>>()
                    .map(dedup_ids)
            })
            .transpose()?;

        let existing = self.load(&rid).await?;
        self.authorize_update(actor, &existing, &payload)?;
        if let Some(tables) = &requested_tables {
            self.check_tables(tables, &existing.floor_plan).await?;
        }

        let extra = requested_tables.clone().unwrap_or_default();
        let (_guard, current) = self.lock_reservation(&rid, existing, &extra).await?;
        self.authorize_update(actor, &current, &payload)?;

        if current.status.is_terminal() {
            return Err(ReservationError::InvalidTransition {
                current: current.status,
                action: "edit",
            });
        }

        let range = TimeRange::new(
            payload.start_time.unwrap_or(current.start_time),
            payload.end_time.unwrap_or(current.end_time),
        )?;

        let new_tables = match requested_tables {
            Some(tables) => {
                self.check_tables(&tables, &current.floor_plan).await?;
                tables
            }
            None => current.tables.clone(),
        };

        let customer_info = match payload.customer_info {
            Some(_) if current.user.is_some() => {
                return Err(ReservationError::Validation(
                    "Reservation is linked to a user account, customer_info cannot be set"
                        .to_string(),
                ));
            }
            Some(info) => {
                validate_payload(&info)?;
                Some(info)
            }
            None => current.customer_info.clone(),
        };

        let new_status = match payload.status {
            Some(target) if target != current.status => {
                let action = ReservationAction::for_target(target).ok_or(
                    ReservationError::InvalidTransition {
                        current: current.status,
                        action: "reopen",
                    },
                )?;
                state_machine::transition(current.status, action)?
            }
            _ => current.status,
        };
        let status_changed = new_status != current.status;

        if touches_schedule && new_status.is_active() {
            overlap::validate(
                &self.reservations,
                &OverlapQuery {
                    tables: &new_tables,
                    range,
                    exclude: Some(&rid),
                },
            )
            .await?;
        }

        let cascades = if status_changed || touches_schedule {
            Self::update_cascades(&current.tables, &new_tables, new_status)
        } else {
            Vec::new()
        };

        let mut write = ReservationWrite::from(&current);
        write.start_time = range.start;
        write.end_time = range.end;
        write.tables = new_tables;
        write.status = new_status;
        write.customer_info = customer_info;
        write.guests = payload.guests.unwrap_or(current.guests);
        write.special_occasion = payload.special_occasion.unwrap_or(current.special_occasion);
        write.special_occasion_details = payload
            .special_occasion_details
            .or(current.special_occasion_details.clone());
        write.notes = payload.notes.or(current.notes.clone());
        write.last_modified_by = actor_id;
        write.updated_at = now_millis();

        let updated = self.reservations.update(write, &cascades).await?;
        tracing::info!(
            reservation_id = %rid,
            status = %updated.status,
            actor = %actor.id,
            "Reservation updated"
        );
        Ok(updated)
    }

    /// 取消预订，`reason` 追加到备注
    pub async fn cancel(
        &self,
        actor: &CurrentUser,
        id: &str,
        reason: Option<String>,
    ) -> ReservationResult<Reservation> {
        let note = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .map(|r| format!("Cancellation reason: {}", r));
        self.apply_action(actor, id, ReservationAction::Cancel, note)
            .await
    }

    /// pending → confirmed
    pub async fn confirm(&self, actor: &CurrentUser, id: &str) -> ReservationResult<Reservation> {
        self.apply_action(actor, id, ReservationAction::Confirm, None)
            .await
    }

    /// confirmed → completed
    pub async fn complete(&self, actor: &CurrentUser, id: &str) -> ReservationResult<Reservation> {
        self.apply_action(actor, id, ReservationAction::Complete, None)
            .await
    }

    /// confirmed → no-show
    pub async fn no_show(&self, actor: &CurrentUser, id: &str) -> ReservationResult<Reservation> {
        self.apply_action(actor, id, ReservationAction::NoShow, None)
            .await
    }

    // ========== Table operations under lock ==========

    /// 员工直接修改桌台状态
    pub async fn set_table_status(
        &self,
        actor: &CurrentUser,
        table_id: &str,
        status: TableStatus,
    ) -> ReservationResult<DiningTable> {
        let tid = parse_id(DINING_TABLE, table_id)?;
        let actor_id = parse_id(USER, &actor.id)?;
        self.ensure_table(&tid).await?;

        let _guard = self.locks.acquire(std::slice::from_ref(&tid)).await;
        self.ensure_table(&tid).await?;
        let table = self.tables.update_status(&tid, status, actor_id).await?;
        tracing::info!(table_id = %tid, status = status.as_str(), actor = %actor.id, "Table status changed");
        Ok(table)
    }

    /// 删除桌台；存在未结束的有效预订时拒绝
    pub async fn delete_table(&self, actor: &CurrentUser, table_id: &str) -> ReservationResult<()> {
        let tid = parse_id(DINING_TABLE, table_id)?;
        self.ensure_table(&tid).await?;

        let _guard = self.locks.acquire(std::slice::from_ref(&tid)).await;
        self.ensure_table(&tid).await?;
        if self
            .reservations
            .has_upcoming_for_table(&tid, now_millis())
            .await?
        {
            return Err(ReservationError::TableInUse(tid.to_string()));
        }
        self.tables.delete(&tid).await?;
        tracing::info!(table_id = %tid, actor = %actor.id, "Table deleted");
        Ok(())
    }

    // ========== Internals ==========

    async fn load(&self, id: &RecordId) -> ReservationResult<Reservation> {
        self.reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ReservationError::ReservationNotFound(id.to_string()))
    }

    async fn ensure_table(&self, id: &RecordId) -> ReservationResult<()> {
        match self.tables.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(ReservationError::TableNotFound(id.to_string())),
        }
    }

    /// 锁定预订当前的桌台 (以及 `extra`)，并在锁内重新读取
    ///
    /// 读取到的桌台若已不在锁定集合内 (并发修改)，换用新集合重试。
    async fn lock_reservation(
        &self,
        id: &RecordId,
        mut snapshot: Reservation,
        extra: &[RecordId],
    ) -> ReservationResult<(TableLockGuard, Reservation)> {
        loop {
            let wanted = dedup_ids(snapshot.tables.iter().chain(extra.iter()).cloned());
            let guard = self.locks.acquire(&wanted).await;
            let current = self.load(id).await?;
            if guard.covers(&current.tables) {
                return Ok((guard, current));
            }
            tracing::debug!(reservation_id = %id, "Reservation tables changed while locking, retrying");
            snapshot = current;
        }
    }

    async fn apply_action(
        &self,
        actor: &CurrentUser,
        id: &str,
        action: ReservationAction,
        note: Option<String>,
    ) -> ReservationResult<Reservation> {
        let rid = parse_id(RESERVATION, id)?;
        let actor_id = parse_id(USER, &actor.id)?;

        let existing = self.load(&rid).await?;
        let (_guard, current) = self.lock_reservation(&rid, existing, &[]).await?;

        let allowed = match action {
            ReservationAction::Cancel => policy::can_cancel(actor, &current),
            _ => policy::can_edit(actor),
        };
        if !allowed {
            return Err(ReservationError::Forbidden(format!(
                "You are not allowed to {} this reservation",
                action
            )));
        }

        let new_status = state_machine::transition(current.status, action)?;

        let cascades: Vec<TableCascade> = state_machine::cascade_for(new_status)
            .map(|status| TableCascade {
                tables: current.tables.clone(),
                status,
            })
            .into_iter()
            .collect();

        let mut write = ReservationWrite::from(&current);
        write.status = new_status;
        if let Some(note) = note {
            write.notes = append_note(write.notes, note);
        }
        write.last_modified_by = actor_id;
        write.updated_at = now_millis();

        let updated = self.reservations.update(write, &cascades).await?;
        tracing::info!(
            reservation_id = %rid,
            from = %current.status,
            to = %updated.status,
            actor = %actor.id,
            "Reservation {}",
            action
        );
        Ok(updated)
    }

    fn authorize_update(
        &self,
        actor: &CurrentUser,
        reservation: &Reservation,
        payload: &ReservationUpdate,
    ) -> ReservationResult<()> {
        let can_edit = policy::can_edit(actor);
        if !can_edit && !policy::is_self(actor, reservation) {
            return Err(ReservationError::Forbidden(
                "You are not allowed to edit this reservation".to_string(),
            ));
        }
        if payload.status.is_some() && !can_edit {
            return Err(ReservationError::Forbidden(
                "Changing the status requires edit_reservation".to_string(),
            ));
        }
        Ok(())
    }

    /// 桌台须存在且属于该平面图
    async fn check_tables(
        &self,
        tables: &[RecordId],
        floor_plan: &RecordId,
    ) -> ReservationResult<()> {
        let found = self.tables.find_by_ids(tables).await?;
        for id in tables {
            let table = found
                .iter()
                .find(|t| t.id.as_ref() == Some(id))
                .ok_or_else(|| ReservationError::TableNotFound(id.to_string()))?;
            if &table.floor_plan != floor_plan {
                return Err(ReservationError::Validation(format!(
                    "Table {} does not belong to floor plan {}",
                    id, floor_plan
                )));
            }
        }
        Ok(())
    }

    /// 决定预订归属: 用户账号或散客信息，二选一
    async fn resolve_owner(
        &self,
        actor: &CurrentUser,
        actor_id: &RecordId,
        payload: &ReservationCreate,
    ) -> ReservationResult<(Option<RecordId>, Option<CustomerInfo>)> {
        if actor.role.is_customer() {
            if let Some(user) = &payload.user
                && user != &actor.id
            {
                return Err(ReservationError::Forbidden(
                    "You can only create reservations for yourself".to_string(),
                ));
            }
            if self.users.find_by_id(actor_id).await?.is_some() {
                return Ok((Some(actor_id.clone()), None));
            }
            return match &payload.customer_info {
                Some(info) => {
                    validate_payload(info)?;
                    Ok((None, Some(info.clone())))
                }
                None => Err(ReservationError::CustomerRequired),
            };
        }

        if let Some(user) = &payload.user {
            let uid = parse_id(USER, user)?;
            if self.users.find_by_id(&uid).await?.is_none() {
                return Err(ReservationError::UserNotFound(uid.to_string()));
            }
            return Ok((Some(uid), None));
        }
        if let Some(info) = &payload.customer_info {
            validate_payload(info)?;
            return Ok((None, Some(info.clone())));
        }
        Ok((Some(actor_id.clone()), None))
    }

    /// 修改后的级联:
    /// - confirmed: 新桌台 reserved，被移除的桌台 free
    /// - 终态: 新旧桌台全部 free
    /// - pending: 无
    fn update_cascades(
        old_tables: &[RecordId],
        new_tables: &[RecordId],
        status: ReservationStatus,
    ) -> Vec<TableCascade> {
        let dropped = difference(old_tables, new_tables);
        match state_machine::cascade_for(status) {
            Some(TableStatus::Free) => vec![TableCascade {
                tables: dedup_ids(new_tables.iter().chain(dropped.iter()).cloned()),
                status: TableStatus::Free,
            }],
            Some(reserved) => {
                let mut cascades = vec![TableCascade {
                    tables: new_tables.to_vec(),
                    status: reserved,
                }];
                if !dropped.is_empty() {
                    cascades.push(TableCascade {
                        tables: dropped,
                        status: TableStatus::Free,
                    });
                }
                cascades
            }
            None => Vec::new(),
        }
    }
}
