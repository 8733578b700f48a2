//! Dining Table API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::{
    DiningTableBatchCreate, DiningTableCreate, DiningTableUpdate, TableMove, TableStatus,
    TableStatusUpdate,
};
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{DiningTable, NewDiningTable, TableFilter};
use crate::db::repository::{
    DiningTableRepository, FloorPlanRepository, RepoError, parse_record_id,
};
use crate::utils::{AppError, AppResult, EmptyResult, ErrorCode, validate_payload};

const TABLE: &str = "dining_table";

/// GET /api/tables 查询参数
#[derive(Debug, Deserialize)]
pub struct TableQuery {
    pub floor_plan: Option<String>,
    pub status: Option<TableStatus>,
    pub min_capacity: Option<i32>,
}

fn table_id(id: &str) -> AppResult<RecordId> {
    Ok(parse_record_id(TABLE, id)?)
}

fn actor_id(current: &CurrentUser) -> AppResult<RecordId> {
    Ok(parse_record_id("user", &current.id)?)
}

fn map_repo_error(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::TableNumberExists, msg),
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::TableNotFound, msg),
        other => other.into(),
    }
}

/// 平面图须存在
async fn require_floor_plan(state: &ServerState, id: &str) -> AppResult<RecordId> {
    let floor_plan = parse_record_id("floor_plan", id)?;
    FloorPlanRepository::new(state.get_db())
        .find_by_id(&floor_plan)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::FloorPlanNotFound))?;
    Ok(floor_plan)
}

/// GET /api/tables - 获取桌台 (按编号排序)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TableQuery>,
) -> AppResult<Json<Vec<DiningTable>>> {
    let filter = TableFilter {
        floor_plan: query
            .floor_plan
            .as_deref()
            .map(|id| parse_record_id("floor_plan", id))
            .transpose()?,
        status: query.status,
        min_capacity: query.min_capacity,
    };
    let tables = DiningTableRepository::new(state.get_db())
        .find_all(filter)
        .await?;
    Ok(Json(tables))
}

/// GET /api/tables/{id} - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DiningTable>> {
    let id = table_id(&id)?;
    let table = DiningTableRepository::new(state.get_db())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
    Ok(Json(table))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<(StatusCode, Json<DiningTable>)> {
    validate_payload(&payload)?;
    let floor_plan = require_floor_plan(&state, &payload.floor_plan).await?;

    let table = DiningTableRepository::new(state.get_db())
        .create(
            NewDiningTable {
                number: payload.number,
                capacity: payload.capacity,
                shape: payload.shape,
                position: payload.position,
                rotation: payload.rotation,
                dimensions: payload.dimensions,
                floor_plan,
            },
            actor_id(&current)?,
        )
        .await
        .map_err(map_repo_error)?;

    tracing::info!(number = table.number, floor_plan = %table.floor_plan, "Dining table created");
    Ok((StatusCode::CREATED, Json(table)))
}

/// POST /api/tables/batch - 批量创建 (全部成功或全部失败)
pub async fn create_batch(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<DiningTableBatchCreate>,
) -> AppResult<(StatusCode, Json<Vec<DiningTable>>)> {
    validate_payload(&payload)?;
    let floor_plan = require_floor_plan(&state, &payload.floor_plan).await?;

    let items = payload
        .tables
        .into_iter()
        .map(|t| NewDiningTable {
            number: t.number,
            capacity: t.capacity,
            shape: t.shape,
            position: t.position,
            rotation: t.rotation,
            dimensions: t.dimensions,
            floor_plan: floor_plan.clone(),
        })
        .collect();

    let tables = DiningTableRepository::new(state.get_db())
        .create_batch(&floor_plan, items, actor_id(&current)?)
        .await
        .map_err(map_repo_error)?;

    tracing::info!(count = tables.len(), floor_plan = %floor_plan, "Dining tables created");
    Ok((StatusCode::CREATED, Json(tables)))
}

/// PUT /api/tables/{id} - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    validate_payload(&payload)?;
    let id = table_id(&id)?;
    let table = DiningTableRepository::new(state.get_db())
        .update(&id, payload, actor_id(&current)?)
        .await
        .map_err(map_repo_error)?;
    Ok(Json(table))
}

/// PATCH /api/tables/{id}/position - 移动桌台
pub async fn update_position(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<TableMove>,
) -> AppResult<Json<DiningTable>> {
    let id = table_id(&id)?;
    let table = DiningTableRepository::new(state.get_db())
        .update_position(&id, payload.position, payload.rotation, actor_id(&current)?)
        .await
        .map_err(map_repo_error)?;
    Ok(Json(table))
}

/// PATCH /api/tables/{id}/status - 员工直接修改桌台状态 (持桌台锁)
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<TableStatusUpdate>,
) -> AppResult<Json<DiningTable>> {
    let table = state
        .reservation_engine()
        .set_table_status(&current, &id, payload.status)
        .await?;
    Ok(Json(table))
}

/// DELETE /api/tables/{id} - 删除桌台 (存在未结束的有效预订时拒绝)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> EmptyResult {
    state
        .reservation_engine()
        .delete_table(&current, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
