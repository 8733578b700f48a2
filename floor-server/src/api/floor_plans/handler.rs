//! Floor Plan API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::{
    FloorPlanCreate, FloorPlanStatus, FloorPlanStatusUpdate, FloorPlanUpdate, Obstacle,
    ObstaclesUpdate,
};
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{FloorPlan, FloorPlanDetail};
use crate::db::repository::{
    DiningTableRepository, FloorPlanRepository, RepoError, parse_record_id,
};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, EmptyResult, ErrorCode, validate_payload};

const TABLE: &str = "floor_plan";

#[derive(Debug, Deserialize)]
pub struct FloorPlanQuery {
    pub status: Option<FloorPlanStatus>,
}

fn plan_id(id: &str) -> AppResult<RecordId> {
    Ok(parse_record_id(TABLE, id)?)
}

fn actor_id(current: &CurrentUser) -> AppResult<RecordId> {
    Ok(parse_record_id("user", &current.id)?)
}

async fn load(repo: &FloorPlanRepository, id: &RecordId) -> AppResult<FloorPlan> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::FloorPlanNotFound))
}

fn check_obstacles(obstacles: &[Obstacle]) -> AppResult<()> {
    for obstacle in obstacles {
        validate_required_text(&obstacle.color, "color", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&obstacle.label, "label", MAX_SHORT_TEXT_LEN)?;
    }
    Ok(())
}

fn map_repo_error(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::FloorPlanNameExists, msg),
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::FloorPlanNotFound, msg),
        other => other.into(),
    }
}

/// GET /api/floor-plans - 获取平面图 (按名称排序，可按状态过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<FloorPlanQuery>,
) -> AppResult<Json<Vec<FloorPlan>>> {
    let plans = FloorPlanRepository::new(state.get_db())
        .find_all(query.status)
        .await?;
    Ok(Json(plans))
}

/// GET /api/floor-plans/{id} - 平面图详情 (含桌台)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<FloorPlanDetail>> {
    let id = plan_id(&id)?;
    let floor_plan = load(&FloorPlanRepository::new(state.get_db()), &id).await?;
    let tables = DiningTableRepository::new(state.get_db())
        .find_by_floor_plan(&id)
        .await?;
    Ok(Json(FloorPlanDetail { floor_plan, tables }))
}

/// POST /api/floor-plans - 创建平面图
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<FloorPlanCreate>,
) -> AppResult<(StatusCode, Json<FloorPlan>)> {
    validate_payload(&payload)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    check_obstacles(&payload.obstacles)?;

    let plan = FloorPlanRepository::new(state.get_db())
        .create(payload, actor_id(&current)?)
        .await
        .map_err(map_repo_error)?;

    tracing::info!(floor_plan_id = %plan.id.as_ref().map(|id| id.to_string()).unwrap_or_default(), name = %plan.name, "Floor plan created");
    Ok((StatusCode::CREATED, Json(plan)))
}

/// PUT /api/floor-plans/{id} - 修改平面图 (创建者、ADMIN 或 OWNER)
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<FloorPlanUpdate>,
) -> AppResult<Json<FloorPlan>> {
    validate_payload(&payload)?;
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(dimensions) = &payload.dimensions {
        validate_payload(dimensions)?;
    }

    let id = plan_id(&id)?;
    let repo = FloorPlanRepository::new(state.get_db());
    let existing = load(&repo, &id).await?;
    if !existing.can_be_modified_by(&current.id, current.role) {
        return Err(AppError::forbidden(
            "Only the creator, an ADMIN or an OWNER can modify this floor plan",
        ));
    }

    let plan = repo
        .update(&id, payload, actor_id(&current)?)
        .await
        .map_err(map_repo_error)?;
    tracing::info!(floor_plan_id = %id, actor = %current.id, "Floor plan updated");
    Ok(Json(plan))
}

/// PATCH /api/floor-plans/{id}/status - 修改状态
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<FloorPlanStatusUpdate>,
) -> AppResult<Json<FloorPlan>> {
    let id = plan_id(&id)?;
    let repo = FloorPlanRepository::new(state.get_db());
    load(&repo, &id).await?;

    let plan = repo
        .update_status(&id, payload.status, actor_id(&current)?)
        .await
        .map_err(map_repo_error)?;
    tracing::info!(floor_plan_id = %id, status = payload.status.as_str(), "Floor plan status changed");
    Ok(Json(plan))
}

/// PUT /api/floor-plans/{id}/obstacles - 替换障碍物
pub async fn replace_obstacles(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ObstaclesUpdate>,
) -> AppResult<Json<FloorPlan>> {
    check_obstacles(&payload.obstacles)?;

    let id = plan_id(&id)?;
    let repo = FloorPlanRepository::new(state.get_db());
    load(&repo, &id).await?;

    let plan = repo
        .replace_obstacles(&id, payload.obstacles, actor_id(&current)?)
        .await
        .map_err(map_repo_error)?;
    Ok(Json(plan))
}

/// DELETE /api/floor-plans/{id} - 删除平面图 (仍有桌台时拒绝)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> EmptyResult {
    let id = plan_id(&id)?;
    let repo = FloorPlanRepository::new(state.get_db());
    load(&repo, &id).await?;

    let tables = DiningTableRepository::new(state.get_db())
        .count_by_floor_plan(&id)
        .await?;
    if tables > 0 {
        return Err(AppError::with_message(
            ErrorCode::FloorPlanHasTables,
            format!("Floor plan still has {} tables", tables),
        ));
    }

    repo.delete(&id).await?;
    tracing::info!(floor_plan_id = %id, actor = %current.id, "Floor plan deleted");
    Ok(StatusCode::NO_CONTENT)
}
