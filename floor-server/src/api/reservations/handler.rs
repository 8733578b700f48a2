//! Reservation API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::{CancelRequest, ReservationCreate, ReservationStatus, ReservationUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Reservation, ReservationFilter};
use crate::db::repository::parse_record_id;
use crate::reservations::Availability;
use crate::utils::time::{date_time_to_millis, day_end_millis, day_start_millis, parse_date, parse_time};
use crate::utils::{AppResult, validate_payload};

/// GET /api/reservations 查询参数
#[derive(Debug, Deserialize)]
pub struct ReservationQuery {
    /// YYYY-MM-DD (业务时区)
    pub date: Option<String>,
    pub status: Option<ReservationStatus>,
    pub user: Option<String>,
    pub table: Option<String>,
    pub floor_plan: Option<String>,
}

/// GET /api/reservations/availability 查询参数
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub floor_plan: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub start_time: String,
    /// HH:MM
    pub end_time: String,
    pub guests: Option<i32>,
}

/// GET /api/reservations - 按条件列出预订
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<Vec<Reservation>>> {
    let tz = state.config.timezone;
    let (from, to) = match query.date.as_deref() {
        Some(date) => {
            let date = parse_date(date)?;
            (Some(day_start_millis(date, tz)), Some(day_end_millis(date, tz)))
        }
        None => (None, None),
    };

    let filter = ReservationFilter {
        from,
        to,
        status: query.status,
        user: query
            .user
            .as_deref()
            .map(|id| parse_record_id("user", id))
            .transpose()?,
        table: query
            .table
            .as_deref()
            .map(|id| parse_record_id("dining_table", id))
            .transpose()?,
        floor_plan: query
            .floor_plan
            .as_deref()
            .map(|id| parse_record_id("floor_plan", id))
            .transpose()?,
    };

    let reservations = state.reservation_engine().list(filter).await?;
    Ok(Json(reservations))
}

/// GET /api/reservations/availability - 时间窗口内的可用桌台 (公共)
pub async fn availability(
    State(state): State<ServerState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Availability>> {
    let tz = state.config.timezone;
    let date = parse_date(&query.date)?;
    let start = date_time_to_millis(date, parse_time(&query.start_time)?, tz);
    let end = date_time_to_millis(date, parse_time(&query.end_time)?, tz);

    let availability = state
        .reservation_engine()
        .availability(&query.floor_plan, start, end, query.guests)
        .await?;
    Ok(Json(availability))
}

/// GET /api/reservations/user/{user_id} - 某用户的预订 (最新优先)
pub async fn list_for_user(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state
        .reservation_engine()
        .list_for_user(&current, &user_id)
        .await?;
    Ok(Json(reservations))
}

/// GET /api/reservations/{id} - 获取单个预订
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.reservation_engine().get(&current, &id).await?;
    Ok(Json(reservation))
}

/// POST /api/reservations - 新建预订
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    validate_payload(&payload)?;
    let reservation = state.reservation_engine().create(&current, payload).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// PUT /api/reservations/{id} - 修改预订
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ReservationUpdate>,
) -> AppResult<Json<Reservation>> {
    validate_payload(&payload)?;
    let reservation = state
        .reservation_engine()
        .update(&current, &id, payload)
        .await?;
    Ok(Json(reservation))
}

/// POST /api/reservations/{id}/cancel - 取消预订
///
/// 请求体可省略；`reason` 追加到备注
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Option<Json<CancelRequest>>,
) -> AppResult<Json<Reservation>> {
    let reason = match payload {
        Some(Json(req)) => {
            validate_payload(&req)?;
            req.reason
        }
        None => None,
    };
    let reservation = state
        .reservation_engine()
        .cancel(&current, &id, reason)
        .await?;
    Ok(Json(reservation))
}

/// POST /api/reservations/{id}/confirm
pub async fn confirm(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.reservation_engine().confirm(&current, &id).await?;
    Ok(Json(reservation))
}

/// POST /api/reservations/{id}/complete
pub async fn complete(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.reservation_engine().complete(&current, &id).await?;
    Ok(Json(reservation))
}

/// POST /api/reservations/{id}/no-show
pub async fn no_show(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.reservation_engine().no_show(&current, &id).await?;
    Ok(Json(reservation))
}
