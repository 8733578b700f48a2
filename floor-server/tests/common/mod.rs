//! Shared fixtures for integration tests
//!
//! Each test gets its own RocksDB directory under a `TempDir`.

#![allow(dead_code)]

use floor_server::auth::password::hash_password;
use floor_server::db::models::{DiningTable, NewDiningTable, NewUser};
use floor_server::db::repository::{DiningTableRepository, FloorPlanRepository, UserRepository};
use floor_server::{Config, CurrentUser, ServerState};
use shared::models::{
    CustomerInfo, Dimensions, FloorPlanCreate, FloorPlanStatus, PlanDimensions, Position,
    ReservationCreate, Role, TableShape,
};
use surrealdb::RecordId;
use tempfile::TempDir;

pub const HOUR: i64 = 3_600_000;

pub struct TestEnv {
    // Dropped last: the database lives inside
    pub _dir: TempDir,
    pub state: ServerState,
}

pub async fn setup() -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    config.require_two_factor = false;
    let state = ServerState::initialize(&config).await.unwrap();
    TestEnv { _dir: dir, state }
}

/// Tomorrow, aligned to the hour
pub fn base_time() -> i64 {
    let now = shared::util::now_millis();
    (now / HOUR + 24) * HOUR
}

pub async fn create_user(state: &ServerState, username: &str, role: Role) -> CurrentUser {
    create_user_with_password(state, username, role, "password123").await
}

pub async fn create_user_with_password(
    state: &ServerState,
    username: &str,
    role: Role,
    password: &str,
) -> CurrentUser {
    let user = UserRepository::new(state.get_db())
        .create(NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            hash_pass: hash_password(password).unwrap(),
            first_name: None,
            last_name: None,
            phone: None,
            role,
        })
        .await
        .unwrap();

    CurrentUser {
        id: user.id_string(),
        username: user.username,
        role,
        two_factor_enabled: false,
    }
}

/// Token-only identity with no account behind it
pub fn ghost_user(role: Role) -> CurrentUser {
    CurrentUser {
        id: format!("user:{}", shared::util::snowflake_id()),
        username: "ghost".to_string(),
        role,
        two_factor_enabled: false,
    }
}

pub async fn create_floor_plan(state: &ServerState, name: &str, actor: &CurrentUser) -> RecordId {
    let plan = FloorPlanRepository::new(state.get_db())
        .create(
            FloorPlanCreate {
                name: name.to_string(),
                description: None,
                dimensions: PlanDimensions {
                    width: 20.0,
                    height: 10.0,
                    unit: "meters".to_string(),
                },
                status: FloorPlanStatus::Active,
                obstacles: Vec::new(),
            },
            actor.id.parse().unwrap(),
        )
        .await
        .unwrap();
    plan.id.unwrap()
}

/// Creates tables `(number, capacity)` on the floor plan
pub async fn create_tables(
    state: &ServerState,
    floor_plan: &RecordId,
    specs: &[(i32, i32)],
    actor: &CurrentUser,
) -> Vec<DiningTable> {
    let items = specs
        .iter()
        .map(|&(number, capacity)| NewDiningTable {
            number,
            capacity,
            shape: TableShape::Square,
            position: Position {
                x: number as f64,
                y: 1.0,
            },
            rotation: 0.0,
            dimensions: Dimensions::default(),
            floor_plan: floor_plan.clone(),
        })
        .collect();

    DiningTableRepository::new(state.get_db())
        .create_batch(floor_plan, items, actor.id.parse().unwrap())
        .await
        .unwrap()
}

pub fn table_ids(tables: &[DiningTable]) -> Vec<String> {
    tables
        .iter()
        .map(|t| t.id.as_ref().unwrap().to_string())
        .collect()
}

pub fn reservation(
    floor_plan: &RecordId,
    tables: Vec<String>,
    start_time: i64,
    end_time: i64,
    guests: i32,
) -> ReservationCreate {
    ReservationCreate {
        user: None,
        customer_info: None,
        start_time,
        end_time,
        tables,
        floor_plan: floor_plan.to_string(),
        guests,
        special_occasion: false,
        special_occasion_details: None,
        notes: None,
    }
}

pub fn walk_in() -> CustomerInfo {
    CustomerInfo {
        name: "Jeanne Martin".to_string(),
        email: "jeanne@example.com".to_string(),
        phone: "0601020304".to_string(),
    }
}
