//! Floor Plan Model

use super::dining_table::{Dimensions, Position};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Floor plan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloorPlanStatus {
    Active,
    Inactive,
    #[default]
    Draft,
}

impl FloorPlanStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FloorPlanStatus::Active => "active",
            FloorPlanStatus::Inactive => "inactive",
            FloorPlanStatus::Draft => "draft",
        }
    }
}

/// Obstacle kind (墙、柱子、门...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Wall,
    Pillar,
    Door,
    Window,
    Bar,
    Service,
    Stairs,
    Other,
}

/// Fixed element of the room layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    #[serde(rename = "type")]
    pub kind: ObstacleKind,
    pub position: Position,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_obstacle_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

fn default_obstacle_color() -> String {
    "#808080".to_string()
}

/// Room size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PlanDimensions {
    #[validate(range(min = 1.0))]
    pub width: f64,
    #[validate(range(min = 1.0))]
    pub height: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_unit() -> String {
    "meters".to_string()
}

/// Create floor plan payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FloorPlanCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(nested)]
    pub dimensions: PlanDimensions,
    #[serde(default)]
    pub status: FloorPlanStatus,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

/// Update floor plan payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FloorPlanUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub dimensions: Option<PlanDimensions>,
    pub status: Option<FloorPlanStatus>,
}

/// PATCH /api/floor-plans/{id}/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorPlanStatusUpdate {
    pub status: FloorPlanStatus,
}

/// PUT /api/floor-plans/{id}/obstacles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstaclesUpdate {
    pub obstacles: Vec<Obstacle>,
}
