//! Dining Table Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Table occupancy status (桌台状态)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Free,
    Reserved,
    Occupied,
}

impl TableStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Free => "free",
            TableStatus::Reserved => "reserved",
            TableStatus::Occupied => "occupied",
        }
    }
}

/// Table shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableShape {
    Circle,
    #[default]
    Square,
    Rectangle,
    Oval,
}

impl TableShape {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TableShape::Circle => "circle",
            TableShape::Square => "square",
            TableShape::Rectangle => "rectangle",
            TableShape::Oval => "oval",
        }
    }
}

/// Position on the floor plan
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Table footprint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiningTableCreate {
    #[validate(range(min = 1))]
    pub number: i32,
    #[validate(range(min = 1, max = 100))]
    pub capacity: i32,
    #[serde(default)]
    pub shape: TableShape,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub dimensions: Dimensions,
    /// Floor plan reference ("floor_plan:id")
    pub floor_plan: String,
}

/// Batch create payload (all-or-nothing)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiningTableBatchCreate {
    /// Floor plan reference ("floor_plan:id")
    pub floor_plan: String,
    #[validate(length(min = 1, max = 200))]
    pub tables: Vec<DiningTableBatchItem>,
}

/// One table of a batch create
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiningTableBatchItem {
    #[validate(range(min = 1))]
    pub number: i32,
    #[validate(range(min = 1, max = 100))]
    pub capacity: i32,
    #[serde(default)]
    pub shape: TableShape,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub dimensions: Dimensions,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DiningTableUpdate {
    #[validate(range(min = 1))]
    pub number: Option<i32>,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,
    pub shape: Option<TableShape>,
    pub position: Option<Position>,
    pub rotation: Option<f64>,
    pub dimensions: Option<Dimensions>,
}

/// Move table payload (PATCH /api/tables/{id}/position)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMove {
    pub position: Position,
    pub rotation: Option<f64>,
}

/// Direct status edit payload (PATCH /api/tables/{id}/status)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatusUpdate {
    pub status: TableStatus,
}
