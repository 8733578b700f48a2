//! 桌台可用性

use std::collections::HashSet;

use serde::Serialize;
use surrealdb::RecordId;

use super::overlap::TimeRange;
use crate::db::models::{DiningTable, Reservation};

/// 可用性查询结果
#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub floor_plan: String,
    pub start_time: i64,
    pub end_time: i64,
    pub available_tables: Vec<DiningTable>,
    pub available_count: usize,
    pub total_tables: usize,
}

/// 从平面图全部桌台中去掉窗口内被占用的，再按人数过滤
///
/// `busy` 中只有与 `window` 相交的有效预订会被计入。
pub fn compute(
    floor_plan: &RecordId,
    tables: Vec<DiningTable>,
    busy: &[Reservation],
    window: TimeRange,
    guests: Option<i32>,
) -> Availability {
    let total_tables = tables.len();
    let occupied: HashSet<String> = busy
        .iter()
        .filter(|r| r.status.is_active() && window.overlaps(&TimeRange::of(r)))
        .flat_map(|r| r.tables.iter().map(|t| t.to_string()))
        .collect();

    let available_tables: Vec<DiningTable> = tables
        .into_iter()
        .filter(|t| t.id.as_ref().is_some_and(|id| !occupied.contains(&id.to_string())))
        .filter(|t| guests.is_none_or(|g| t.capacity >= g))
        .collect();

    Availability {
        floor_plan: floor_plan.to_string(),
        start_time: window.start,
        end_time: window.end,
        available_count: available_tables.len(),
        available_tables,
        total_tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ReservationStatus, TableStatus};

    const HOUR: i64 = 3_600_000;

    fn table(key: i64, capacity: i32) -> DiningTable {
        DiningTable {
            id: Some(RecordId::from_table_key("dining_table", key)),
            number: key as i32,
            capacity,
            shape: Default::default(),
            position: Default::default(),
            rotation: 0.0,
            dimensions: Default::default(),
            status: TableStatus::Free,
            floor_plan: RecordId::from_table_key("floor_plan", 1),
            last_modified_by: None,
            last_modified_at: 0,
        }
    }

    fn booking(tables: &[i64], start: i64, end: i64, status: ReservationStatus) -> Reservation {
        let staff = RecordId::from_table_key("user", 1);
        Reservation {
            id: Some(RecordId::from_table_key("reservation", start)),
            user: None,
            customer_info: None,
            start_time: start,
            end_time: end,
            tables: tables
                .iter()
                .map(|k| RecordId::from_table_key("dining_table", *k))
                .collect(),
            floor_plan: RecordId::from_table_key("floor_plan", 1),
            status,
            guests: 2,
            special_occasion: false,
            special_occasion_details: None,
            notes: None,
            created_by: staff.clone(),
            last_modified_by: staff,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn plan() -> RecordId {
        RecordId::from_table_key("floor_plan", 1)
    }

    fn numbers(a: &Availability) -> Vec<i32> {
        a.available_tables.iter().map(|t| t.number).collect()
    }

    #[test]
    fn test_busy_and_small_tables_excluded() {
        let tables = vec![table(1, 4), table(2, 2), table(3, 6), table(4, 4)];
        let busy = vec![
            booking(&[1], 18 * HOUR, 20 * HOUR, ReservationStatus::Confirmed),
            booking(&[3], 19 * HOUR, 21 * HOUR, ReservationStatus::Pending),
        ];
        let window = TimeRange::new(18 * HOUR, 20 * HOUR).unwrap();

        let result = compute(&plan(), tables, &busy, window, Some(4));
        assert_eq!(result.total_tables, 4);
        assert_eq!(numbers(&result), vec![4]);
        assert_eq!(result.available_count, 1);
        assert_eq!(result.floor_plan, "floor_plan:1");
        assert_eq!((result.start_time, result.end_time), (18 * HOUR, 20 * HOUR));
    }

    #[test]
    fn test_terminal_and_adjacent_bookings_ignored() {
        let tables = vec![table(1, 4), table(2, 4)];
        let busy = vec![
            booking(&[1], 18 * HOUR, 20 * HOUR, ReservationStatus::Cancelled),
            booking(&[2], 20 * HOUR, 22 * HOUR, ReservationStatus::Confirmed),
        ];
        let window = TimeRange::new(18 * HOUR, 20 * HOUR).unwrap();

        let result = compute(&plan(), tables, &busy, window, None);
        assert_eq!(numbers(&result), vec![1, 2]);
    }
}
