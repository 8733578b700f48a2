//! 时间冲突检测
//!
//! 所有时间区间都是半开区间 `[start, end)`：相邻预订 (一个的结束等于
//! 另一个的开始) 不冲突。冲突检测和可用性查询共用 [`TimeRange::overlaps`]。

use surrealdb::RecordId;

use super::error::{ReservationError, ReservationResult};
use crate::db::models::Reservation;
use crate::db::repository::ReservationRepository;

/// 半开时间区间 (Unix millis)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    /// `end <= start` 时返回 [`ReservationError::InvalidTimeRange`]
    pub fn new(start: i64, end: i64) -> ReservationResult<Self> {
        if end <= start {
            return Err(ReservationError::InvalidTimeRange);
        }
        Ok(Self { start, end })
    }

    pub fn of(reservation: &Reservation) -> Self {
        Self {
            start: reservation.start_time,
            end: reservation.end_time,
        }
    }

    /// `s1 < e2 && s2 < e1`
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// 冲突检测的输入
#[derive(Debug, Clone)]
pub struct OverlapQuery<'a> {
    pub tables: &'a [RecordId],
    pub range: TimeRange,
    pub exclude: Option<&'a RecordId>,
}

impl OverlapQuery<'_> {
    /// `candidate` 是否与本次请求冲突
    pub fn conflicts_with(&self, candidate: &Reservation) -> bool {
        candidate.status.is_active()
            && (self.exclude.is_none() || candidate.id.as_ref() != self.exclude)
            && candidate.tables.iter().any(|t| self.tables.contains(t))
            && self.range.overlaps(&TimeRange::of(candidate))
    }

    /// 从候选集中筛出冲突项
    pub fn conflicts(&self, candidates: Vec<Reservation>) -> Vec<Reservation> {
        candidates
            .into_iter()
            .filter(|r| self.conflicts_with(r))
            .collect()
    }
}

/// 查库并校验，存在冲突时返回全部冲突预订
///
/// 只读操作。调用方必须已持有相关桌台的锁。
pub async fn validate(
    repo: &ReservationRepository,
    query: &OverlapQuery<'_>,
) -> ReservationResult<()> {
    let candidates = repo
        .find_overlapping(
            query.tables,
            query.range.start,
            query.range.end,
            query.exclude,
        )
        .await?;

    let conflicting = query.conflicts(candidates);
    if conflicting.is_empty() {
        Ok(())
    } else {
        Err(ReservationError::Conflict(conflicting))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ReservationStatus;

    const HOUR: i64 = 3_600_000;

    fn table(key: i64) -> RecordId {
        RecordId::from_table_key("dining_table", key)
    }

    fn reservation(
        id: i64,
        tables: Vec<RecordId>,
        start: i64,
        end: i64,
        status: ReservationStatus,
    ) -> Reservation {
        let staff = RecordId::from_table_key("user", 1);
        Reservation {
            id: Some(RecordId::from_table_key("reservation", id)),
            user: None,
            customer_info: None,
            start_time: start,
            end_time: end,
            tables,
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

    #[test]
    fn test_time_range_rejects_empty_and_inverted() {
        assert!(TimeRange::new(10, 10).is_err());
        assert!(TimeRange::new(10, 5).is_err());
        assert!(TimeRange::new(10, 11).is_ok());
    }

    #[test]
    fn test_touching_ranges_do_not_overlap() {
        let a = TimeRange::new(10 * HOUR, 11 * HOUR).unwrap();
        let b = TimeRange::new(11 * HOUR, 12 * HOUR).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_partial_and_containing_ranges_overlap() {
        let a = TimeRange::new(10 * HOUR, 11 * HOUR).unwrap();
        let partial = TimeRange::new(10 * HOUR + HOUR / 2, 11 * HOUR + HOUR / 2).unwrap();
        let inside = TimeRange::new(10 * HOUR + 1, 11 * HOUR - 1).unwrap();
        let around = TimeRange::new(9 * HOUR, 12 * HOUR).unwrap();
        assert!(a.overlaps(&partial));
        assert!(a.overlaps(&inside));
        assert!(a.overlaps(&around));
        assert!(around.overlaps(&a));
    }

    #[test]
    fn test_conflicts_filter() {
        let t1 = table(1);
        let t2 = table(2);
        let tables = vec![t1.clone()];
        let query = OverlapQuery {
            tables: &tables,
            range: TimeRange::new(10 * HOUR, 11 * HOUR).unwrap(),
            exclude: None,
        };

        let candidates = vec![
            // same table, overlapping, active
            reservation(1, vec![t1.clone()], 10 * HOUR + 1, 12 * HOUR, ReservationStatus::Confirmed),
            // different table
            reservation(2, vec![t2.clone()], 10 * HOUR, 11 * HOUR, ReservationStatus::Confirmed),
            // cancelled
            reservation(3, vec![t1.clone()], 10 * HOUR, 11 * HOUR, ReservationStatus::Cancelled),
            // touching
            reservation(4, vec![t1.clone(), t2], 11 * HOUR, 12 * HOUR, ReservationStatus::Pending),
        ];

        let conflicting = query.conflicts(candidates);
        assert_eq!(conflicting.len(), 1);
        assert_eq!(
            conflicting[0].id,
            Some(RecordId::from_table_key("reservation", 1))
        );
    }

    #[test]
    fn test_conflicts_excludes_self() {
        let t1 = table(1);
        let tables = vec![t1.clone()];
        let me = RecordId::from_table_key("reservation", 7);
        let query = OverlapQuery {
            tables: &tables,
            range: TimeRange::new(10 * HOUR, 11 * HOUR).unwrap(),
            exclude: Some(&me),
        };
        let candidates = vec![reservation(
            7,
            vec![t1],
            10 * HOUR,
            11 * HOUR,
            ReservationStatus::Confirmed,
        )];
        assert!(query.conflicts(candidates).is_empty());
    }
}
