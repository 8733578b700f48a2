//! 预订授权判定
//!
//! 纯函数，基于 [`CurrentUser`] 的角色和权限表。

use crate::auth::CurrentUser;
use crate::auth::permissions::{CANCEL_RESERVATION, EDIT_RESERVATION, VIEW_RESERVATIONS};
use crate::db::models::Reservation;

/// 预订是否属于当前用户
pub fn is_self(actor: &CurrentUser, reservation: &Reservation) -> bool {
    reservation.belongs_to(&actor.id)
}

/// 可修改任意预订
pub fn can_edit(actor: &CurrentUser) -> bool {
    actor.role.is_elevated() || actor.has_permission(EDIT_RESERVATION)
}

/// 可取消该预订
pub fn can_cancel(actor: &CurrentUser, reservation: &Reservation) -> bool {
    actor.role.is_elevated()
        || (is_self(actor, reservation) && actor.has_permission(CANCEL_RESERVATION))
}

/// 可查看该预订
pub fn can_view(actor: &CurrentUser, reservation: &Reservation) -> bool {
    can_view_all(actor) || is_self(actor, reservation)
}

/// 可查看某用户名下的全部预订
pub fn can_view_user(actor: &CurrentUser, user_id: &str) -> bool {
    can_view_all(actor) || actor.id == user_id
}

fn can_view_all(actor: &CurrentUser) -> bool {
    actor.role.is_elevated() || actor.has_permission(VIEW_RESERVATIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ReservationStatus, Role};
    use surrealdb::RecordId;

    fn actor(key: i64, role: Role) -> CurrentUser {
        CurrentUser {
            id: RecordId::from_table_key("user", key).to_string(),
            username: format!("user{}", key),
            role,
            two_factor_enabled: false,
        }
    }

    fn owned_by(key: Option<i64>) -> Reservation {
        let staff = RecordId::from_table_key("user", 999);
        Reservation {
            id: Some(RecordId::from_table_key("reservation", 1)),
            user: key.map(|k| RecordId::from_table_key("user", k)),
            customer_info: None,
            start_time: 0,
            end_time: 1,
            tables: vec![RecordId::from_table_key("dining_table", 1)],
            floor_plan: RecordId::from_table_key("floor_plan", 1),
            status: ReservationStatus::Pending,
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
    fn test_is_self() {
        let me = actor(5, Role::User);
        assert!(is_self(&me, &owned_by(Some(5))));
        assert!(!is_self(&me, &owned_by(Some(6))));
        assert!(!is_self(&me, &owned_by(None)));
    }

    #[test]
    fn test_can_edit() {
        assert!(can_edit(&actor(1, Role::Admin)));
        assert!(can_edit(&actor(1, Role::Manager)));
        assert!(can_edit(&actor(1, Role::Staff)));
        assert!(!can_edit(&actor(1, Role::User)));
    }

    #[test]
    fn test_can_cancel() {
        let mine = owned_by(Some(5));
        assert!(can_cancel(&actor(5, Role::User), &mine));
        assert!(!can_cancel(&actor(6, Role::User), &mine));
        // STAFF has no cancel_reservation and is not elevated
        assert!(!can_cancel(&actor(7, Role::Staff), &mine));
        assert!(can_cancel(&actor(8, Role::Owner), &mine));
    }

    #[test]
    fn test_can_view() {
        let mine = owned_by(Some(5));
        assert!(can_view(&actor(5, Role::User), &mine));
        assert!(!can_view(&actor(6, Role::User), &mine));
        assert!(can_view(&actor(7, Role::Staff), &mine));
    }

    #[test]
    fn test_can_view_user_matches_can_view() {
        let owner = RecordId::from_table_key("user", 5).to_string();
        assert!(can_view_user(&actor(5, Role::User), &owner));
        assert!(!can_view_user(&actor(6, Role::User), &owner));
        assert!(can_view_user(&actor(7, Role::Staff), &owner));
        assert!(can_view_user(&actor(8, Role::Manager), &owner));
    }
}
