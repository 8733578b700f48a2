//! Reservation engine against a real RocksDB instance

mod common;

use common::*;
use floor_server::ReservationError;
use floor_server::db::repository::DiningTableRepository;
use shared::models::{ReservationStatus, ReservationUpdate, Role, TableStatus};
use surrealdb::RecordId;

async fn table_status(env: &TestEnv, id: &str) -> TableStatus {
    let id: RecordId = id.parse().unwrap();
    DiningTableRepository::new(env.state.get_db())
        .find_by_id(&id)
        .await
        .unwrap()
        .unwrap()
        .status
}

fn id_of(reservation: &floor_server::db::models::Reservation) -> String {
    reservation.id.as_ref().unwrap().to_string()
}

#[tokio::test]
async fn test_touching_ranges_do_not_conflict() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    engine
        .create(&staff, reservation(&fp, tables.clone(), t, t + 2 * HOUR, 2))
        .await
        .unwrap();
    // [t+2h, t+4h) starts exactly when the first one ends
    engine
        .create(&staff, reservation(&fp, tables, t + 2 * HOUR, t + 4 * HOUR, 2))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_overlapping_range_conflicts() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4), (2, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let first = engine
        .create(&staff, reservation(&fp, vec![tables[0].clone()], t, t + 2 * HOUR, 2))
        .await
        .unwrap();

    let err = engine
        .create(
            &staff,
            reservation(&fp, tables.clone(), t + HOUR, t + 3 * HOUR, 4),
        )
        .await
        .unwrap_err();
    match err {
        ReservationError::Conflict(conflicting) => {
            assert_eq!(conflicting.len(), 1);
            assert_eq!(conflicting[0].id, first.id);
        }
        other => panic!("expected conflict, got {:?}", other),
    }

    // The other table alone is still bookable
    engine
        .create(
            &staff,
            reservation(&fp, vec![tables[1].clone()], t + HOUR, t + 3 * HOUR, 2),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invalid_time_range_rejected() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let t = base_time();

    let err = env
        .state
        .reservation_engine()
        .create(&staff, reservation(&fp, tables, t, t, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::InvalidTimeRange));
}

#[tokio::test]
async fn test_staff_create_is_confirmed_and_reserves_tables() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4), (2, 2)], &staff).await);
    let t = base_time();

    let mut payload = reservation(&fp, tables.clone(), t, t + 2 * HOUR, 5);
    payload.customer_info = Some(walk_in());
    let created = env
        .state
        .reservation_engine()
        .create(&staff, payload)
        .await
        .unwrap();

    assert_eq!(created.status, ReservationStatus::Confirmed);
    assert!(created.user.is_none());
    assert_eq!(created.customer_info.unwrap().name, "Jeanne Martin");
    for table in &tables {
        assert_eq!(table_status(&env, table).await, TableStatus::Reserved);
    }
}

#[tokio::test]
async fn test_staff_create_without_owner_defaults_to_staff() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let t = base_time();

    let created = env
        .state
        .reservation_engine()
        .create(&staff, reservation(&fp, tables, t, t + HOUR, 2))
        .await
        .unwrap();
    assert_eq!(created.user.unwrap().to_string(), staff.id);
}

#[tokio::test]
async fn test_user_create_is_pending_and_leaves_tables_free() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let guest = create_user(&env.state, "guest", Role::User).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let created = engine
        .create(&guest, reservation(&fp, tables.clone(), t, t + 2 * HOUR, 2))
        .await
        .unwrap();
    assert_eq!(created.status, ReservationStatus::Pending);
    assert_eq!(created.user.unwrap().to_string(), guest.id);
    assert_eq!(table_status(&env, &tables[0]).await, TableStatus::Free);

    // Pending reservations still hold the slot
    let err = engine
        .create(&staff, reservation(&fp, tables, t + HOUR, t + 2 * HOUR, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Conflict(_)));
}

#[tokio::test]
async fn test_user_cannot_book_for_someone_else() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let guest = create_user(&env.state, "guest", Role::User).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let t = base_time();

    let mut payload = reservation(&fp, tables, t, t + HOUR, 2);
    payload.user = Some(staff.id.clone());
    let err = env
        .state
        .reservation_engine()
        .create(&guest, payload)
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Forbidden(_)));
}

#[tokio::test]
async fn test_user_without_account_needs_customer_info() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let ghost = ghost_user(Role::User);
    let t = base_time();

    let err = engine
        .create(&ghost, reservation(&fp, tables.clone(), t, t + HOUR, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::CustomerRequired));

    let mut payload = reservation(&fp, tables, t, t + HOUR, 2);
    payload.customer_info = Some(walk_in());
    let created = engine.create(&ghost, payload).await.unwrap();
    assert!(created.user.is_none());
    assert_eq!(created.status, ReservationStatus::Pending);
}

#[tokio::test]
async fn test_table_from_another_floor_plan_rejected() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let main = create_floor_plan(&env.state, "Main", &staff).await;
    let terrace = create_floor_plan(&env.state, "Terrace", &staff).await;
    let terrace_tables =
        table_ids(&create_tables(&env.state, &terrace, &[(1, 4)], &staff).await);
    let t = base_time();

    let err = env
        .state
        .reservation_engine()
        .create(&staff, reservation(&main, terrace_tables, t, t + HOUR, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Validation(_)));
}

#[tokio::test]
async fn test_cancel_frees_tables_and_slot() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let manager = create_user(&env.state, "manager", Role::Manager).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let created = engine
        .create(&staff, reservation(&fp, tables.clone(), t, t + 2 * HOUR, 2))
        .await
        .unwrap();
    assert_eq!(table_status(&env, &tables[0]).await, TableStatus::Reserved);

    let cancelled = engine
        .cancel(&manager, &id_of(&created), Some("Guest called".to_string()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    assert!(
        cancelled
            .notes
            .unwrap()
            .contains("Cancellation reason: Guest called")
    );
    assert_eq!(table_status(&env, &tables[0]).await, TableStatus::Free);

    engine
        .create(&staff, reservation(&fp, tables, t, t + 2 * HOUR, 2))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cancelled_reservation_is_final() {
    let env = setup().await;
    let manager = create_user(&env.state, "manager", Role::Manager).await;
    let fp = create_floor_plan(&env.state, "Main", &manager).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &manager).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let created = engine
        .create(&manager, reservation(&fp, tables, t, t + HOUR, 2))
        .await
        .unwrap();
    let id = id_of(&created);
    engine.cancel(&manager, &id, None).await.unwrap();

    let err = engine.cancel(&manager, &id, None).await.unwrap_err();
    assert!(matches!(
        err,
        ReservationError::InvalidTransition {
            current: ReservationStatus::Cancelled,
            ..
        }
    ));
    assert!(matches!(
        engine.confirm(&manager, &id).await.unwrap_err(),
        ReservationError::InvalidTransition { .. }
    ));
    assert!(matches!(
        engine.complete(&manager, &id).await.unwrap_err(),
        ReservationError::InvalidTransition { .. }
    ));
    assert!(matches!(
        engine
            .update(
                &manager,
                &id,
                ReservationUpdate {
                    guests: Some(3),
                    ..Default::default()
                }
            )
            .await
            .unwrap_err(),
        ReservationError::InvalidTransition { .. }
    ));
}

#[tokio::test]
async fn test_complete_requires_confirmed() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let guest = create_user(&env.state, "guest", Role::User).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let pending = engine
        .create(&guest, reservation(&fp, tables.clone(), t, t + HOUR, 2))
        .await
        .unwrap();
    let id = id_of(&pending);

    let err = engine.complete(&staff, &id).await.unwrap_err();
    assert!(matches!(
        err,
        ReservationError::InvalidTransition {
            current: ReservationStatus::Pending,
            action: "complete",
        }
    ));

    let confirmed = engine.confirm(&staff, &id).await.unwrap();
    assert_eq!(confirmed.status, ReservationStatus::Confirmed);
    assert_eq!(table_status(&env, &tables[0]).await, TableStatus::Reserved);

    let completed = engine.complete(&staff, &id).await.unwrap();
    assert_eq!(completed.status, ReservationStatus::Completed);
    assert_eq!(table_status(&env, &tables[0]).await, TableStatus::Free);
}

#[tokio::test]
async fn test_no_show_frees_tables() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let created = engine
        .create(&staff, reservation(&fp, tables.clone(), t, t + HOUR, 2))
        .await
        .unwrap();
    let no_show = engine.no_show(&staff, &id_of(&created)).await.unwrap();
    assert_eq!(no_show.status, ReservationStatus::NoShow);
    assert_eq!(table_status(&env, &tables[0]).await, TableStatus::Free);
}

#[tokio::test]
async fn test_user_cannot_confirm_own_reservation() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let guest = create_user(&env.state, "guest", Role::User).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let pending = engine
        .create(&guest, reservation(&fp, tables, t, t + HOUR, 2))
        .await
        .unwrap();
    let id = id_of(&pending);

    let err = engine.confirm(&guest, &id).await.unwrap_err();
    assert!(matches!(err, ReservationError::Forbidden(_)));

    // but may cancel it
    let cancelled = engine.cancel(&guest, &id, None).await.unwrap();
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
}

#[tokio::test]
async fn test_user_edits_only_own_reservation() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let alice = create_user(&env.state, "alice", Role::User).await;
    let bob = create_user(&env.state, "bob", Role::User).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 6)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let created = engine
        .create(&alice, reservation(&fp, tables, t, t + HOUR, 2))
        .await
        .unwrap();
    let id = id_of(&created);

    let updated = engine
        .update(
            &alice,
            &id,
            ReservationUpdate {
                guests: Some(4),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.guests, 4);

    let err = engine
        .update(
            &bob,
            &id,
            ReservationUpdate {
                guests: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Forbidden(_)));

    let err = engine
        .update(
            &alice,
            &id,
            ReservationUpdate {
                status: Some(ReservationStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Forbidden(_)));
}

#[tokio::test]
async fn test_update_rechecks_overlap_and_moves_tables() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4), (2, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    engine
        .create(&staff, reservation(&fp, vec![tables[0].clone()], t, t + 2 * HOUR, 2))
        .await
        .unwrap();
    let second = engine
        .create(
            &staff,
            reservation(&fp, vec![tables[1].clone()], t, t + 2 * HOUR, 2),
        )
        .await
        .unwrap();
    let id = id_of(&second);

    // Moving onto the busy table conflicts
    let err = engine
        .update(
            &staff,
            &id,
            ReservationUpdate {
                tables: Some(vec![tables[0].clone()]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Conflict(_)));

    // Shifting its own window does not conflict with itself
    let moved = engine
        .update(
            &staff,
            &id,
            ReservationUpdate {
                start_time: Some(t + HOUR),
                end_time: Some(t + 3 * HOUR),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.start_time, t + HOUR);
    assert_eq!(moved.end_time, t + 3 * HOUR);

    // Right after the first one ends, table 1 is free to take over
    let moved = engine
        .update(
            &staff,
            &id,
            ReservationUpdate {
                start_time: Some(t + 2 * HOUR),
                end_time: Some(t + 4 * HOUR),
                tables: Some(vec![tables[0].clone()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.tables.len(), 1);
    assert_eq!(moved.tables[0].to_string(), tables[0]);
    assert_eq!(table_status(&env, &tables[0]).await, TableStatus::Reserved);
    assert_eq!(table_status(&env, &tables[1]).await, TableStatus::Free);
}

#[tokio::test]
async fn test_reopen_rejected() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let created = engine
        .create(&staff, reservation(&fp, tables, t, t + HOUR, 2))
        .await
        .unwrap();
    let err = engine
        .update(
            &staff,
            &id_of(&created),
            ReservationUpdate {
                status: Some(ReservationStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReservationError::InvalidTransition {
            action: "reopen",
            ..
        }
    ));
}

#[tokio::test]
async fn test_availability_excludes_busy_and_small_tables() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = create_tables(&env.state, &fp, &[(1, 2), (2, 4), (3, 6)], &staff).await;
    let ids = table_ids(&tables);
    let engine = env.state.reservation_engine();
    let t = base_time();

    engine
        .create(&staff, reservation(&fp, vec![ids[1].clone()], t, t + 2 * HOUR, 4))
        .await
        .unwrap();

    let availability = engine
        .availability(&fp.to_string(), t + HOUR, t + 3 * HOUR, Some(3))
        .await
        .unwrap();
    assert_eq!(availability.total_tables, 3);
    let available: Vec<i32> = availability
        .available_tables
        .iter()
        .map(|t| t.number)
        .collect();
    assert_eq!(available, vec![3]);

    // After the reservation ends table 2 is free again
    let later = engine
        .availability(&fp.to_string(), t + 2 * HOUR, t + 3 * HOUR, None)
        .await
        .unwrap();
    assert_eq!(later.available_tables.len(), 3);
}

#[tokio::test]
async fn test_availability_without_tables() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Empty", &staff).await;
    let t = base_time();

    let err = env
        .state
        .reservation_engine()
        .availability(&fp.to_string(), t, t + HOUR, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::NoTables(_)));
}

#[tokio::test]
async fn test_delete_table_blocked_by_upcoming_reservation() {
    let env = setup().await;
    let manager = create_user(&env.state, "manager", Role::Manager).await;
    let fp = create_floor_plan(&env.state, "Main", &manager).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &manager).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let created = engine
        .create(&manager, reservation(&fp, tables.clone(), t, t + HOUR, 2))
        .await
        .unwrap();

    let err = engine.delete_table(&manager, &tables[0]).await.unwrap_err();
    assert!(matches!(err, ReservationError::TableInUse(_)));

    engine
        .cancel(&manager, &id_of(&created), None)
        .await
        .unwrap();
    engine.delete_table(&manager, &tables[0]).await.unwrap();

    let err = engine.delete_table(&manager, &tables[0]).await.unwrap_err();
    assert!(matches!(err, ReservationError::TableNotFound(_)));
}

#[tokio::test]
async fn test_set_table_status() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);

    let table = env
        .state
        .reservation_engine()
        .set_table_status(&staff, &tables[0], TableStatus::Occupied)
        .await
        .unwrap();
    assert_eq!(table.status, TableStatus::Occupied);
    assert_eq!(table_status(&env, &tables[0]).await, TableStatus::Occupied);
}

#[tokio::test]
async fn test_unknown_tables_leave_no_locks_behind() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let guest = create_user(&env.state, "guest", Role::User).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let created = engine
        .create(&guest, reservation(&fp, tables, t, t + HOUR, 2))
        .await
        .unwrap();
    assert!(env.state.table_locks.is_empty());

    for i in 0..20 {
        let unknown = (0..5)
            .map(|j| format!("dining_table:missing{}_{}", i, j))
            .collect();
        let err = engine
            .update(
                &guest,
                &id_of(&created),
                ReservationUpdate {
                    tables: Some(unknown),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::TableNotFound(_)));

        let err = engine
            .set_table_status(&staff, &format!("dining_table:missing{}", i), TableStatus::Occupied)
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::TableNotFound(_)));

        let err = engine
            .delete_table(&staff, &format!("dining_table:missing{}", i))
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::TableNotFound(_)));
    }

    assert!(env.state.table_locks.is_empty());
}

#[tokio::test]
async fn test_staff_lists_reservations_of_a_user() {
    let env = setup().await;
    let staff = create_user(&env.state, "staff", Role::Staff).await;
    let guest = create_user(&env.state, "guest", Role::User).await;
    let other = create_user(&env.state, "other", Role::User).await;
    let fp = create_floor_plan(&env.state, "Main", &staff).await;
    let tables = table_ids(&create_tables(&env.state, &fp, &[(1, 4)], &staff).await);
    let engine = env.state.reservation_engine();
    let t = base_time();

    let created = engine
        .create(&guest, reservation(&fp, tables, t, t + HOUR, 2))
        .await
        .unwrap();

    // Same rule as fetching a single reservation
    engine.get(&staff, &id_of(&created)).await.unwrap();
    let listed = engine.list_for_user(&staff, &guest.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(engine.list_for_user(&guest, &guest.id).await.unwrap().len(), 1);

    let err = engine.list_for_user(&other, &guest.id).await.unwrap_err();
    assert!(matches!(err, ReservationError::Forbidden(_)));
}
