use claimant_registry::{GuardError, MemberFields, MemberStore};

use crate::support::{fields, guard_with_member, hold_lock};

// ============================================================================
// Successful updates
// ============================================================================

#[test]
fn successful_update_increments_version_by_one() {
    let (guard, member) = guard_with_member();

    let updated = guard
        .guarded_update(member.id, member.version, fields("Ada", "London"), None)
        .unwrap();

    assert_eq!(updated.version, member.version + 1);
    assert_eq!(updated.fields.city.as_deref(), Some("London"));
    assert!(!updated.is_locked);
    assert!(updated.locked_at.is_none());
    assert_eq!(updated.created_at, member.created_at);
    assert!(updated.updated_at >= member.updated_at);
}

#[test]
fn update_replaces_payload_wholesale() {
    let (guard, member) = guard_with_member();
    guard
        .guarded_update(member.id, 1, fields("Ada", "London"), None)
        .unwrap();

    // Second edit leaves city out; it must not survive from the first.
    let updated = guard
        .guarded_update(member.id, 2, MemberFields::named("Ada"), None)
        .unwrap();
    assert_eq!(updated.fields.city, None);
}

#[test]
fn update_records_last_writer() {
    let (guard, member) = guard_with_member();
    let updated = guard
        .guarded_update(
            member.id,
            1,
            fields("Ada", "Paris"),
            Some("clerk-3".to_string()),
        )
        .unwrap();
    assert_eq!(updated.last_modified_by.as_deref(), Some("clerk-3"));

    let stored = guard.store().find_by_id(member.id).unwrap().unwrap();
    assert_eq!(stored, updated);
}

// ============================================================================
// Walk-through: create → update(1) → stale update(1) → update(2)
// ============================================================================

#[test]
fn version_walk_through() {
    let (guard, member) = guard_with_member();
    assert_eq!(member.version, 1);
    assert!(!member.is_locked);

    let first = guard
        .guarded_update(member.id, 1, MemberFields::named("A"), None)
        .unwrap();
    assert_eq!(first.version, 2);

    let stale = guard
        .guarded_update(member.id, 1, MemberFields::named("B"), None)
        .unwrap_err();
    assert_eq!(
        stale,
        GuardError::StaleVersion {
            id: member.id,
            submitted: 1,
            current: 2,
        }
    );
    assert_eq!(stale.current_version(), Some(2));

    let third = guard
        .guarded_update(member.id, 2, MemberFields::named("B"), None)
        .unwrap();
    assert_eq!(third.version, 3);
    assert_eq!(third.fields.first_name, "B");
}

// ============================================================================
// Rejections leave the record untouched
// ============================================================================

#[test]
fn stale_version_leaves_record_unchanged() {
    let (guard, member) = guard_with_member();

    let err = guard
        .guarded_update(member.id, 5, fields("Mallory", "Nowhere"), None)
        .unwrap_err();

    assert!(matches!(err, GuardError::StaleVersion { current: 1, .. }));
    let stored = guard.store().find_by_id(member.id).unwrap().unwrap();
    assert_eq!(stored, member);
}

#[test]
fn locked_record_rejects_update_and_stays_locked() {
    let (guard, member) = guard_with_member();
    hold_lock(guard.store(), member.id);
    let before = guard.store().find_by_id(member.id).unwrap().unwrap();

    let err = guard
        .guarded_update(member.id, 1, fields("Mallory", "Nowhere"), None)
        .unwrap_err();

    assert_eq!(err, GuardError::Locked { id: member.id });
    assert!(err.is_conflict());
    let after = guard.store().find_by_id(member.id).unwrap().unwrap();
    assert_eq!(after, before);
    assert!(after.is_locked);
}

#[test]
fn missing_member_is_not_found() {
    let (guard, _) = guard_with_member();
    let err = guard
        .guarded_update(404, 1, MemberFields::named("Ghost"), None)
        .unwrap_err();
    assert_eq!(err, GuardError::NotFound(404));
    assert!(!err.is_conflict());
}

#[test]
fn lock_is_released_after_every_outcome() {
    let (guard, member) = guard_with_member();
    let is_locked = || {
        guard
            .store()
            .find_by_id(member.id)
            .unwrap()
            .unwrap()
            .is_locked
    };

    assert!(!is_locked());
    guard
        .guarded_update(member.id, 1, MemberFields::named("A"), None)
        .unwrap();
    assert!(!is_locked());
    guard
        .guarded_update(member.id, 1, MemberFields::named("B"), None)
        .unwrap_err();
    assert!(!is_locked());
}

// ============================================================================
// Administrative unlock
// ============================================================================

#[test]
fn force_unlock_recovers_a_stuck_record() {
    let (guard, member) = guard_with_member();
    hold_lock(guard.store(), member.id);

    let stuck = guard.store().find_by_id(member.id).unwrap().unwrap();
    assert!(stuck.locked_at.is_some());

    let unlocked = guard.force_unlock(member.id).unwrap();
    assert!(!unlocked.is_locked);
    assert!(unlocked.locked_at.is_none());
    assert_eq!(unlocked.version, 1);

    let updated = guard
        .guarded_update(member.id, 1, MemberFields::named("A"), None)
        .unwrap();
    assert_eq!(updated.version, 2);
}

#[test]
fn force_unlock_missing_member() {
    let (guard, _) = guard_with_member();
    assert_eq!(guard.force_unlock(77).unwrap_err(), GuardError::NotFound(77));
}
