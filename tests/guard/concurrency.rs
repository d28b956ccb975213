use std::sync::{Arc, Barrier};
use std::thread;

use chrono::Utc;
use claimant_registry::{
    ConcurrencyGuard, GuardError, InMemoryMemberStore, MemberFields, MemberStore,
};

use crate::support::guard_with_member;

// ============================================================================
// Same record, same submitted version: exactly one winner
// ============================================================================

#[test]
fn racing_writers_on_one_version_have_exactly_one_winner() {
    const WRITERS: usize = 8;

    for _ in 0..20 {
        let (guard, member) = guard_with_member();
        let id = member.id;
        let guard = Arc::new(guard);
        let barrier = Arc::new(Barrier::new(WRITERS));

        let handles: Vec<_> = (0..WRITERS)
            .map(|n| {
                let guard = Arc::clone(&guard);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    guard.guarded_update(
                        id,
                        1,
                        MemberFields::named(format!("writer-{n}")),
                        None,
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "results: {:?}", results);

        for result in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                matches!(
                    result,
                    GuardError::Locked { .. } | GuardError::StaleVersion { current: 2, .. }
                ),
                "unexpected error: {:?}",
                result
            );
        }

        let stored = guard.store().find_by_id(id).unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert!(!stored.is_locked);
    }
}

// ============================================================================
// Retrying writers never lose an update
// ============================================================================

#[test]
fn retrying_writers_apply_every_increment() {
    const WRITERS: usize = 6;
    const INCREMENTS: i64 = 25;

    let store = InMemoryMemberStore::new();
    let member = store
        .insert(
            MemberFields {
                covered_weeks: Some(0),
                ..MemberFields::named("Counter")
            },
            Utc::now(),
        )
        .unwrap();
    let id = member.id;
    let guard = Arc::new(ConcurrencyGuard::new(store));

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let guard = Arc::clone(&guard);
            thread::spawn(move || {
                for _ in 0..INCREMENTS {
                    loop {
                        let snapshot = guard.store().find_by_id(id).unwrap().unwrap();
                        let mut fields = snapshot.fields.clone();
                        fields.covered_weeks = fields.covered_weeks.map(|w| w + 1);

                        match guard.guarded_update(id, snapshot.version, fields, None) {
                            Ok(_) => break,
                            Err(e) if e.is_conflict() => thread::yield_now(),
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stored = guard.store().find_by_id(id).unwrap().unwrap();
    let total = WRITERS as i64 * INCREMENTS;
    assert_eq!(stored.fields.covered_weeks, Some(total));
    assert_eq!(stored.version, 1 + total as u64);
    assert!(!stored.is_locked);
}

// ============================================================================
// Different records don't contend
// ============================================================================

#[test]
fn writers_on_different_records_all_succeed() {
    const MEMBERS: usize = 10;

    let store = InMemoryMemberStore::new();
    let ids: Vec<_> = (0..MEMBERS)
        .map(|n| {
            store
                .insert(MemberFields::named(format!("m{n}")), Utc::now())
                .unwrap()
                .id
        })
        .collect();
    let guard = Arc::new(ConcurrencyGuard::new(store));
    let barrier = Arc::new(Barrier::new(MEMBERS));

    let handles: Vec<_> = ids
        .iter()
        .map(|&id| {
            let guard = Arc::clone(&guard);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                guard.guarded_update(id, 1, MemberFields::named("updated"), None)
            })
        })
        .collect();

    for handle in handles {
        let updated = handle.join().unwrap().unwrap();
        assert_eq!(updated.version, 2);
    }
    assert!(guard
        .store()
        .list()
        .unwrap()
        .iter()
        .all(|m| m.version == 2 && !m.is_locked));
}
