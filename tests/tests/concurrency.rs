//! Parallel writes: uniqueness and referential integrity under contention.

use schemata_tests::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;

const WRITERS: usize = 16;

fn shared_engine() -> (Arc<WriteEngine>, InstanceId) {
    let engine = engine().unwrap();
    let server = engine
        .create("infra.server", props! { "hostname" => "alpha" })
        .unwrap()
        .id()
        .unwrap();
    (Arc::new(engine), server)
}

/// Run `write` on `WRITERS` threads released together.
fn race<F>(engine: &Arc<WriteEngine>, write: F) -> Vec<TransactionResult<WriteOutcome>>
where
    F: Fn(&WriteEngine, usize) -> TransactionResult<WriteOutcome> + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(WRITERS));
    let write = Arc::new(write);
    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let engine = Arc::clone(engine);
            let barrier = Arc::clone(&barrier);
            let write = Arc::clone(&write);
            thread::spawn(move || {
                barrier.wait();
                write(&engine, i)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

// ========== TEST: colliding_creates_admit_exactly_one ==========
#[test]
fn test_colliding_creates_admit_exactly_one() {
    // GIVEN a server
    let (engine, server) = shared_engine();

    // WHEN every writer creates a service with the same url and port
    let results = race(&engine, move |engine, i| {
        engine.create(
            "infra.service",
            props! {
                "name" => format!("api-{}", i),
                "url" => "https://alpha.example",
                "port" => 443,
                "server" => server,
            },
        )
    });

    // THEN exactly one is accepted
    let outcomes: Vec<WriteOutcome> = results.into_iter().map(Result::unwrap).collect();
    let accepted = outcomes.iter().filter(|o| o.is_accepted()).count();
    assert_eq!(accepted, 1);

    // AND every other writer was told why
    for outcome in outcomes.iter().filter(|o| o.is_rejected()) {
        assert_eq!(outcome.violations().len(), 1);
        assert_eq!(outcome.violations()[0].kind, ViolationKind::UniqueConstraintViolation);
    }
    assert_eq!(engine.instances_of("infra.service").unwrap().len(), 1);
}

// ========== TEST: colliding_updates_admit_exactly_one ==========
#[test]
fn test_colliding_updates_admit_exactly_one() {
    // GIVEN services on distinct ports
    let (engine, server) = shared_engine();
    let ids: Vec<InstanceId> = (0..WRITERS)
        .map(|i| {
            engine
                .create(
                    "infra.service",
                    props! {
                        "name" => format!("api-{}", i),
                        "url" => "https://alpha.example",
                        "port" => 9000 + i as i64,
                        "server" => server,
                    },
                )
                .unwrap()
                .id()
                .unwrap()
        })
        .collect();
    let ids = Arc::new(ids);

    // WHEN each one moves to port 443 at the same time
    let targets = Arc::clone(&ids);
    let results = race(&engine, move |engine, i| engine.update(targets[i], props! { "port" => 443 }));

    // THEN one wins
    let accepted = results.iter().filter(|r| r.as_ref().unwrap().is_accepted()).count();
    assert_eq!(accepted, 1);
    let on_443 = engine
        .instances_of("infra.service")
        .unwrap()
        .into_iter()
        .filter(|s| s.get("port") == Some(&Value::Int(443)))
        .count();
    assert_eq!(on_443, 1);
}

// ========== TEST: distinct_creates_all_land ==========
#[test]
fn test_distinct_creates_all_land() {
    let (engine, server) = shared_engine();

    let results = race(&engine, move |engine, i| {
        engine.create(
            "infra.service",
            props! {
                "name" => format!("api-{}", i),
                "url" => "https://alpha.example",
                "port" => 8000 + i as i64,
                "server" => server,
            },
        )
    });

    assert!(results.iter().all(|r| r.as_ref().unwrap().is_accepted()));
    assert_eq!(engine.len(), WRITERS + 1);

    let mut ids: Vec<InstanceId> = results.iter().filter_map(|r| r.as_ref().unwrap().id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), WRITERS);
}

// ========== TEST: delete_and_create_never_both_win ==========
#[test]
fn test_delete_and_create_never_both_win() {
    for _ in 0..20 {
        // GIVEN a server nothing references yet
        let (engine, server) = shared_engine();
        let barrier = Arc::new(Barrier::new(2));

        // WHEN one thread deletes it while another deploys a service on it
        let deleter = {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                engine.delete(server)
            })
        };
        let creator = {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                engine.create("infra.service", props! { "name" => "api", "server" => server })
            })
        };
        let deleted = deleter.join().unwrap();
        let created = creator.join().unwrap().unwrap();

        // THEN no service is left pointing at a deleted server
        assert!(deleted.is_ok() != created.is_accepted(), "{:?} / {:?}", deleted, created);
        if created.is_rejected() {
            assert_eq!(created.violations()[0].kind, ViolationKind::DanglingReference);
        }
    }
}
