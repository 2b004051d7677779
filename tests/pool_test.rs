//! Integration tests for the resource pool.
//!
//! These tests validate:
//! 1. Waiters are served in arrival order
//! 2. Closing wakes every blocked waiter with `PoolClosed`
//! 3. Cancellation is distinct from closing and leaves the count untouched
//! 4. The free count stays within `[0, capacity]` under parallel contention
//! 5. Closing is one-way and idempotent
//! 6. Closing in parallel with borrowing keeps every unit accounted for
//! 7. A loan is only accepted by the pool that granted it

use std::sync::Arc;
use std::time::Duration;

use lending_library::core::{ActorId, EventKind, InMemoryEventSink, PoolError, ResourcePool};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

fn pool(capacity: u32) -> Arc<ResourcePool> {
    Arc::new(ResourcePool::new(capacity).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_waiters_are_served_first_come_first_served() {
    let pool = pool(1);
    let holder = pool.acquire(&ActorId::new("holder")).await.unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for n in 1..=3u64 {
        let pool = Arc::clone(&pool);
        let order = Arc::clone(&order);
        handles.push(tokio::spawn(async move {
            // Stagger arrivals so the queue order is well defined.
            tokio::time::sleep(Duration::from_millis(n)).await;
            let id = ActorId::student(n as usize);
            let loan = pool.acquire(&id).await.unwrap();
            order.lock().push(id);
            tokio::time::sleep(Duration::from_millis(5)).await;
            pool.release(loan).unwrap();
        }));
    }

    tokio::time::sleep(Duration::from_millis(10)).await;
    pool.release(holder).unwrap();
    for handle in handles {
        handle.await.unwrap();
    }

    let order = order.lock().clone();
    assert_eq!(
        order,
        vec![ActorId::student(1), ActorId::student(2), ActorId::student(3)]
    );
    assert_eq!(pool.available(), 1);
    assert_eq!(pool.stats().peak_on_loan, 1);
}

#[tokio::test(start_paused = true)]
async fn test_close_wakes_every_blocked_waiter() {
    let pool = pool(1);
    let _held = pool.acquire(&ActorId::new("holder")).await.unwrap();

    let mut handles = Vec::new();
    for n in 1..=5 {
        let pool = Arc::clone(&pool);
        handles.push(tokio::spawn(async move {
            pool.acquire(&ActorId::student(n)).await.map(|_| ())
        }));
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(pool.close());

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Err(PoolError::PoolClosed));
    }
    assert_eq!(pool.available(), 0);
    assert_eq!(pool.on_loan(), 1);
    assert_eq!(pool.stats().refused_acquires, 5);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_waiter_does_not_consume_a_unit() {
    let pool = pool(1);
    let holder = pool.acquire(&ActorId::new("holder")).await.unwrap();
    let token = CancellationToken::new();

    let waiter = {
        let pool = Arc::clone(&pool);
        let token = token.clone();
        tokio::spawn(async move {
            pool.acquire_or_cancel(&ActorId::new("waiter"), &token)
                .await
                .map(|_| ())
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();
    assert_eq!(waiter.await.unwrap(), Err(PoolError::Cancelled));
    assert!(pool.is_open());

    pool.release(holder).unwrap();
    assert_eq!(pool.available(), 1);
    assert_eq!(pool.on_loan(), 0);
    assert_eq!(pool.stats().cancelled_waits, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bounds_hold_under_parallel_contention() {
    const CAPACITY: u32 = 3;
    const TASKS: usize = 32;
    const ROUNDS: usize = 20;

    let pool = pool(CAPACITY);
    let mut handles = Vec::new();
    for n in 0..TASKS {
        let pool = Arc::clone(&pool);
        handles.push(tokio::spawn(async move {
            let id = ActorId::student(n);
            for _ in 0..ROUNDS {
                let loan = pool.acquire(&id).await.unwrap();
                let available = pool.available();
                assert!(available <= CAPACITY);
                assert!(pool.on_loan() <= CAPACITY);
                tokio::task::yield_now().await;
                pool.release(loan).unwrap();
            }
        }));
    }
    for result in futures::future::join_all(handles).await {
        result.unwrap();
    }

    let stats = pool.stats();
    assert!(stats.peak_on_loan <= CAPACITY);
    assert_eq!(stats.available, CAPACITY);
    assert_eq!(stats.on_loan, 0);
    assert_eq!(stats.acquired, (TASKS * ROUNDS) as u64);
    assert_eq!(stats.released, stats.acquired);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_races_parallel_borrowers_without_losing_count() {
    const CAPACITY: u32 = 3;
    const TASKS: usize = 32;

    let pool = pool(CAPACITY);
    let mut handles = Vec::new();
    for n in 0..TASKS {
        let pool = Arc::clone(&pool);
        handles.push(tokio::spawn(async move {
            let id = ActorId::student(n);
            loop {
                let loan = match pool.acquire(&id).await {
                    Ok(loan) => loan,
                    Err(e) => {
                        assert_eq!(e, PoolError::PoolClosed);
                        return;
                    }
                };
                tokio::task::yield_now().await;
                if let Err(e) = pool.release(loan) {
                    assert_eq!(e, PoolError::PoolClosed);
                    return;
                }
            }
        }));
    }

    let closer = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            pool.close()
        })
    };

    let finished = tokio::time::timeout(Duration::from_secs(10), async {
        for result in futures::future::join_all(handles).await {
            result.unwrap();
        }
    })
    .await;
    assert!(finished.is_ok(), "borrowers still running after close");
    assert!(closer.await.unwrap());

    let stats = pool.stats();
    assert!(!stats.open);
    assert_eq!(stats.available + stats.on_loan, CAPACITY);
    assert_eq!(stats.released + stats.lost_units, stats.acquired);
    assert_eq!(u64::from(stats.on_loan), stats.lost_units);
    assert_eq!(stats.refused_acquires + stats.lost_units, TASKS as u64);
    assert!(stats.peak_on_loan <= CAPACITY);
}

#[tokio::test]
async fn test_loan_is_only_returned_to_its_own_pool() {
    let first = pool(1);
    let second = pool(1);
    let loan = first.acquire(&ActorId::new("reader")).await.unwrap();

    assert_eq!(second.release(loan), Err(PoolError::ForeignLoan));
    assert!(second.available() <= second.capacity());
    assert_eq!(second.available(), 1);
    assert_eq!(second.on_loan(), 0);
    assert_eq!(first.on_loan(), 1);
}

#[tokio::test]
async fn test_close_is_monotonic_and_idempotent() {
    let sink = InMemoryEventSink::new(64);
    let pool = ResourcePool::new(2)
        .unwrap()
        .with_events(Arc::new(sink.clone()));
    let loan = pool.acquire(&ActorId::new("reader")).await.unwrap();

    assert!(pool.close());
    for _ in 0..3 {
        assert!(!pool.close());
        assert!(!pool.is_open());
    }

    assert_eq!(pool.release(loan), Err(PoolError::PoolClosed));
    assert_eq!(
        pool.acquire(&ActorId::new("late")).await.unwrap_err(),
        PoolError::PoolClosed
    );
    assert!(!pool.stats().open);

    assert_eq!(sink.count(EventKind::Closed), 1);
    assert_eq!(sink.count(EventKind::ReleaseRefused), 1);
    assert_eq!(sink.count(EventKind::AcquireRefused), 1);
    let events = sink.events();
    assert!(events.windows(2).all(|w| w[0].seq < w[1].seq));
}
