//! Tests for utility functions

use lending_library::util::{init_tracing, now_ms};

#[test]
fn test_now_ms_advances() {
    let first = now_ms();
    std::thread::sleep(std::time::Duration::from_millis(2));
    assert!(now_ms() > first);
    assert!(first > 1_600_000_000_000);
}

#[test]
fn test_init_tracing_is_repeatable() {
    init_tracing();
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());
}
