//! Tests for the event sink

use lending_library::core::{build_pool_event, ActorId, EventKind, EventSink, InMemoryEventSink};

#[test]
fn test_in_memory_event_sink() {
    let sink = InMemoryEventSink::new(10);
    let actor = ActorId::student(1);

    sink.record(build_pool_event(0, Some(&actor), EventKind::Acquired, 2));
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].seq, 0);
    assert_eq!(events[0].actor, Some(actor));
    assert_eq!(events[0].kind, EventKind::Acquired);
    assert_eq!(events[0].available, 2);
    assert!(events[0].at_ms > 0);
}

#[test]
fn test_event_sink_overflow() {
    let sink = InMemoryEventSink::new(2);

    sink.record(build_pool_event(0, None, EventKind::Acquired, 0));
    sink.record(build_pool_event(1, None, EventKind::Released, 1));
    sink.record(build_pool_event(2, None, EventKind::Closed, 1));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].seq, 1); // First one popped
    assert_eq!(events[1].seq, 2);
}

#[test]
fn test_clones_share_the_buffer() {
    let sink = InMemoryEventSink::new(4);
    let handle = sink.clone();
    sink.record(build_pool_event(0, None, EventKind::Closed, 3));
    assert_eq!(handle.count(EventKind::Closed), 1);
}

#[test]
fn test_event_lines() {
    let actor = ActorId::student(4);
    let line = |kind: EventKind| build_pool_event(0, Some(&actor), kind, 0).to_string();

    assert_eq!(line(EventKind::Acquired), "Student #4 acquired a unit.");
    assert_eq!(line(EventKind::Released), "Student #4 released a unit.");
    assert_eq!(
        line(EventKind::AcquireRefused),
        "Student #4 could not acquire: pool closed."
    );
    assert_eq!(
        line(EventKind::ReleaseRefused),
        "Student #4 could not release: pool closed."
    );
    assert_eq!(
        build_pool_event(1, None, EventKind::Closed, 0).to_string(),
        "pool closed; no further operations permitted."
    );
}
