//! Integration tests for ruffles-telemetry.

use ruffles_telemetry::bus::EventBus;
use ruffles_telemetry::events::{EventKind, RuffleEvent};
use ruffles_telemetry::sinks::{EventSink, TracingSink, VecSink};

fn begin() -> RuffleEvent {
    RuffleEvent::new(
        0,
        EventKind::SolveBegin {
            dof: 12,
            solver: "hybrid".into(),
        },
    )
}

// ─── Bus Tests ────────────────────────────────────────────────

#[test]
fn emit_and_flush() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    bus.emit(begin());
    bus.emit(RuffleEvent::new(
        0,
        EventKind::SolveEnd {
            steps: 3,
            converged: true,
            wall_time: 0.001,
        },
    ));
    assert!(sink.is_empty());

    assert_eq!(bus.flush(), 2);
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], begin());
}

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    bus.set_enabled(false);
    assert!(!bus.is_enabled());
    bus.emit(begin());
    assert_eq!(bus.flush(), 0);
    assert!(sink.is_empty());
}

#[test]
fn multiple_sinks_receive_every_event() {
    let mut bus = EventBus::new();
    let a = VecSink::new();
    let b = VecSink::new();
    bus.add_sink(Box::new(a.clone()));
    bus.add_sink(Box::new(b.clone()));
    bus.add_sink(Box::new(TracingSink::new()));
    assert_eq!(bus.sink_count(), 3);

    bus.emit(begin());
    bus.finish();
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
}

#[test]
fn flush_on_empty_bus() {
    let mut bus = EventBus::default();
    assert_eq!(bus.flush(), 0);
}

// ─── Sink Tests ───────────────────────────────────────────────

#[test]
fn sink_names() {
    assert_eq!(VecSink::new().name(), "vec_sink");
    assert_eq!(TracingSink::new().name(), "tracing_sink");
}

#[test]
fn tracing_sink_handles_all_kinds() {
    let mut sink = TracingSink::new();
    let kinds = [
        begin().kind,
        EventKind::SolverStep {
            step: 1,
            energy: -3.5,
            converged: false,
        },
        EventKind::AirMeshRelaxed { flipped: true },
        EventKind::TopologyEdit {
            operation: "densify".into(),
            sections: 9,
        },
    ];
    for kind in kinds {
        sink.handle(&RuffleEvent::new(2, kind));
    }
}

// ─── Serialization Tests ──────────────────────────────────────

#[test]
fn event_serialization() {
    let event = RuffleEvent::new(
        4,
        EventKind::TopologyEdit {
            operation: "subdivide".into(),
            sections: 7,
        },
    );
    let json = serde_json::to_string(&event).expect("serialize");
    assert!(json.contains("subdivide"));
    let back: RuffleEvent = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, event);
}

#[test]
fn custom_event_roundtrip() {
    let event = RuffleEvent::new(
        0,
        EventKind::Custom {
            label: "note".into(),
            payload: r#"{"x":1}"#.into(),
        },
    );
    let json = serde_json::to_string(&event).expect("serialize");
    let back: RuffleEvent = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, event);
}
