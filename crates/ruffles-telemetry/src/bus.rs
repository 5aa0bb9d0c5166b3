//! Event bus: queued event dispatch with pluggable sinks.
//!
//! Producers push events into an `std::sync::mpsc` channel; nothing reaches
//! a sink until `flush`, so a solve never blocks on slow outputs.

use std::sync::mpsc;

use crate::events::{EventKind, RuffleEvent};
use crate::sinks::EventSink;

/// Event bus for ruffle diagnostics.
///
/// `emit` queues an event; `flush` hands every queued event to every
/// registered sink, in emission order.
pub struct EventBus {
    sender: mpsc::Sender<RuffleEvent>,
    receiver: mpsc::Receiver<RuffleEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// Disabled bus drops events on `emit`.
    enabled: bool,
}

impl EventBus {
    /// Creates an enabled bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues an event. No-op while disabled.
    pub fn emit(&self, event: RuffleEvent) {
        if !self.enabled {
            return;
        }
        // The receiver lives as long as the bus, so sending cannot fail.
        let _ = self.sender.send(event);
    }

    /// Shorthand for `emit(RuffleEvent::new(solve, kind))`.
    pub fn emit_kind(&self, solve: u32, kind: EventKind) {
        self.emit(RuffleEvent::new(solve, kind));
    }

    /// Dispatches all queued events to the sinks. Returns how many there were.
    pub fn flush(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
            count += 1;
        }
        count
    }

    /// Flushes, then lets every sink finalize its output.
    pub fn finish(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
