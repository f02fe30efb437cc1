//! Metrics sink boundary.
//!
//! Key building, reconciliation and codec code never touch `obs::metrics`
//! directly. All instrumentation flows through `MetricsEvent` and `MetricsSink`.
use crate::{codec::CodecKind, index::DefinitionKind, obs::metrics};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    KeysBuilt {
        kind: DefinitionKind,
        keys: u64,
    },
    KeysDropped {
        kind: DefinitionKind,
    },
    KeyDelta {
        inserts: u64,
        removes: u64,
    },
    KeyEncoded {
        codec: CodecKind,
        bytes: u64,
    },
    KeyDecoded {
        codec: CodecKind,
        bytes: u64,
    },
    DecodeRejected {
        codec: CodecKind,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
/// Default thread-local sink that writes into the metrics state.
/// Acts as the concrete sink when no scoped override is installed.
///

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::KeysBuilt { kind, keys } => {
                metrics::with_state_mut(|m| {
                    m.ops.build_calls = m.ops.build_calls.saturating_add(1);
                    m.ops.keys_built = m.ops.keys_built.saturating_add(keys);

                    let entry = m.definitions.entry(kind.label().to_string()).or_default();
                    entry.build_calls = entry.build_calls.saturating_add(1);
                    entry.keys_built = entry.keys_built.saturating_add(keys);
                });
            }

            MetricsEvent::KeysDropped { kind } => {
                metrics::with_state_mut(|m| {
                    m.ops.build_calls = m.ops.build_calls.saturating_add(1);
                    m.ops.keys_dropped = m.ops.keys_dropped.saturating_add(1);

                    let entry = m.definitions.entry(kind.label().to_string()).or_default();
                    entry.build_calls = entry.build_calls.saturating_add(1);
                    entry.keys_dropped = entry.keys_dropped.saturating_add(1);
                });
            }

            MetricsEvent::KeyDelta { inserts, removes } => {
                metrics::with_state_mut(|m| {
                    m.ops.delta_inserts = m.ops.delta_inserts.saturating_add(inserts);
                    m.ops.delta_removes = m.ops.delta_removes.saturating_add(removes);
                });
            }

            MetricsEvent::KeyEncoded { codec, bytes } => {
                metrics::with_state_mut(|m| {
                    m.ops.keys_encoded = m.ops.keys_encoded.saturating_add(1);
                    m.ops.bytes_encoded = m.ops.bytes_encoded.saturating_add(bytes);

                    let entry = m.codecs.entry(codec.label().to_string()).or_default();
                    entry.keys_encoded = entry.keys_encoded.saturating_add(1);
                    entry.bytes_encoded = entry.bytes_encoded.saturating_add(bytes);
                });
            }

            MetricsEvent::KeyDecoded { codec, bytes } => {
                metrics::with_state_mut(|m| {
                    m.ops.keys_decoded = m.ops.keys_decoded.saturating_add(1);
                    m.ops.bytes_decoded = m.ops.bytes_decoded.saturating_add(bytes);

                    let entry = m.codecs.entry(codec.label().to_string()).or_default();
                    entry.keys_decoded = entry.keys_decoded.saturating_add(1);
                    entry.bytes_decoded = entry.bytes_decoded.saturating_add(bytes);
                });
            }

            MetricsEvent::DecodeRejected { codec } => {
                metrics::with_state_mut(|m| {
                    m.ops.decode_rejections = m.ops.decode_rejections.saturating_add(1);

                    let entry = m.codecs.entry(codec.label().to_string()).or_default();
                    entry.decode_rejections = entry.decode_rejections.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    // Clone out of the slot so a sink may itself call `record`.
    let installed = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match installed {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Record the outcome of one decode call.
pub(crate) fn record_decode<T>(
    codec: CodecKind,
    result: &Result<(T, usize), crate::error::InternalError>,
) {
    match result {
        Ok((_, bytes)) => record(MetricsEvent::KeyDecoded {
            codec,
            bytes: *bytes as u64,
        }),
        Err(_) => record(MetricsEvent::DecodeRejected { codec }),
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state on the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink is restored on every exit, including unwinding.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = previous;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
