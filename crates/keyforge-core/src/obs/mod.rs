//! Observability: in-process counters and the sink abstraction.
//!
//! Nothing in this crate logs or prints. Callers read counters through
//! `metrics_report` or capture raw events with `with_metrics_sink`.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{
    CodecCounters, DefinitionCounters, DefinitionSummary, EventOps, EventReport, EventState,
};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
