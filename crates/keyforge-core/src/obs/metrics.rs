use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for key building, reconciliation and codecs.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub definitions: BTreeMap<String, DefinitionCounters>,
    pub codecs: BTreeMap<String, CodecCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Key building
    pub build_calls: u64,
    pub keys_built: u64,
    pub keys_dropped: u64,

    // Reconciliation
    pub delta_inserts: u64,
    pub delta_removes: u64,

    // Codecs
    pub keys_encoded: u64,
    pub bytes_encoded: u64,
    pub keys_decoded: u64,
    pub bytes_decoded: u64,
    pub decode_rejections: u64,
}

///
/// DefinitionCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DefinitionCounters {
    pub build_calls: u64,
    pub keys_built: u64,
    pub keys_dropped: u64,
}

///
/// CodecCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CodecCounters {
    pub keys_encoded: u64,
    pub bytes_encoded: u64,
    pub keys_decoded: u64,
    pub bytes_decoded: u64,
    pub decode_rejections: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Raw counters since the last reset.
    pub counters: Option<EventState>,
    /// Per-definition-kind counters and averages.
    pub definition_counters: Vec<DefinitionSummary>,
}

///
/// DefinitionSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DefinitionSummary {
    pub kind: String,
    pub build_calls: u64,
    pub keys_built: u64,
    pub keys_dropped: u64,
    pub avg_keys_per_build: f64,
}

/// Build a metrics report by inspecting in-memory counters only.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let mut definition_counters: Vec<DefinitionSummary> = snap
        .definitions
        .iter()
        .map(|(kind, counters)| {
            let avg_keys_per_build = if counters.build_calls > 0 {
                counters.keys_built as f64 / counters.build_calls as f64
            } else {
                0.0
            };

            DefinitionSummary {
                kind: kind.clone(),
                build_calls: counters.build_calls,
                keys_built: counters.keys_built,
                keys_dropped: counters.keys_dropped,
                avg_keys_per_build,
            }
        })
        .collect();

    // Busiest definition kinds first, then by name.
    definition_counters.sort_by(|a, b| {
        b.build_calls
            .cmp(&a.build_calls)
            .then_with(|| a.kind.cmp(&b.kind))
    });

    EventReport {
        counters: Some(snap),
        definition_counters,
    }
}
