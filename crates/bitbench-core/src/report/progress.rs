//! Runner event stream.
//!
//! Every event goes through one [`EventBus`]; the bus stamps it with a sequence
//! number and fans it out to all subscribers under a single lock, so observers
//! never see divergent orderings. Delivery never blocks the scheduler: each
//! subscriber owns an unbounded queue.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::errors::InvocationErrorKind;

/// Per-model split of planned units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTotals {
    pub model: String,
    pub total: usize,
    /// Units that need a model call.
    pub execute: usize,
    /// Units satisfiable from cache.
    pub reuse: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunnerEvent {
    Plan {
        suite_id: String,
        version: String,
        totals: Vec<PlanTotals>,
    },
    Start {
        model: String,
        test_index: usize,
        run_number: u32,
    },
    Done {
        model: String,
        test_index: usize,
        run_number: u32,
        duration_ms: u64,
        correct: bool,
        cost_usd: f64,
        completion_tokens: u64,
    },
    Error {
        model: String,
        test_index: usize,
        run_number: u32,
        duration_ms: u64,
        kind: InvocationErrorKind,
        message: String,
    },
    Reuse {
        model: String,
        test_index: usize,
        run_number: u32,
        duration_ms: u64,
        correct: bool,
        cost_usd: f64,
        completion_tokens: u64,
    },
}

impl RunnerEvent {
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Plan { .. } => None,
            Self::Start { model, .. }
            | Self::Done { model, .. }
            | Self::Error { model, .. }
            | Self::Reuse { model, .. } => Some(model),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedEvent {
    pub seq: u64,
    #[serde(flatten)]
    pub event: RunnerEvent,
}

#[derive(Default)]
struct BusInner {
    next_seq: u64,
    subscribers: Vec<UnboundedSender<SequencedEvent>>,
}

/// Cheap to clone; all clones share one ordered stream.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer. It receives every event emitted from now on.
    pub fn subscribe(&self) -> UnboundedReceiver<SequencedEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(tx);
        rx
    }

    /// Appends one event and returns its sequence number.
    pub fn emit(&self, event: RunnerEvent) -> u64 {
        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let msg = SequencedEvent { seq, event };
        // Closed receivers are pruned.
        inner.subscribers.retain(|tx| tx.send(msg.clone()).is_ok());
        seq
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Drops every sender; subscribers see end-of-stream once drained.
    pub fn close(&self) {
        self.lock().subscribers.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BusInner> {
        // Emitting never panics while holding the lock, so the state stays valid.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(model: &str, test_index: usize) -> RunnerEvent {
        RunnerEvent::Start {
            model: model.into(),
            test_index,
            run_number: 1,
        }
    }

    #[tokio::test]
    async fn observers_see_identical_order() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        let mut handles = Vec::new();
        for i in 0..50 {
            let bus = bus.clone();
            handles.push(tokio::spawn(async move {
                bus.emit(start("m", i));
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        bus.close();

        let mut seen_a = Vec::new();
        while let Some(e) = a.recv().await {
            seen_a.push(e);
        }
        let mut seen_b = Vec::new();
        while let Some(e) = b.recv().await {
            seen_b.push(e);
        }

        assert_eq!(seen_a.len(), 50);
        assert_eq!(seen_a, seen_b);
        let seqs: Vec<u64> = seen_a.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn dropped_receiver_is_pruned() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let _keep = bus.subscribe();
        drop(rx);
        bus.emit(start("m", 0));
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let bus = EventBus::new();
        bus.emit(start("m", 0));
        let mut rx = bus.subscribe();
        bus.emit(start("m", 1));
        let got = rx.try_recv().unwrap();
        assert_eq!(got.seq, 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn event_json_is_tagged() {
        let v = serde_json::to_value(SequencedEvent {
            seq: 3,
            event: start("gpt-4o", 2),
        })
        .unwrap();
        assert_eq!(v["type"], "start");
        assert_eq!(v["seq"], 3);
        assert_eq!(v["test_index"], 2);
    }
}
