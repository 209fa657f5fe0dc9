//! Stage lifecycle events.
//!
//! Stages publish events to observers instead of talking to the dev server
//! directly. The watch server subscribes a reload notifier; builds subscribe
//! a logging observer.

use crate::build::{Stage, StageResult, StageStatus};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Events emitted around each stage invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    /// A stage is about to run
    Started {
        /// Stage identifier
        stage: Stage,
    },
    /// A stage finished writing its outputs
    Completed {
        /// Stage identifier
        stage: Stage,
        /// Files written
        outputs: Vec<PathBuf>,
        /// Duration in milliseconds
        duration_ms: u64,
    },
    /// A stage failed
    Failed {
        /// Stage identifier
        stage: Stage,
        /// Error message
        message: String,
    },
}

impl StageEvent {
    /// Stage the event refers to.
    pub fn stage(&self) -> Stage {
        match self {
            StageEvent::Started { stage }
            | StageEvent::Completed { stage, .. }
            | StageEvent::Failed { stage, .. } => *stage,
        }
    }

    /// Build the terminal event for a stage result.
    pub fn from_result(result: &StageResult) -> Self {
        match &result.status {
            StageStatus::Failed(message) => {
                StageEvent::Failed { stage: result.stage, message: message.clone() }
            }
            _ => StageEvent::Completed {
                stage: result.stage,
                outputs: result.outputs.clone(),
                duration_ms: result.duration.as_millis() as u64,
            },
        }
    }
}

/// Subscriber for stage events.
pub trait StageObserver: Send + Sync {
    /// Handle an event.
    fn on_event(&self, event: &StageEvent);
}

/// An observer that discards all events.
#[derive(Debug, Default)]
pub struct NullObserver;

impl StageObserver for NullObserver {
    fn on_event(&self, _event: &StageEvent) {}
}

/// Observer that logs events through `tracing`.
#[derive(Debug, Default)]
pub struct LogObserver;

impl StageObserver for LogObserver {
    fn on_event(&self, event: &StageEvent) {
        match event {
            StageEvent::Started { stage } => tracing::info!(%stage, "starting"),
            StageEvent::Completed { stage, outputs, duration_ms } => {
                tracing::info!(%stage, files = outputs.len(), "finished after {}ms", duration_ms)
            }
            StageEvent::Failed { stage, message } => tracing::error!(%stage, "{}", message),
        }
    }
}

/// Fan-out over several observers.
#[derive(Clone, Default)]
pub struct Observers {
    observers: Vec<Arc<dyn StageObserver>>,
}

impl Observers {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer.
    pub fn subscribe(&mut self, observer: Arc<dyn StageObserver>) {
        self.observers.push(observer);
    }

    /// Builder-style variant of [`subscribe`](Self::subscribe).
    pub fn with(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.subscribe(observer);
        self
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer is subscribed.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl StageObserver for Observers {
    fn on_event(&self, event: &StageEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("len", &self.observers.len()).finish()
    }
}

/// Observer that records every event with the instant it arrived.
///
/// Used to check ordering between stages.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<(Instant, StageEvent)>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<StageEvent> {
        self.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    /// Snapshot of recorded events with their timestamps.
    pub fn timeline(&self) -> Vec<(Instant, StageEvent)> {
        self.lock().clone()
    }

    /// Stages that started, in order.
    pub fn started(&self) -> Vec<Stage> {
        self.lock()
            .iter()
            .filter_map(|(_, e)| match e {
                StageEvent::Started { stage } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Instant, StageEvent)>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StageObserver for RecordingObserver {
    fn on_event(&self, event: &StageEvent) {
        self.lock().push((Instant::now(), event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_event_from_result() {
        let ok = StageResult::success(Stage::Js, vec![PathBuf::from("main.js")], Duration::from_millis(7));
        assert_eq!(
            StageEvent::from_result(&ok),
            StageEvent::Completed {
                stage: Stage::Js,
                outputs: vec![PathBuf::from("main.js")],
                duration_ms: 7
            }
        );

        let failed = StageResult::failed(Stage::Css, "boom".to_string(), Duration::ZERO);
        assert_eq!(
            StageEvent::from_result(&failed),
            StageEvent::Failed { stage: Stage::Css, message: "boom".to_string() }
        );
    }

    #[test]
    fn test_observers_fan_out() {
        let a = Arc::new(RecordingObserver::new());
        let b = Arc::new(RecordingObserver::new());
        let observers = Observers::new().with(a.clone()).with(b.clone());
        assert_eq!(observers.len(), 2);

        observers.on_event(&StageEvent::Started { stage: Stage::Html });
        assert_eq!(a.started(), vec![Stage::Html]);
        assert_eq!(b.events().len(), 1);
    }

    #[test]
    fn test_recording_observer_timeline_is_ordered() {
        let recorder = RecordingObserver::new();
        recorder.on_event(&StageEvent::Started { stage: Stage::Css });
        recorder.on_event(&StageEvent::Started { stage: Stage::Js });

        let timeline = recorder.timeline();
        assert!(timeline[0].0 <= timeline[1].0);
        assert_eq!(recorder.started(), vec![Stage::Css, Stage::Js]);
    }
}
