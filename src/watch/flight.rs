//! Single-flight guard for re-triggered work.

use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlightState {
    Idle,
    Running,
    /// Running, and at least one trigger arrived since the run started
    Pending,
}

/// Coalesces triggers for a job that must never run concurrently with itself.
///
/// A trigger that arrives while the job runs marks the guard dirty; the
/// running job then runs exactly once more, however many triggers arrived.
#[derive(Debug)]
pub struct SingleFlight {
    state: Mutex<FlightState>,
}

impl Default for SingleFlight {
    fn default() -> Self {
        Self { state: Mutex::new(FlightState::Idle) }
    }
}

impl SingleFlight {
    /// Create an idle guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger.
    ///
    /// Returns `true` when the caller should start the job. Returns `false`
    /// when a run is already in flight; that run will repeat once.
    pub fn begin(&self) -> bool {
        let mut state = self.lock();
        match *state {
            FlightState::Idle => {
                *state = FlightState::Running;
                true
            }
            FlightState::Running | FlightState::Pending => {
                *state = FlightState::Pending;
                false
            }
        }
    }

    /// Mark the current run finished.
    ///
    /// Returns `true` when triggers arrived during the run and the job must
    /// run again; the guard stays held in that case.
    pub fn finish(&self) -> bool {
        let mut state = self.lock();
        match *state {
            FlightState::Pending => {
                *state = FlightState::Running;
                true
            }
            FlightState::Running | FlightState::Idle => {
                *state = FlightState::Idle;
                false
            }
        }
    }

    /// Whether a run is in flight.
    pub fn is_running(&self) -> bool {
        *self.lock() != FlightState::Idle
    }

    /// Trigger `job` on the current thread.
    ///
    /// Runs the job (and any coalesced re-run) when the guard was idle and
    /// returns the number of runs; returns 0 when another run is in flight.
    pub fn run<F: FnMut()>(&self, mut job: F) -> usize {
        if !self.begin() {
            return 0;
        }
        let mut runs = 0;
        loop {
            job();
            runs += 1;
            if !self.finish() {
                return runs;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlightState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_from_idle() {
        let flight = SingleFlight::new();
        assert!(!flight.is_running());
        assert!(flight.begin());
        assert!(flight.is_running());
        assert!(!flight.finish());
        assert!(!flight.is_running());
    }

    #[test]
    fn test_triggers_during_run_coalesce() {
        let flight = SingleFlight::new();
        assert!(flight.begin());
        assert!(!flight.begin());
        assert!(!flight.begin());
        assert!(!flight.begin());

        assert!(flight.finish());
        assert!(flight.is_running());
        assert!(!flight.finish());
        assert!(!flight.is_running());
    }

    #[test]
    fn test_run_without_contention() {
        let flight = SingleFlight::new();
        let mut count = 0;
        assert_eq!(flight.run(|| count += 1), 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_run_while_held_is_deferred() {
        let flight = SingleFlight::new();
        assert!(flight.begin());
        assert_eq!(flight.run(|| panic!("must not run")), 0);
        assert!(flight.finish());
    }
}
