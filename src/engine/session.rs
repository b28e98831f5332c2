//! Debounced session wrapper
//!
//! The engine itself has no in-progress state to protect: each
//! `execute` call is synchronous and atomic with respect to the store.
//! Preventing rapid re-submission of the same run request is caller
//! discipline, and [`Session`] is that caller-side wrapper: re-issuing
//! the same input within the debounce window replays the previous
//! envelope instead of executing again.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::engine::{Outcome, QueryEngine};

/// Default debounce window for repeated identical run requests.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Caller-side debounce state.
#[derive(Debug, Default)]
pub struct RunGuard {
    window: Duration,
    last: Option<LastRun>,
}

#[derive(Debug)]
struct LastRun {
    input: String,
    at: Instant,
    outcome: Outcome,
}

impl RunGuard {
    /// Create a guard with the given debounce window.
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// The previous outcome, when `input` repeats within the window.
    pub fn replay(&self, input: &str) -> Option<Outcome> {
        let last = self.last.as_ref()?;
        if last.input == input && last.at.elapsed() < self.window {
            Some(last.outcome.clone())
        } else {
            None
        }
    }

    /// Record the outcome of a run that was actually executed.
    pub fn record(&mut self, input: &str, outcome: &Outcome) {
        self.last = Some(LastRun {
            input: input.to_string(),
            at: Instant::now(),
            outcome: outcome.clone(),
        });
    }
}

/// An engine plus its debounce guard: the run entry point host
/// applications are expected to use.
pub struct Session {
    engine: QueryEngine,
    guard: RunGuard,
}

impl Session {
    /// Wrap an engine with the default debounce window.
    pub fn new(engine: QueryEngine) -> Self {
        Self::with_debounce(engine, DEFAULT_DEBOUNCE)
    }

    /// Wrap an engine with a custom debounce window.
    pub fn with_debounce(engine: QueryEngine, window: Duration) -> Self {
        Self {
            engine,
            guard: RunGuard::new(window),
        }
    }

    /// Run one query, debounced.
    pub fn run(&mut self, input: &str) -> Outcome {
        if let Some(previous) = self.guard.replay(input) {
            debug!("Replaying debounced result");
            return previous;
        }

        let outcome = self.engine.execute(input);
        self.guard.record(input, &outcome);
        outcome
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    /// Mutable access to the wrapped engine.
    pub fn engine_mut(&mut self) -> &mut QueryEngine {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{BasicMatcher, BasicPipeline};
    use crate::store::MemorySnapshots;

    fn session(window: Duration) -> Session {
        let engine = QueryEngine::new(
            Box::new(BasicMatcher::new()),
            Box::new(BasicPipeline::new()),
            Box::new(MemorySnapshots::new()),
        );
        Session::with_debounce(engine, window)
    }

    #[test]
    fn test_repeated_input_replays_within_window() {
        let mut session = session(Duration::from_secs(60));

        session.run("db.users.insertOne({n: 1})");
        session.run("db.users.insertOne({n: 1})");

        let count = session.run("db.users.countDocuments({})");
        assert_eq!(count.to_json()["count"], serde_json::json!(1));
    }

    #[test]
    fn test_different_input_executes() {
        let mut session = session(Duration::from_secs(60));

        session.run("db.users.insertOne({n: 1})");
        session.run("db.users.insertOne({n: 2})");

        let count = session.run("db.users.countDocuments({})");
        assert_eq!(count.to_json()["count"], serde_json::json!(2));
    }

    #[test]
    fn test_zero_window_never_replays() {
        let mut session = session(Duration::ZERO);

        session.run("db.users.insertOne({n: 1})");
        session.run("db.users.insertOne({n: 1})");

        let count = session.run("db.users.countDocuments({})");
        assert_eq!(count.to_json()["count"], serde_json::json!(2));
    }
}
