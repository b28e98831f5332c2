//! Operation execution engine
//!
//! The engine owns the document store and the injected ports (matcher,
//! pipeline runner, snapshot store) and routes typed operations to the
//! interpreter functions:
//! - `read`: find, findOne, countDocuments, aggregate
//! - `write`: inserts, updates, deletes, drop
//! - `projection`: field projection for read results
//! - `session`: the debounced caller-side wrapper
//!
//! Every public entry point returns a result envelope; no error
//! propagates past the dispatcher boundary. The dispatcher times the
//! whole operation from parse start to envelope assembly and performs
//! the single write-through persistence call after any operation that
//! changed the store.

pub mod outcome;
pub mod projection;
mod read;
mod session;
mod write;

pub use outcome::{Outcome, OutcomeData};
pub use session::{RunGuard, Session};

use std::time::Instant;

use tracing::{debug, warn};

use crate::error::Result;
use crate::matcher::{FilterMatcher, PipelineRunner};
use crate::parser::{Operation, parse};
use crate::store::{DocumentStore, SnapshotStore};

/// Internal result of one interpreter function: the envelope payload
/// plus whether the store changed (and therefore must be persisted).
pub(crate) struct Effect {
    pub(crate) data: OutcomeData,
    pub(crate) changed: bool,
}

impl Effect {
    pub(crate) fn read(data: OutcomeData) -> Self {
        Self {
            data,
            changed: false,
        }
    }

    pub(crate) fn write(data: OutcomeData, changed: bool) -> Self {
        Self { data, changed }
    }
}

/// The document-query engine.
///
/// Construction loads the persisted snapshot through the injected
/// snapshot store; a missing or corrupt snapshot logs a warning and
/// yields an empty store rather than failing.
pub struct QueryEngine {
    store: DocumentStore,
    matcher: Box<dyn FilterMatcher>,
    pipeline: Box<dyn PipelineRunner>,
    snapshots: Box<dyn SnapshotStore>,
}

impl QueryEngine {
    /// Create an engine over the given ports, loading any persisted
    /// snapshot.
    pub fn new(
        matcher: Box<dyn FilterMatcher>,
        pipeline: Box<dyn PipelineRunner>,
        snapshots: Box<dyn SnapshotStore>,
    ) -> Self {
        let store = match snapshots.load() {
            Ok(Some(snapshot)) => match DocumentStore::from_snapshot(&snapshot) {
                Ok(store) => store,
                Err(e) => {
                    warn!("Ignoring corrupt snapshot: {e}");
                    DocumentStore::new()
                }
            },
            Ok(None) => DocumentStore::new(),
            Err(e) => {
                warn!("Snapshot read failed, starting empty: {e}");
                DocumentStore::new()
            }
        };

        Self {
            store,
            matcher,
            pipeline,
            snapshots,
        }
    }

    /// Parse and execute one query string.
    ///
    /// Timing starts before parsing; every code path (grammar failure,
    /// decode failure, unknown operation, interpreter failure) returns a
    /// well-formed envelope.
    pub fn execute(&mut self, input: &str) -> Outcome {
        let start = Instant::now();
        debug!("Executing query: {input}");

        let result = parse(input).and_then(|operation| self.apply(operation));
        self.assemble(result, start)
    }

    /// Execute an already-built operation descriptor.
    pub fn dispatch(&mut self, operation: Operation) -> Outcome {
        let start = Instant::now();
        debug!("Dispatching operation on '{}'", operation.collection());

        let result = self.apply(operation);
        self.assemble(result, start)
    }

    fn apply(&mut self, operation: Operation) -> Result<Effect> {
        match operation {
            Operation::Find {
                collection,
                filter,
                options,
            } => self.execute_find(&collection, &filter, &options),
            Operation::FindOne {
                collection,
                filter,
                options,
            } => self.execute_find_one(&collection, &filter, &options),
            Operation::CountDocuments { collection, filter } => {
                self.execute_count(&collection, &filter)
            }
            Operation::Aggregate {
                collection,
                pipeline,
            } => self.execute_aggregate(&collection, &pipeline),
            Operation::InsertOne {
                collection,
                document,
            } => self.execute_insert_one(&collection, document),
            Operation::InsertMany {
                collection,
                documents,
            } => self.execute_insert_many(&collection, documents),
            Operation::UpdateOne {
                collection,
                filter,
                update,
            } => self.execute_update(&collection, &filter, &update, false),
            Operation::UpdateMany {
                collection,
                filter,
                update,
            } => self.execute_update(&collection, &filter, &update, true),
            Operation::DeleteOne { collection, filter } => {
                self.execute_delete(&collection, &filter, false)
            }
            Operation::DeleteMany { collection, filter } => {
                self.execute_delete(&collection, &filter, true)
            }
            Operation::Drop { collection } => self.execute_drop(&collection),
        }
    }

    fn assemble(&mut self, result: Result<Effect>, start: Instant) -> Outcome {
        match result {
            Ok(effect) => {
                if effect.changed {
                    self.persist();
                }
                let elapsed = start.elapsed().as_millis() as u64;
                Outcome::success(effect.data, elapsed)
            }
            Err(e) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!("Operation failed: {e}");
                Outcome::failure(e.to_string(), elapsed)
            }
        }
    }

    /// Write the whole store through the snapshot port.
    ///
    /// A failed write is logged and does not roll back the in-memory
    /// mutation; the store and the snapshot may diverge until the next
    /// successful write.
    fn persist(&mut self) {
        let result = self
            .store
            .to_snapshot()
            .and_then(|snapshot| self.snapshots.save(&snapshot));

        match result {
            Ok(()) => debug!("Store persisted"),
            Err(e) => warn!("Persistence write failed: {e}"),
        }
    }

    /// Names of the collections currently in the store.
    pub fn collection_names(&self) -> Vec<&str> {
        self.store.collection_names()
    }

    /// Remove every collection and persist the now-empty store.
    pub fn clear(&mut self) {
        self.store.clear();
        self.persist();
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}
