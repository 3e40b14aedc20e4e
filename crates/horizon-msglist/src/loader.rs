//! Background group table loading.
//!
//! Building a [`GroupTable`] scans the whole store once. [`GroupLoader`] runs
//! that scan on a named background thread and hands the finished store and
//! table back as one [`LoadedGroups`] value, to be installed with
//! [`GroupedCursor::replace_load`](crate::model::GroupedCursor::replace_load).
//!
//! Every request gets a new generation number and replaces the pending one.
//! A superseded scan still runs to completion, but its result is dropped: the
//! receiving end of its channel is gone by the time it finishes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use horizon_msglist::config::GroupingConfig;
//! use horizon_msglist::loader::GroupLoader;
//! use horizon_msglist::model::{GroupedCursor, MemoryRowStore, MessageRow};
//! use horizon_msglist::FixedClock;
//!
//! let mut loader = GroupLoader::new(Arc::new(FixedClock::from_millis_utc(0)));
//! let store = MemoryRowStore::new(vec![MessageRow::new(1, 0)]);
//! loader.request(store, &GroupingConfig::default()).unwrap();
//!
//! let loaded = loader.wait().unwrap().unwrap();
//! let cursor = GroupedCursor::from_loaded(loaded);
//! assert_eq!(cursor.count(), 2);
//! ```

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError, bounded};
use horizon_msglist_core::logging::targets;
use horizon_msglist_core::{Clock, Error, Result};

use crate::config::GroupingConfig;
use crate::model::{GroupTable, RowStore};

/// Default name prefix for loader threads.
const THREAD_NAME: &str = "msglist-loader";

/// A store rewound to "before first" together with the table built for it.
pub struct LoadedGroups<S> {
    generation: u64,
    store: S,
    table: GroupTable,
    grouping_enabled: bool,
}

impl<S> LoadedGroups<S> {
    /// Generation of the request that produced this load.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The loaded store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The finished table.
    pub fn table(&self) -> &GroupTable {
        &self.table
    }

    /// Whether the requesting config allowed the grouped view.
    pub fn is_grouping_enabled(&self) -> bool {
        self.grouping_enabled
    }

    /// Splits into the store and the table.
    pub fn into_parts(self) -> (S, GroupTable) {
        (self.store, self.table)
    }
}

type LoadResult<S> = Result<LoadedGroups<S>>;

/// Runs group table builds off the calling thread.
pub struct GroupLoader<S> {
    clock: Arc<dyn Clock>,
    thread_name: String,
    generation: u64,
    pending: Option<(u64, Receiver<LoadResult<S>>)>,
}

impl<S: RowStore + Send + 'static> GroupLoader<S> {
    /// Creates a loader reading "now" from `clock` for every scan.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            thread_name: THREAD_NAME.to_owned(),
            generation: 0,
            pending: None,
        }
    }

    /// Sets the name prefix of loader threads.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Starts loading `store` as described by `config`, replacing any
    /// pending request. Returns the request's generation.
    ///
    /// The table is built even with grouping disabled in `config`, so the
    /// cursor keeps group state when grouping is switched on later.
    pub fn request(&mut self, store: S, config: &GroupingConfig) -> Result<u64> {
        let generation = self.generation + 1;
        let (sender, receiver) = bounded(1);
        let clock = self.clock.clone();
        let sort_order = config.sort_order;
        let expanded = config.expanded_by_default;
        let grouping_enabled = config.enabled;

        thread::Builder::new()
            .name(format!("{}-{generation}", self.thread_name))
            .spawn(move || {
                let mut store = store;
                let result =
                    GroupTable::build_with_state(&mut store, sort_order, clock.as_ref(), expanded)
                        .map(|table| LoadedGroups {
                            generation,
                            store,
                            table,
                            grouping_enabled,
                        });
                if sender.send(result).is_err() {
                    tracing::debug!(target: targets::LOADER, generation, "load superseded");
                }
            })
            .map_err(|source| Error::LoaderSpawn { source })?;

        self.generation = generation;
        if let Some((previous, _)) = self.pending.replace((generation, receiver)) {
            tracing::debug!(target: targets::LOADER, previous, generation, "abandoned pending load");
        }
        Ok(generation)
    }

    /// Generation of the most recent request; `0` before the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` while a request has not been collected.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Collects the pending result if it is ready.
    ///
    /// Returns `None` if nothing is pending or the scan is still running.
    pub fn try_take(&mut self) -> Option<LoadResult<S>> {
        let (_, receiver) = self.pending.as_ref()?;
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(Error::LoaderDisconnected),
        };
        self.pending = None;
        Some(result)
    }

    /// Blocks until the pending result arrives.
    ///
    /// Returns `None` if nothing is pending.
    pub fn wait(&mut self) -> Option<LoadResult<S>> {
        let (generation, receiver) = self.pending.take()?;
        let result = receiver.recv().unwrap_or(Err(Error::LoaderDisconnected));
        tracing::debug!(target: targets::LOADER, generation, ok = result.is_ok(), "load collected");
        Some(result)
    }

    /// Drops the pending request. Returns `true` if there was one.
    pub fn abandon(&mut self) -> bool {
        match self.pending.take() {
            Some((generation, _)) => {
                tracing::debug!(target: targets::LOADER, generation, "abandoned pending load");
                true
            }
            None => false,
        }
    }
}
