//! Per-line delay state and the process start time.
//!
//! The store is written only by [`crate::Reconciler`]; everything else reads
//! through [`DelayStateStore::get`] and [`DelayStateStore::snapshot`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::debug;
use transit_core::{Error, Line, LineRegistry, Result};

use crate::types::LineState;

const STORE: &str = "delay state store";
const CLOCK: &str = "process clock";

pub(crate) type LineStates = BTreeMap<Line, LineState>;

/// Delay state for every registered line.
#[derive(Debug)]
pub struct DelayStateStore {
    registry: LineRegistry,
    lines: RwLock<Option<LineStates>>,
}

impl DelayStateStore {
    /// Create an uninitialized store tracking `registry`'s lines.
    #[must_use]
    pub const fn new(registry: LineRegistry) -> Self {
        Self {
            registry,
            lines: RwLock::new(None),
        }
    }

    /// The registry this store tracks.
    #[must_use]
    pub const fn registry(&self) -> &LineRegistry {
        &self.registry
    }

    /// Reset every line to the baseline state.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyInitialized` on the second call.
    pub fn initialize(&self) -> Result<()> {
        let mut guard = self.lines.write();
        if guard.is_some() {
            return Err(Error::already_initialized(STORE));
        }

        let states: LineStates = self
            .registry
            .iter()
            .map(|line| (line.clone(), LineState::new()))
            .collect();
        debug!(lines = states.len(), "Delay state store initialized");
        *guard = Some(states);
        Ok(())
    }

    /// Whether [`initialize`](Self::initialize) has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.lines.read().is_some()
    }

    /// Current state of one line.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` before `initialize`, and
    /// `Error::UnknownLine` if the line is not tracked.
    pub fn get(&self, line: &Line) -> Result<LineState> {
        let guard = self.lines.read();
        let states = guard.as_ref().ok_or(Error::not_initialized(STORE))?;
        states
            .get(line)
            .cloned()
            .ok_or_else(|| Error::unknown_line(line.as_str()))
    }

    /// Consistent copy of every line, in code order.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` before `initialize`.
    pub fn snapshot(&self) -> Result<Vec<(Line, LineState)>> {
        let guard = self.lines.read();
        let states = guard.as_ref().ok_or(Error::not_initialized(STORE))?;
        Ok(states
            .iter()
            .map(|(line, state)| (line.clone(), state.clone()))
            .collect())
    }

    /// Exclusive access for one reconciliation pass.
    pub(crate) fn write(&self) -> Result<StoreWriteGuard<'_>> {
        let guard = self.lines.write();
        if guard.is_none() {
            return Err(Error::not_initialized(STORE));
        }
        Ok(StoreWriteGuard { guard })
    }
}

/// Write access to an initialized store.
pub(crate) struct StoreWriteGuard<'a> {
    guard: RwLockWriteGuard<'a, Option<LineStates>>,
}

impl StoreWriteGuard<'_> {
    pub(crate) fn states_mut(&mut self) -> impl Iterator<Item = (&Line, &mut LineState)> {
        self.guard.iter_mut().flat_map(|states| states.iter_mut())
    }

    pub(crate) fn delayed_count(&self) -> usize {
        self.guard
            .iter()
            .flat_map(|states| states.values())
            .filter(|state| state.delayed)
            .count()
    }
}

/// The instant tracking started; the origin of every uptime figure.
#[derive(Debug, Default)]
pub struct ProcessClock {
    start: RwLock<Option<DateTime<Utc>>>,
}

impl ProcessClock {
    /// A clock that has not started.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start: RwLock::new(None),
        }
    }

    /// Fix the start time. Happens once per process.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyInitialized` if already started.
    pub fn start(&self, at: DateTime<Utc>) -> Result<()> {
        let mut guard = self.start.write();
        if guard.is_some() {
            return Err(Error::already_initialized(CLOCK));
        }
        *guard = Some(at);
        Ok(())
    }

    /// The fixed start time.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` before `start`.
    pub fn start_time(&self) -> Result<DateTime<Utc>> {
        self.start.read().ok_or(Error::not_initialized(CLOCK))
    }

    /// Whether the clock has started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.start.read().is_some()
    }
}
