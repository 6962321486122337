use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::timer::State;

type Listener = Box<dyn FnMut() + Send>;

/// A zero-argument notification with any number of listeners.
///
/// Listeners run synchronously, in connection order, on the thread that
/// owns the engine.
#[derive(Default)]
pub struct Signal {
    listeners: Vec<Listener>,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, listener: impl FnMut() + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self) {
        for listener in &mut self.listeners {
            listener();
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Point-in-time view of the engine for renderers and logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: State,
    pub task_index: usize,
    pub task_count: usize,
    pub task_name: String,
    pub minutes: u32,
    pub elapsed_minutes: i64,
    /// Negative once the task has run over.
    pub remaining_minutes: i64,
    pub finished: bool,
    /// Same text as the engine's `Display` output.
    pub status: String,
    pub at: DateTime<Utc>,
}
