//! Pomodoro engine implementation.
//!
//! The engine is a caller-driven state machine with no internal thread. It
//! owns a one-shot [`Wakeup`]; the host sleeps until
//! [`Pomodoro::next_wakeup`] and then calls [`Pomodoro::poll`].
//!
//! ## State Transitions
//!
//! ```text
//! Stopped --start/start_task--> Running --next--> Running
//!    ^                             |
//!    +------------stop-------------+
//! ```
//!
//! Every transition resets the elapsed time and the finished flag, runs the
//! stop hook of the task being left (only when leaving Running), then the
//! start hook of the new task (only when Running), re-arms the wake-up and
//! raises the state-changed signal.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = Pomodoro::new(Config::default(), Box::new(ShellRunner::new()))?;
//! engine.on_state_changed(|| redraw());
//! // In a loop:
//! sleep_until(engine.next_wakeup());
//! engine.poll()?; // fires the finish hook once the task runs out
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::wakeup::Wakeup;
use crate::command::CommandRunner;
use crate::error::{ConfigError, Result};
use crate::events::{Signal, Snapshot};
use crate::storage::Config;
use crate::task::{Task, TaskView};

const MINUTE_MS: i64 = 60_000;
/// Added to every wake-up so the displayed minute has already rolled over.
const WAKEUP_MARGIN_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Stopped,
    Running,
}

impl State {
    pub fn glyph(self) -> &'static str {
        match self {
            State::Stopped => "\u{23f8}\u{fe0e}",
            State::Running => "\u{23f5}\u{fe0e}",
        }
    }
}

/// Delay until the next wake-up for a task with `remaining_ms` left.
///
/// Lands just after the next whole-minute boundary of the remaining time so
/// the displayed minutes change at most once per wake-up.
pub fn next_wakeup_interval(remaining_ms: i64) -> Duration {
    let mut interval = remaining_ms.rem_euclid(MINUTE_MS);
    if interval == 0 {
        interval = MINUTE_MS;
    }
    Duration::from_millis((interval + WAKEUP_MARGIN_MS) as u64)
}

/// The pomodoro state machine.
pub struct Pomodoro {
    tasks: Vec<Task>,
    stopped_task: Task,
    state: State,
    current_task_index: usize,
    /// Origin of the elapsed time; reset on every transition.
    activated_at: Instant,
    finished: bool,
    wakeup: Wakeup,
    runner: Box<dyn CommandRunner>,
    clock: Box<dyn Clock>,
    state_changed: Signal,
    ticked: Signal,
}

impl Pomodoro {
    /// Create an engine using the system clock.
    ///
    /// Starts `Stopped`, then runs [`Pomodoro::start`] if `config.autostart`.
    /// A failing start hook is logged; the engine is still returned running.
    ///
    /// # Errors
    ///
    /// Returns an error if the task list is empty.
    pub fn new(config: Config, runner: Box<dyn CommandRunner>) -> Result<Self> {
        Self::with_clock(config, runner, Box::new(SystemClock))
    }

    /// Create an engine with a custom time source.
    ///
    /// # Errors
    ///
    /// See [`Pomodoro::new`].
    pub fn with_clock(
        config: Config,
        runner: Box<dyn CommandRunner>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        if config.tasks.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "tasks".into(),
                message: "the task cycle is empty".into(),
            }
            .into());
        }

        let now = clock.now();
        let mut wakeup = Wakeup::default();
        wakeup.arm(now, Duration::ZERO);

        let mut engine = Self {
            tasks: config.tasks,
            stopped_task: config.stopped_task,
            state: State::Stopped,
            current_task_index: 0,
            activated_at: now,
            finished: true,
            wakeup,
            runner,
            clock,
            state_changed: Signal::new(),
            ticked: Signal::new(),
        };

        info!("[{}] Initialized", engine);

        if config.autostart {
            if let Err(e) = engine.start() {
                warn!("[{}] Autostart: {}", engine, e);
            }
        }
        Ok(engine)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> State {
        self.state
    }

    pub fn current_task_index(&self) -> usize {
        self.current_task_index
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn stopped_task(&self) -> &Task {
        &self.stopped_task
    }

    /// The active task while running, otherwise the stopped task.
    pub fn current_task(&self) -> &Task {
        match self.state {
            State::Running => &self.tasks[self.current_task_index],
            State::Stopped => &self.stopped_task,
        }
    }

    /// The current task with the timed-out appearance once it has run out.
    pub fn current_view(&self) -> TaskView<'_> {
        let task = self.current_task();
        if self.state == State::Running && self.remaining_minutes() <= 0 {
            task.as_timed_out()
        } else {
            task.view()
        }
    }

    /// Tasks that can be started directly, with their cycle index.
    pub fn in_menu_tasks(&self) -> impl Iterator<Item = (usize, &Task)> {
        self.tasks.iter().enumerate().filter(|(_, task)| task.in_menu)
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.activated_at)
    }

    fn elapsed_ms(&self) -> i64 {
        i64::try_from(self.elapsed().as_millis()).unwrap_or(i64::MAX)
    }

    /// Whole minutes since the last transition.
    pub fn elapsed_minutes(&self) -> i64 {
        self.elapsed_ms() / MINUTE_MS
    }

    /// Minutes left in the current task; negative once it has run over.
    pub fn remaining_minutes(&self) -> i64 {
        i64::from(self.current_task().minutes) - self.elapsed_minutes()
    }

    /// When the host should call [`Pomodoro::poll`] next, if at all.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.wakeup.deadline()
    }

    pub fn snapshot(&self) -> Snapshot {
        let task = self.current_task();
        Snapshot {
            state: self.state,
            task_index: self.current_task_index,
            task_count: self.tasks.len(),
            task_name: task.name.clone(),
            minutes: task.minutes,
            elapsed_minutes: self.elapsed_minutes(),
            remaining_minutes: self.remaining_minutes(),
            finished: self.finished,
            status: self.to_string(),
            at: Utc::now(),
        }
    }

    // ── Notifications ────────────────────────────────────────────────

    /// Called after every transition.
    pub fn on_state_changed(&mut self, listener: impl FnMut() + Send + 'static) {
        self.state_changed.connect(listener);
    }

    /// Called after every wake-up while running.
    pub fn on_tick(&mut self, listener: impl FnMut() + Send + 'static) {
        self.ticked.connect(listener);
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start (or restart) the current task.
    pub fn start(&mut self) -> Result<()> {
        info!("[{}] Start", self);
        self.transition(State::Running, self.current_task_index)
    }

    /// Start the task at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn start_task(&mut self, index: usize) -> Result<()> {
        assert!(
            index < self.tasks.len(),
            "task index {index} out of range for {} tasks",
            self.tasks.len()
        );
        info!("[{}] Select start", self);
        self.transition(State::Running, index)
    }

    /// Advance to the next task in the cycle, keeping the running state.
    pub fn next(&mut self) -> Result<()> {
        info!("[{}] Next", self);
        let index = (self.current_task_index + 1) % self.tasks.len();
        self.transition(self.state, index)
    }

    /// Stop and rewind to the first task.
    pub fn stop(&mut self) -> Result<()> {
        info!("[{}] Stop", self);
        self.transition(State::Stopped, 0)
    }

    /// Mark the current activation as finished and run its finish hook.
    ///
    /// Does nothing if the activation has already finished.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            debug!("[{}] Already finished", self);
            return Ok(());
        }
        info!("[{}] Finished", self);
        self.finished = true;

        let task = match self.state {
            State::Running => &self.tasks[self.current_task_index],
            State::Stopped => &self.stopped_task,
        };
        self.runner.run(&task.command_finish)?;
        Ok(())
    }

    /// Change the duration of the task at `index`.
    ///
    /// If the engine is running the wake-up is re-armed to check the new
    /// duration right away.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn override_task_minutes(&mut self, index: usize, minutes: u32) {
        assert!(
            index < self.tasks.len(),
            "task index {index} out of range for {} tasks",
            self.tasks.len()
        );
        debug!("Task {} duration set to {} minutes", index + 1, minutes);
        self.tasks[index].minutes = minutes;
        if self.state == State::Running {
            self.wakeup.arm(self.clock.now(), Duration::ZERO);
        }
    }

    // ── Timeout detection ────────────────────────────────────────────

    /// Handle the wake-up if it is due. Returns whether it fired.
    pub fn poll(&mut self) -> Result<bool> {
        if !self.wakeup.is_due(self.clock.now()) {
            return Ok(false);
        }
        self.on_timeout()?;
        Ok(true)
    }

    /// Check the current task for timeout and schedule the next wake-up.
    ///
    /// While stopped this only disarms the wake-up.
    pub fn on_timeout(&mut self) -> Result<()> {
        self.wakeup.disarm();
        if self.state == State::Stopped {
            return Ok(());
        }

        let remaining_ms = self.current_task().duration_ms() - self.elapsed_ms();
        let finished = if !self.finished && remaining_ms <= 0 {
            self.finish()
        } else {
            Ok(())
        };

        let interval = next_wakeup_interval(remaining_ms);
        debug!("Scheduling next update in {} ms", interval.as_millis());
        self.wakeup.arm(self.clock.now(), interval);
        self.ticked.emit();
        finished
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn transition(&mut self, state: State, index: usize) -> Result<()> {
        let leaving = (self.state == State::Running).then_some(self.current_task_index);

        self.state = state;
        self.current_task_index = index;
        self.activated_at = self.clock.now();
        self.finished = false;

        let stopped = match leaving {
            Some(left) => self.runner.run(&self.tasks[left].command_stop),
            None => Ok(()),
        };
        let started = match self.state {
            State::Running => self.runner.run(&self.tasks[index].command_start),
            State::Stopped => Ok(()),
        };

        self.wakeup.arm(self.clock.now(), Duration::ZERO);
        info!("[{}]", self);
        self.state_changed.emit();

        stopped.and(started)?;
        Ok(())
    }
}

impl fmt::Display for Pomodoro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {} {}m {}",
            self.current_task_index + 1,
            self.tasks.len(),
            self.current_task(),
            self.elapsed_minutes(),
            self.state.glyph()
        )
    }
}

impl fmt::Debug for Pomodoro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pomodoro")
            .field("state", &self.state)
            .field("current_task_index", &self.current_task_index)
            .field("tasks", &self.tasks.len())
            .field("finished", &self.finished)
            .field("wakeup", &self.wakeup)
            .finish_non_exhaustive()
    }
}
