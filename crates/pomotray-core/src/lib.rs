//! # pomotray core library
//!
//! The scheduling engine behind the pomotray timer: an ordered cycle of
//! focus and break tasks, a Stopped/Running state machine with minute-level
//! timeout detection, and shell hooks fired on every transition. Rendering
//! (tray icons, menus) lives in the hosts that consume this crate.
//!
//! ## Architecture
//!
//! - **Task model**: [`Task`] plus the builder that turns configuration
//!   records into the cycle
//! - **Engine**: [`Pomodoro`], a caller-driven state machine owning a
//!   one-shot wake-up
//! - **Driver**: [`timer::spawn`] hosts an engine on a tokio task
//! - **Hooks**: [`CommandRunner`] executes `command_start`/`command_stop`/
//!   `command_finish`
//! - **Storage**: TOML [`Config`] behind the [`Settings`] reader trait

pub mod command;
pub mod error;
pub mod events;
pub mod storage;
pub mod task;
pub mod timer;

pub use command::{CommandRunner, ShellRunner};
pub use error::{CommandError, ConfigError, CoreError};
pub use events::{Signal, Snapshot};
pub use storage::{Config, Settings, TomlSettings};
pub use task::{Appearance, Task, TaskRecord, TaskView};
pub use timer::{EngineHandle, Pomodoro, State};
