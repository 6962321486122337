//! TOML-based application configuration.
//!
//! Recognized keys:
//! - `autostart` (bool, default `true`): start the first task on launch
//! - `[[tasks]]`: the task cycle, one table per task
//! - `[stopped]`: overrides for the task shown while stopped
//!
//! Configuration is stored at `~/.config/pomotray/config.toml`.
//!
//! ```toml
//! autostart = false
//!
//! [[tasks]]
//! name = "focus"
//! minutes = 50
//! command_start = "notify-send 'Focus'"
//!
//! [[tasks]]
//! name = "break"
//! minutes = 10
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::task::{
    build_stopped_task, build_task_list, default_pomodoro_tasks, default_stopped_task,
    read_group_record, read_task_records, to_bool, Task,
};

pub const TASKS_SECTION: &str = "tasks";
pub const STOPPED_GROUP: &str = "stopped";
pub const AUTOSTART_KEY: &str = "autostart";

/// Read access to a key/value configuration store.
///
/// Values are returned as text; typed parsing is done by the consumer so
/// malformed values can be reported with their key.
pub trait Settings {
    /// Identifier used in diagnostics, usually a file path.
    fn name(&self) -> &str;

    /// Top-level value.
    fn value(&self, key: &str) -> Option<String>;

    fn value_or(&self, key: &str, default: &str) -> String {
        self.value(key).unwrap_or_else(|| default.to_string())
    }

    /// Number of entries in an array section.
    fn array_len(&self, section: &str) -> usize;

    /// Field `key` of entry `index` in an array section.
    fn array_value(&self, section: &str, index: usize, key: &str) -> Option<String>;

    /// Field `key` of a named group.
    fn group_value(&self, group: &str, key: &str) -> Option<String>;
}

/// [`Settings`] backed by a parsed TOML document.
#[derive(Debug, Clone, Default)]
pub struct TomlSettings {
    name: String,
    root: toml::Table,
}

impl TomlSettings {
    /// Settings with no keys; every lookup falls back to defaults.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: toml::Table::new(),
        }
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or if `tasks` is
    /// not an array of tables or `stopped` is not a table.
    pub fn parse(name: impl Into<String>, content: &str) -> Result<Self, ConfigError> {
        let root: toml::Table = content.parse()?;

        if let Some(tasks) = root.get(TASKS_SECTION) {
            let valid = tasks
                .as_array()
                .is_some_and(|items| items.iter().all(toml::Value::is_table));
            if !valid {
                return Err(ConfigError::InvalidValue {
                    key: TASKS_SECTION.into(),
                    message: "expected an array of tables ([[tasks]])".into(),
                });
            }
        }
        if let Some(stopped) = root.get(STOPPED_GROUP) {
            if !stopped.is_table() {
                return Err(ConfigError::InvalidValue {
                    key: STOPPED_GROUP.into(),
                    message: "expected a table ([stopped])".into(),
                });
            }
        }

        Ok(Self {
            name: name.into(),
            root,
        })
    }

    /// Load from `path`. A missing file yields empty settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let name = path.display().to_string();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(name, &content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::empty(name)),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    fn array_entry(&self, section: &str, index: usize) -> Option<&toml::Table> {
        self.root
            .get(section)?
            .as_array()?
            .get(index)?
            .as_table()
    }
}

impl Settings for TomlSettings {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self, key: &str) -> Option<String> {
        self.root.get(key).and_then(value_to_string)
    }

    fn array_len(&self, section: &str) -> usize {
        self.root
            .get(section)
            .and_then(toml::Value::as_array)
            .map_or(0, Vec::len)
    }

    fn array_value(&self, section: &str, index: usize, key: &str) -> Option<String> {
        self.array_entry(section, index)?
            .get(key)
            .and_then(value_to_string)
    }

    fn group_value(&self, group: &str, key: &str) -> Option<String> {
        self.root
            .get(group)?
            .as_table()?
            .get(key)
            .and_then(value_to_string)
    }
}

fn value_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

/// Everything the engine needs at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub autostart: bool,
    pub tasks: Vec<Task>,
    pub stopped_task: Task,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autostart: true,
            tasks: default_pomodoro_tasks(),
            stopped_task: default_stopped_task(),
        }
    }
}

impl Config {
    /// Build the configuration from a settings store.
    ///
    /// # Errors
    ///
    /// Returns the first malformed task field; nothing is partially applied.
    pub fn from_settings(settings: &dyn Settings) -> Result<Self, ConfigError> {
        let records = read_task_records(settings, TASKS_SECTION);
        let tasks = build_task_list(&records)?;
        let stopped_task = build_stopped_task(&read_group_record(settings, STOPPED_GROUP))?;
        let autostart = to_bool(&settings.value_or(AUTOSTART_KEY, "true"));

        Ok(Self {
            autostart,
            tasks,
            stopped_task,
        })
    }

    /// Default location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/pomotray"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from `path`, or from [`Config::path`] when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is unreadable or malformed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };
        let settings = TomlSettings::load(&path)?;
        Self::from_settings(&settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(content: &str) -> TomlSettings {
        TomlSettings::parse("test.toml", content).unwrap()
    }

    #[test]
    fn empty_settings_give_defaults() {
        let cfg = Config::from_settings(&TomlSettings::empty("none")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn autostart_is_read_loosely() {
        assert!(!Config::from_settings(&settings("autostart = false")).unwrap().autostart);
        assert!(!Config::from_settings(&settings("autostart = \"0\"")).unwrap().autostart);
        assert!(Config::from_settings(&settings("autostart = \"on\"")).unwrap().autostart);
    }

    #[test]
    fn typed_and_string_values_are_equivalent() {
        let a = Config::from_settings(&settings("[[tasks]]\nminutes = 30\nin_menu = false")).unwrap();
        let b =
            Config::from_settings(&settings("[[tasks]]\nminutes = \"30\"\nin_menu = \"no\"")).unwrap();
        assert_eq!(a.tasks, b.tasks);
        assert_eq!(a.tasks[0].minutes, 30);
    }

    #[test]
    fn float_minutes_are_rejected() {
        let err = Config::from_settings(&settings("[[tasks]]\nminutes = 2.5")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "tasks[0].minutes"));
    }

    #[test]
    fn stopped_group_is_applied() {
        let cfg = Config::from_settings(&settings("[stopped]\ncolor = \"gray\"")).unwrap();
        assert_eq!(cfg.stopped_task.appearance.color, "gray");
    }

    #[test]
    fn array_lookups() {
        let s = settings(
            r#"
            [[tasks]]
            name = "a"
            [[tasks]]
            name = "b"
            minutes = 3
            "#,
        );
        assert_eq!(s.array_len("tasks"), 2);
        assert_eq!(s.array_value("tasks", 1, "minutes").as_deref(), Some("3"));
        assert_eq!(s.array_value("tasks", 0, "minutes"), None);
        assert_eq!(s.array_value("tasks", 5, "name"), None);
        assert_eq!(s.array_len("missing"), 0);
    }

    #[test]
    fn malformed_sections_are_rejected() {
        assert!(TomlSettings::parse("x", "tasks = 3").is_err());
        assert!(TomlSettings::parse("x", "tasks = [1, 2]").is_err());
        assert!(TomlSettings::parse("x", "stopped = \"red\"").is_err());
        assert!(TomlSettings::parse("x", "autostart = ").is_err());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let s = TomlSettings::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(s.array_len("tasks"), 0);
        assert!(s.name().ends_with("nope.toml"));
    }

    #[test]
    fn load_reports_path_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[tasks]\n").unwrap();
        match Config::load(Some(&path)).unwrap_err() {
            ConfigError::LoadFailed { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
