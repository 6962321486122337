//! Builds the ordered task cycle from configuration records.
//!
//! Records are applied onto one template per task name. A record only
//! carries the fields it overrides; the rest come from the template, which
//! keeps whatever the previous record with that name wrote into it.

use indexmap::IndexMap;
use tracing::warn;

use super::{
    default_stopped_task, make_break_task, make_focus_task, Appearance, Task, BREAK_TASK_NAME,
    FOCUS_TASK_NAME,
};
use crate::error::ConfigError;
use crate::storage::Settings;

/// Number of focus/short-break pairs before the focus/long-break pair.
pub const SHORT_BREAK_COUNT: usize = 3;

/// The built-in cycle used when the configuration defines no tasks.
pub fn default_pomodoro_tasks() -> Vec<Task> {
    let focus = make_focus_task(25);
    let short_break = make_break_task(5, false);
    let long_break = make_break_task(30, true);

    let mut tasks = Vec::with_capacity(SHORT_BREAK_COUNT * 2 + 2);
    for _ in 0..SHORT_BREAK_COUNT {
        tasks.push(focus.clone());
        tasks.push(short_break.clone());
    }
    tasks.push(focus);
    tasks.push(long_break);
    tasks
}

/// Field overrides for a single task, as read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRecord {
    /// Where the record came from, e.g. `tasks[2]`. Prefixes keys in errors.
    pub origin: String,
    fields: IndexMap<String, String>,
}

impl TaskRecord {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// A field value, treating empty strings as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn qualified(&self, key: &str) -> String {
        if self.origin.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.origin, key)
        }
    }
}

/// Every key a task record may carry.
pub fn task_keys() -> impl Iterator<Item = String> {
    Task::KEYS
        .iter()
        .map(|k| k.to_string())
        .chain(Appearance::KEYS.iter().map(|k| k.to_string()))
        .chain(Appearance::KEYS.iter().map(|k| format!("timeout_{k}")))
}

/// Read the records of array section `section` from `settings`.
pub fn read_task_records(settings: &dyn Settings, section: &str) -> Vec<TaskRecord> {
    (0..settings.array_len(section))
        .map(|index| {
            let mut record = TaskRecord::new(format!("{section}[{index}]"));
            for key in task_keys() {
                if let Some(value) = settings.array_value(section, index, &key) {
                    record.insert(key, value);
                }
            }
            record
        })
        .collect()
}

/// Read the single-task group `group` from `settings`.
pub fn read_group_record(settings: &dyn Settings, group: &str) -> TaskRecord {
    let mut record = TaskRecord::new(group);
    for key in task_keys() {
        if let Some(value) = settings.group_value(group, &key) {
            record.insert(key, value);
        }
    }
    record
}

/// Build the task cycle. An empty record list yields the default cycle.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for the first malformed field; no
/// partial list is returned.
pub fn build_task_list(records: &[TaskRecord]) -> Result<Vec<Task>, ConfigError> {
    if records.is_empty() {
        return Ok(default_pomodoro_tasks());
    }

    let mut templates: IndexMap<String, Task> = IndexMap::new();
    templates.insert(FOCUS_TASK_NAME.into(), make_focus_task(25));
    templates.insert(BREAK_TASK_NAME.into(), make_break_task(5, false));

    records
        .iter()
        .map(|record| read_task(record, &mut templates))
        .collect()
}

/// Build the stopped task from the optional `[stopped]` group.
pub fn build_stopped_task(record: &TaskRecord) -> Result<Task, ConfigError> {
    let mut task = default_stopped_task();
    apply_record(&mut task, record)?;
    Ok(task)
}

fn read_task(
    record: &TaskRecord,
    templates: &mut IndexMap<String, Task>,
) -> Result<Task, ConfigError> {
    let name = record.get("name").unwrap_or(FOCUS_TASK_NAME);
    let template = templates
        .entry(name.to_string())
        .or_insert_with(|| Task::named(name));
    apply_record(template, record)?;
    Ok(template.clone())
}

fn apply_record(task: &mut Task, record: &TaskRecord) -> Result<(), ConfigError> {
    for (key, value) in &record.fields {
        if value.is_empty() {
            continue;
        }
        if !task.set(key, value, &record.qualified(key))? {
            warn!("Ignoring unknown task field '{}'", record.qualified(key));
        }
    }
    Ok(())
}
