//! Task model: one phase of the pomodoro cycle.
//!
//! A [`Task`] carries its duration, the shell hooks fired on transitions and
//! the appearance used by renderers. The engine only reads `minutes` and the
//! command fields; everything else is passed through untouched.

pub mod builder;

use serde::Serialize;
use std::fmt;

use crate::error::ConfigError;

pub use builder::{
    build_stopped_task, build_task_list, default_pomodoro_tasks, read_group_record,
    read_task_records, TaskRecord,
};

pub const DEFAULT_ICON_FONT: &str = "Overpass ExtraBold";
pub const FOCUS_TASK_NAME: &str = "focus";
pub const BREAK_TASK_NAME: &str = "break";
pub const STOPPED_TASK_NAME: &str = "stopped";

/// Visual attributes of a task icon. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appearance {
    pub color: String,
    pub text_color: String,
    pub line_color: String,
    /// Percent of the icon size.
    pub line_width: u32,
    /// Font family, optionally followed by `;` and a style name.
    pub font: String,
    /// Path to an image drawn instead of the rounded rectangle.
    pub image: String,
    pub icon_padding: u32,
    pub icon_radius: u32,
    pub text_size: u32,
    pub text_x: i32,
    pub text_y: i32,
    pub text_stroke_color: String,
    pub text_stroke_width: u32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            color: "#007ba7".into(),
            text_color: "white".into(),
            line_color: "transparent".into(),
            line_width: 0,
            font: DEFAULT_ICON_FONT.into(),
            image: String::new(),
            icon_padding: 4,
            icon_radius: 25,
            text_size: 85,
            text_x: 0,
            text_y: 0,
            text_stroke_color: "black".into(),
            text_stroke_width: 0,
        }
    }
}

impl Appearance {
    /// Field names accepted by [`Appearance::set`].
    pub const KEYS: [&'static str; 13] = [
        "color",
        "text_color",
        "line_color",
        "line_width",
        "font",
        "image",
        "icon_padding",
        "icon_radius",
        "text_size",
        "text_x",
        "text_y",
        "text_stroke_color",
        "text_stroke_width",
    ];

    /// Set a field from its textual configuration value.
    ///
    /// Returns `Ok(false)` when `key` is not an appearance field. `config_key`
    /// is the fully qualified key reported in errors.
    pub fn set(&mut self, key: &str, value: &str, config_key: &str) -> Result<bool, ConfigError> {
        match key {
            "color" => self.color = value.to_string(),
            "text_color" => self.text_color = value.to_string(),
            "line_color" => self.line_color = value.to_string(),
            "line_width" => self.line_width = parse_number(config_key, value)?,
            "font" => self.font = value.to_string(),
            "image" => self.image = value.to_string(),
            "icon_padding" => self.icon_padding = parse_number(config_key, value)?,
            "icon_radius" => self.icon_radius = parse_number(config_key, value)?,
            "text_size" => self.text_size = parse_number(config_key, value)?,
            "text_x" => self.text_x = parse_number(config_key, value)?,
            "text_y" => self.text_y = parse_number(config_key, value)?,
            "text_stroke_color" => self.text_stroke_color = value.to_string(),
            "text_stroke_width" => self.text_stroke_width = parse_number(config_key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// One phase of the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Identity key for configuration templates.
    pub name: String,
    /// Duration in minutes. Zero means the task is timed out as soon as it starts.
    pub minutes: u32,
    /// Whether the task is directly selectable from a menu.
    pub in_menu: bool,
    pub command_start: String,
    pub command_stop: String,
    pub command_finish: String,
    pub animated: bool,
    pub appearance: Appearance,
    /// Appearance once `minutes` have elapsed.
    pub timeout_appearance: Appearance,
}

impl Task {
    /// Field names accepted by [`Task::set`] besides the appearance ones.
    pub const KEYS: [&'static str; 7] = [
        "name",
        "minutes",
        "in_menu",
        "command_start",
        "command_stop",
        "command_finish",
        "animated",
    ];

    /// A task with the focus look and the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..make_focus_task(25)
        }
    }

    /// Set a field from its textual configuration value.
    ///
    /// `timeout_<field>` keys address [`Task::timeout_appearance`]. Returns
    /// `Ok(false)` for unknown keys.
    pub fn set(&mut self, key: &str, value: &str, config_key: &str) -> Result<bool, ConfigError> {
        match key {
            "name" => self.name = value.to_string(),
            "minutes" => self.minutes = parse_number(config_key, value)?,
            "in_menu" => self.in_menu = to_bool(value),
            "command_start" => self.command_start = value.to_string(),
            "command_stop" => self.command_stop = value.to_string(),
            "command_finish" => self.command_finish = value.to_string(),
            "animated" => self.animated = to_bool(value),
            _ => {
                return match key.strip_prefix("timeout_") {
                    Some(field) => self.timeout_appearance.set(field, value, config_key),
                    None => self.appearance.set(key, value, config_key),
                }
            }
        }
        Ok(true)
    }

    /// Read-only view with the regular appearance.
    pub fn view(&self) -> TaskView<'_> {
        TaskView {
            name: &self.name,
            minutes: self.minutes,
            in_menu: self.in_menu,
            animated: self.animated,
            appearance: &self.appearance,
        }
    }

    /// Read-only view with the `timeout_*` appearance swapped in.
    pub fn as_timed_out(&self) -> TaskView<'_> {
        TaskView {
            appearance: &self.timeout_appearance,
            ..self.view()
        }
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        i64::from(self.minutes) * 60_000
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.minutes)
    }
}

/// What a renderer needs to draw a task in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskView<'a> {
    pub name: &'a str,
    pub minutes: u32,
    pub in_menu: bool,
    pub animated: bool,
    pub appearance: &'a Appearance,
}

pub fn make_focus_task(minutes: u32) -> Task {
    let appearance = Appearance::default();
    let timeout_appearance = Appearance {
        color: "#ff0040".into(),
        ..appearance.clone()
    };
    Task {
        name: FOCUS_TASK_NAME.into(),
        minutes,
        in_menu: true,
        command_start: String::new(),
        command_stop: String::new(),
        command_finish: String::new(),
        animated: false,
        appearance,
        timeout_appearance,
    }
}

pub fn make_break_task(minutes: u32, in_menu: bool) -> Task {
    let appearance = Appearance {
        color: "#de3163".into(),
        ..Appearance::default()
    };
    let timeout_appearance = Appearance {
        color: "white".into(),
        text_color: "#de3163".into(),
        ..appearance.clone()
    };
    Task {
        name: BREAK_TASK_NAME.into(),
        minutes,
        in_menu,
        animated: true,
        appearance,
        timeout_appearance,
        ..make_focus_task(minutes)
    }
}

/// The task shown while the engine is stopped.
pub fn default_stopped_task() -> Task {
    let appearance = Appearance {
        color: "#ff0040".into(),
        text_color: "white".into(),
        ..Appearance::default()
    };
    Task {
        name: STOPPED_TASK_NAME.into(),
        in_menu: false,
        timeout_appearance: appearance.clone(),
        appearance,
        ..make_focus_task(25)
    }
}

/// Parse a configuration boolean. Anything but `true`, `1`, `yes` or `on`
/// (case-insensitive) is false.
pub fn to_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse '{value}' as a number: {e}"),
        })
}
