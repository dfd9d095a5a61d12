use std::path::Path;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::TimetableError;
use crate::models::{parse_time, TimeAxis};

/// Timetable settings.
#[derive(Debug, Deserialize, Clone)]
pub struct TimetableConfig {
    /// Base URL of the assignment collection.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Slot axis shape.
    #[serde(default)]
    pub axis: AxisConfig,
    /// Displayed week.
    #[serde(default)]
    pub week: WeekConfig,
    /// Rooms offered by the form. Not derived from assignments.
    #[serde(default = "default_rooms")]
    pub rooms: Vec<String>,
}

/// Hourly blocks split into two sub-slots.
#[derive(Debug, Deserialize, Clone)]
pub struct AxisConfig {
    /// `HH:mm` start of the first block.
    #[serde(default = "default_first_start")]
    pub first_start: String,
    /// Number of one-hour blocks.
    #[serde(default = "default_hours")]
    pub hours: usize,
    /// Length of a block's first sub-slot.
    #[serde(default = "default_sub_slot_minutes")]
    pub sub_slot_minutes: i64,
}

/// Week display settings.
#[derive(Debug, Deserialize, Clone)]
pub struct WeekConfig {
    /// Days shown from Monday.
    #[serde(default = "default_days")]
    pub days: usize,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            axis: AxisConfig::default(),
            week: WeekConfig::default(),
            rooms: default_rooms(),
        }
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            first_start: default_first_start(),
            hours: default_hours(),
            sub_slot_minutes: default_sub_slot_minutes(),
        }
    }
}

impl Default for WeekConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:5000/assignments".to_string()
}

fn default_first_start() -> String {
    "08:30".to_string()
}

fn default_hours() -> usize {
    10
}

fn default_sub_slot_minutes() -> i64 {
    30
}

fn default_days() -> usize {
    6
}

fn default_rooms() -> Vec<String> {
    Vec::new()
}

impl TimetableConfig {
    /// Loads from an optional TOML file, then `TIMETABLE__*` environment
    /// variables (e.g. `TIMETABLE__AXIS__HOURS=8`).
    pub fn load(path: Option<&Path>) -> Result<Self, TimetableError> {
        let mut builder = ConfigBuilder::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("TIMETABLE")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("rooms")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Parses TOML text.
    pub fn from_toml(text: &str) -> Result<Self, TimetableError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Builds the validated time axis.
    pub fn time_axis(&self) -> Result<TimeAxis, TimetableError> {
        TimeAxis::hourly(
            parse_time(&self.axis.first_start)?,
            self.axis.hours,
            self.axis.sub_slot_minutes,
        )
    }
}
