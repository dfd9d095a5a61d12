//! Time axis model.
//!
//! The axis partitions a work day into hour blocks, each split into two
//! sub-slots. Flattened, the sub-slots form the columns of the timetable grid.
//!
//! # Time Model
//! Times are wall-clock `NaiveTime` values serialized as zero-padded `HH:mm`.
//! Slots are half-open: `[start_time, end_time)`.
//!
//! # Lookups
//! Boundary lookups return `Option<usize>`. A boundary that is not on the
//! axis is a lookup miss, never an error; callers decide how to degrade.

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::TimetableError;

/// A single grid column `[start_time, end_time)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Slot start (inclusive).
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Slot end (exclusive).
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl TimeSlot {
    /// Creates a new slot.
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// Length of the slot in minutes.
    #[inline]
    pub fn minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Closed containment: the slot lies within `[start, end]`.
    #[inline]
    pub fn is_within(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time >= start && self.end_time <= end
    }
}

/// A header block holding exactly two sub-slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourBlock {
    /// Block start.
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Block end.
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// The two halves of the block.
    pub sub_hours: [TimeSlot; 2],
}

impl HourBlock {
    /// Creates a block split into two sub-slots of `sub_slot_minutes` each.
    ///
    /// Returns `None` if the block would run past midnight.
    pub fn split(start_time: NaiveTime, sub_slot_minutes: i64) -> Option<Self> {
        let step = TimeDelta::minutes(sub_slot_minutes);
        let middle = add_within_day(start_time, step)?;
        let end_time = add_within_day(middle, step)?;
        Some(Self {
            start_time,
            end_time,
            sub_hours: [
                TimeSlot::new(start_time, middle),
                TimeSlot::new(middle, end_time),
            ],
        })
    }

    /// Header label, e.g. `08:30 - 09:30`.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format(hhmm::FORMAT),
            self.end_time.format(hhmm::FORMAT)
        )
    }
}

/// The ordered, immutable partition of the operating day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<HourBlock>", into = "Vec<HourBlock>")]
pub struct TimeAxis {
    blocks: Vec<HourBlock>,
    slots: Vec<TimeSlot>,
}

impl TimeAxis {
    /// Creates an axis from hour blocks.
    ///
    /// # Errors
    /// `InvalidAxis` if a slot is empty or reversed, if the two sub-slots do
    /// not tile their block, or if consecutive blocks leave a gap or overlap.
    pub fn new(blocks: Vec<HourBlock>) -> Result<Self, TimetableError> {
        for block in &blocks {
            let [first, second] = &block.sub_hours;
            if first.start_time != block.start_time
                || first.end_time != second.start_time
                || second.end_time != block.end_time
            {
                return Err(TimetableError::InvalidAxis(format!(
                    "sub-slots do not tile block {}",
                    block.label()
                )));
            }
        }

        let slots: Vec<TimeSlot> = blocks.iter().flat_map(|b| b.sub_hours).collect();

        if let Some(slot) = slots.iter().find(|s| s.start_time >= s.end_time) {
            return Err(TimetableError::InvalidAxis(format!(
                "empty or reversed slot starting at {}",
                slot.start_time.format(hhmm::FORMAT)
            )));
        }
        for pair in slots.windows(2) {
            if pair[0].end_time != pair[1].start_time {
                return Err(TimetableError::InvalidAxis(format!(
                    "slots are not contiguous at {}",
                    pair[0].end_time.format(hhmm::FORMAT)
                )));
            }
        }

        Ok(Self { blocks, slots })
    }

    /// Builds `hours` consecutive blocks starting at `first_start`, each made
    /// of two sub-slots of `sub_slot_minutes`.
    pub fn hourly(
        first_start: NaiveTime,
        hours: usize,
        sub_slot_minutes: i64,
    ) -> Result<Self, TimetableError> {
        if sub_slot_minutes <= 0 {
            return Err(TimetableError::InvalidAxis(format!(
                "sub-slot length must be positive, got {sub_slot_minutes}"
            )));
        }

        let mut blocks = Vec::with_capacity(hours);
        let mut start = first_start;
        for _ in 0..hours {
            let block = HourBlock::split(start, sub_slot_minutes).ok_or_else(|| {
                TimetableError::InvalidAxis(format!(
                    "block starting at {} runs past midnight",
                    start.format(hhmm::FORMAT)
                ))
            })?;
            start = block.end_time;
            blocks.push(block);
        }
        Self::new(blocks)
    }

    /// The hour blocks, in order.
    pub fn blocks(&self) -> &[HourBlock] {
        &self.blocks
    }

    /// Flattened sub-slots, two per block.
    pub fn flatten(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Number of grid columns.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Index of the slot starting at `time`.
    pub fn index_of_start(&self, time: NaiveTime) -> Option<usize> {
        self.slots.iter().position(|s| s.start_time == time)
    }

    /// Index of the slot ending at `time`.
    pub fn index_of_end(&self, time: NaiveTime) -> Option<usize> {
        self.slots.iter().position(|s| s.end_time == time)
    }

    /// Whether both boundaries fall on the axis.
    pub fn contains_boundaries(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.index_of_start(start).is_some() && self.index_of_end(end).is_some()
    }

    /// Choices for the start-time selector.
    pub fn start_options(&self) -> Vec<NaiveTime> {
        self.slots.iter().map(|s| s.start_time).collect()
    }

    /// Choices for the end-time selector.
    pub fn end_options(&self) -> Vec<NaiveTime> {
        self.slots.iter().map(|s| s.end_time).collect()
    }

    /// One `HH:mm - HH:mm` label per block.
    pub fn header_labels(&self) -> Vec<String> {
        self.blocks.iter().map(HourBlock::label).collect()
    }
}

impl TryFrom<Vec<HourBlock>> for TimeAxis {
    type Error = TimetableError;

    fn try_from(blocks: Vec<HourBlock>) -> Result<Self, Self::Error> {
        Self::new(blocks)
    }
}

impl From<TimeAxis> for Vec<HourBlock> {
    fn from(axis: TimeAxis) -> Self {
        axis.blocks
    }
}

fn add_within_day(time: NaiveTime, delta: TimeDelta) -> Option<NaiveTime> {
    let (next, wrapped) = time.overflowing_add_signed(delta);
    (wrapped == 0).then_some(next)
}

/// Parses a `HH:mm` string.
pub fn parse_time(value: &str) -> Result<NaiveTime, TimetableError> {
    NaiveTime::parse_from_str(value, hhmm::FORMAT)
        .map_err(|e| TimetableError::InvalidTime(format!("{value}: {e}")))
}

/// Serde helpers for `HH:mm` wall-clock strings.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Zero-padded 24h format.
    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }

    /// Same as the parent module, for optional fields.
    pub mod option {
        use super::FORMAT;
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => serializer.collect_str(&t.format(FORMAT)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if raw.is_empty() => Ok(None),
                Some(raw) => NaiveTime::parse_from_str(&raw, FORMAT)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
