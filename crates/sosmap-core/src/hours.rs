//! Operating-hours representations and time-token handling.
//!
//! Upstream feeds describe schedules in two shapes: a keyed-by-day mapping
//! (`mon`..`sun` plus `hol`, each holding `"HHMM-HHMM"`) and per-day-index
//! raw token pairs (`dutyTime1s`/`dutyTime1c` .. `dutyTime8s`/`dutyTime8c`).
//! [`OperatingHours`] models both; the ingestion layer normalizes every feed
//! into one of the two before a record reaches the status engine.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Minutes in a full day; the parsed value of the `"2400"` close sentinel.
pub const DAY_END_MINUTES: u16 = 1440;

/// Parses a compact `"HMM"`/`"HHMM"` time token into minutes since midnight.
///
/// The single special value `"2400"` means end-of-day and parses to 1440.
/// Returns `None` for anything else with hours > 23 (including `"2401"`),
/// minutes > 59, a length other than 3 or 4, or non-digit characters.
#[must_use]
pub fn parse_time_token(token: &str) -> Option<u16> {
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token.len() != 3 && token.len() != 4 {
        return None;
    }

    let padded = if token.len() == 3 {
        format!("0{token}")
    } else {
        token.to_owned()
    };
    let hours: u16 = padded[..2].parse().ok()?;
    let minutes: u16 = padded[2..4].parse().ok()?;

    if hours == 24 && minutes == 0 {
        return Some(DAY_END_MINUTES);
    }
    if hours > 23 || minutes > 59 {
        return None;
    }

    Some(hours * 60 + minutes)
}

/// Renders a compact time token as `"HH:MM"` for display, zero-padding
/// 3-character tokens. Unparseable input renders as `"--:--"`.
#[must_use]
pub fn format_time_token(token: &str) -> String {
    if (token.len() != 3 && token.len() != 4) || !token.bytes().all(|b| b.is_ascii_digit()) {
        return "--:--".to_owned();
    }

    let padded = if token.len() == 3 {
        format!("0{token}")
    } else {
        token.to_owned()
    };
    format!("{}:{}", &padded[..2], &padded[2..4])
}

/// A facility's declared schedule, in one of the two upstream shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "lowercase")]
pub enum OperatingHours {
    /// Keyed-by-day mapping, the shape the pharmacy sync stores.
    Weekly(WeeklyHours),
    /// Per-day-index raw token pairs, as delivered by the emergency feeds.
    Duty(DutyHours),
}

/// Day-keyed schedule: each day holds `"HHMM-HHMM"` or nothing.
///
/// `hol` is the holiday entry some feeds supply. It is stored for display
/// but never consulted by the status engine, which derives the lookup day
/// from the weekday alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hol: Option<String>,
}

impl WeeklyHours {
    /// Returns the `"open-close"` range string for the given weekday, if any.
    #[must_use]
    pub fn for_weekday(&self, weekday: Weekday) -> Option<&str> {
        let entry = match weekday {
            Weekday::Mon => &self.mon,
            Weekday::Tue => &self.tue,
            Weekday::Wed => &self.wed,
            Weekday::Thu => &self.thu,
            Weekday::Fri => &self.fri,
            Weekday::Sat => &self.sat,
            Weekday::Sun => &self.sun,
        };
        entry.as_deref()
    }
}

/// One raw open/close token pair from the per-index feed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutySlot {
    pub open: String,
    pub close: String,
}

/// Per-day-index schedule: slots 1 (Monday) .. 7 (Sunday), slot 8 holiday.
///
/// Slot 8 is carried from the feed but never consulted by the status
/// engine; there is no holiday calendar to map a date onto it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyHours {
    pub slots: [Option<DutySlot>; 8],
}

impl DutyHours {
    /// Returns the slot at the given 1-based feed index (1..=8).
    #[must_use]
    pub fn slot(&self, index: u8) -> Option<&DutySlot> {
        let position = usize::from(index).checked_sub(1)?;
        self.slots.get(position)?.as_ref()
    }

    /// Returns the slot for a weekday, mapping Monday..Sunday to 1..7.
    #[must_use]
    pub fn for_weekday(&self, weekday: Weekday) -> Option<&DutySlot> {
        let index = u8::try_from(weekday.number_from_monday()).ok()?;
        self.slot(index)
    }
}
