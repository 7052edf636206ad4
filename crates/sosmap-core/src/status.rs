//! Real-time open/closed status derived from a facility's declared hours.
//!
//! The engine never fails: malformed or missing schedule data resolves to
//! [`StatusKind::Unknown`], so every record always has a displayable badge.
//! The reference time is an explicit parameter so status is deterministic
//! under test and per-request on the server.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::facility::{FacilityCategory, FacilityRecord};
use crate::hours::{format_time_token, parse_time_token, OperatingHours};

/// Minutes before a transition at which "closing soon" / "opening soon"
/// kicks in.
pub const SOON_WINDOW_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusKind {
    Open,
    ClosingSoon,
    OpeningSoon,
    Closed,
    Unknown,
}

/// Display-ready status for one facility at one instant.
///
/// `closes_at` is set for `Open`/`ClosingSoon`, `opens_at` for
/// `OpeningSoon`/`Closed`; never both. `Unknown` and the 24-hour fast path
/// carry neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessStatus {
    #[serde(rename = "status")]
    pub kind: StatusKind,
    pub message: String,
    pub color: &'static str,
    pub text_color: &'static str,
    pub icon: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closes_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opens_at: Option<String>,
}

const GREEN: &str = "#10B981";
const GREEN_TEXT: &str = "#059669";
const AMBER: &str = "#F59E0B";
const AMBER_TEXT: &str = "#D97706";
const BLUE: &str = "#3B82F6";
const BLUE_TEXT: &str = "#2563EB";
const RED: &str = "#EF4444";
const RED_TEXT: &str = "#DC2626";
const GRAY: &str = "#9CA3AF";
const GRAY_TEXT: &str = "#6B7280";

impl BusinessStatus {
    fn open_24h() -> Self {
        Self {
            kind: StatusKind::Open,
            message: "open 24 hours".to_owned(),
            color: GREEN,
            text_color: GREEN_TEXT,
            icon: "\u{1f7e2}",
            closes_at: None,
            opens_at: None,
        }
    }

    fn unknown(message: &str) -> Self {
        Self {
            kind: StatusKind::Unknown,
            message: message.to_owned(),
            color: GRAY,
            text_color: GRAY_TEXT,
            icon: "\u{26aa}",
            closes_at: None,
            opens_at: None,
        }
    }

    fn open_until(close_token: &str) -> Self {
        let closes_at = format_time_token(close_token);
        Self {
            kind: StatusKind::Open,
            message: format!("open (until {closes_at})"),
            color: GREEN,
            text_color: GREEN_TEXT,
            icon: "\u{1f7e2}",
            closes_at: Some(closes_at),
            opens_at: None,
        }
    }

    fn closing_soon(close_token: &str) -> Self {
        let closes_at = format_time_token(close_token);
        Self {
            kind: StatusKind::ClosingSoon,
            message: format!("closing soon ({closes_at})"),
            color: AMBER,
            text_color: AMBER_TEXT,
            icon: "\u{1f7e1}",
            closes_at: Some(closes_at),
            opens_at: None,
        }
    }

    fn opening_soon(open_token: &str) -> Self {
        let opens_at = format_time_token(open_token);
        Self {
            kind: StatusKind::OpeningSoon,
            message: format!("opening soon ({opens_at})"),
            color: BLUE,
            text_color: BLUE_TEXT,
            icon: "\u{1f535}",
            closes_at: None,
            opens_at: Some(opens_at),
        }
    }

    fn closed_until(open_token: &str) -> Self {
        let opens_at = format_time_token(open_token);
        Self {
            kind: StatusKind::Closed,
            message: format!("closed (opens {opens_at})"),
            color: RED,
            text_color: RED_TEXT,
            icon: "\u{1f534}",
            closes_at: None,
            opens_at: Some(opens_at),
        }
    }
}

/// Computes a facility's status at `now` (local wall-clock time).
///
/// The window check is same-day only: `open <= now < close`. Overnight
/// schedules where the close token is numerically below the open token
/// (e.g. 2200-0600) therefore resolve as closed for most of the day. The
/// upstream data does not say whether such rows mean a wrap to the next
/// day or a data error, so the behavior is kept as-is.
#[must_use]
pub fn facility_status(record: &FacilityRecord, now: NaiveDateTime) -> BusinessStatus {
    // One feed marks round-the-clock pharmacies with a literal "0000"
    // Monday open token rather than the flag.
    let duty_always_open_marker = matches!(
        record.hours.as_ref(),
        Some(OperatingHours::Duty(duty)) if duty.slot(1).is_some_and(|s| s.open == "0000")
    );
    if record.is_24h || duty_always_open_marker {
        return BusinessStatus::open_24h();
    }

    let weekday = now.date().weekday();
    let tokens = match record.hours.as_ref() {
        Some(OperatingHours::Weekly(weekly)) => weekly
            .for_weekday(weekday)
            .and_then(|range| range.split_once('-'))
            .map(|(open, close)| (open.to_owned(), close.to_owned())),
        Some(OperatingHours::Duty(duty)) => duty
            .for_weekday(weekday)
            .map(|slot| (slot.open.clone(), slot.close.clone())),
        None => None,
    };

    let Some((open_token, close_token)) = tokens else {
        return BusinessStatus::unknown("no operating-hours information");
    };
    if open_token.is_empty() || close_token.is_empty() {
        return BusinessStatus::unknown("no operating-hours information");
    }

    let (Some(open_minutes), Some(close_minutes)) = (
        parse_time_token(&open_token),
        parse_time_token(&close_token),
    ) else {
        return BusinessStatus::unknown("operating-hours error");
    };
    let open_minutes = u32::from(open_minutes);
    let close_minutes = u32::from(close_minutes);

    let now_minutes = now.time().hour() * 60 + now.time().minute();

    if open_minutes <= now_minutes && now_minutes < close_minutes {
        if close_minutes - now_minutes <= SOON_WINDOW_MINUTES {
            return BusinessStatus::closing_soon(&close_token);
        }
        return BusinessStatus::open_until(&close_token);
    }

    if now_minutes < open_minutes && open_minutes - now_minutes <= SOON_WINDOW_MINUTES {
        return BusinessStatus::opening_soon(&open_token);
    }

    BusinessStatus::closed_until(&open_token)
}

/// Animal hospitals reuse the pharmacy schedule fields, so their status is
/// the same computation under a domain-specific name.
#[must_use]
pub fn animal_hospital_status(record: &FacilityRecord, now: NaiveDateTime) -> BusinessStatus {
    facility_status(record, now)
}

/// Retains facilities considered available right now.
///
/// Emergency rooms and AEDs always pass (available around the clock by
/// policy); pharmacies and animal hospitals pass while open or closing
/// soon.
#[must_use]
pub fn filter_open_now(items: Vec<FacilityRecord>, now: NaiveDateTime) -> Vec<FacilityRecord> {
    items
        .into_iter()
        .filter(|item| match item.category {
            FacilityCategory::Emergency | FacilityCategory::Aed => true,
            FacilityCategory::Pharmacy | FacilityCategory::AnimalHospital => {
                let status = facility_status(item, now);
                matches!(status.kind, StatusKind::Open | StatusKind::ClosingSoon)
            }
        })
        .collect()
}
