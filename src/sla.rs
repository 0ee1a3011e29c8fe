//! # SLA Computation
//!
//! Derives an urgency reading for a feedback item from its age and
//! channel/priority-specific thresholds. Pure function of the item fields
//! plus wall-clock "now"; nothing here is persisted. Callers recompute on a
//! timer (the refresh interval lives in [`crate::config::AppConfig`]) since
//! age changes continuously.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Channel, FeedbackStatus, Priority};

/// Urgency band for an item's SLA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    Ok,
    Warning,
    Critical,
    Overdue,
}

/// Warning/critical/overdue thresholds in minutes for one channel+priority
/// combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaThresholds {
    pub warning_minutes: i64,
    pub critical_minutes: i64,
    pub overdue_minutes: i64,
}

/// Derived SLA reading. Recomputed on demand, never stored on the item.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SlaInfo {
    pub status: SlaStatus,
    pub age_minutes: i64,
    /// Minutes until the overdue threshold; `None` once overdue.
    pub remaining_minutes: Option<i64>,
    pub age_display: String,
    pub remaining_display: Option<String>,
    /// Progress toward breach, capped at 100.
    pub percent_complete: f64,
}

/// Response-time expectations per channel, expressed as the overdue deadline
/// in minutes for a medium-priority item. Warning fires at 50% of the
/// deadline and critical at 80%.
fn channel_base_minutes(channel: Channel) -> i64 {
    match channel {
        // Real-time channels expect fast turnaround.
        Channel::LiveChat => 60,
        Channel::Twitter => 120,
        // Public review surfaces.
        Channel::Trustpilot => 720,
        Channel::AppStore => 1440,
        Channel::Instagram => 480,
        Channel::Facebook => 360,
        Channel::Email => 480,
    }
}

/// Priority scaling applied to the channel deadline: more severe items get a
/// tighter budget.
fn priority_scale(priority: Priority) -> f64 {
    match priority {
        Priority::Critical => 0.25,
        Priority::High => 0.5,
        Priority::Medium => 1.0,
        Priority::Low => 2.0,
    }
}

/// Threshold table lookup for one channel+priority combination.
pub fn thresholds_for(channel: Channel, priority: Priority) -> SlaThresholds {
    let overdue = (channel_base_minutes(channel) as f64 * priority_scale(priority)).round() as i64;
    let overdue = overdue.max(1);
    SlaThresholds {
        warning_minutes: (overdue as f64 * 0.5).round() as i64,
        critical_minutes: (overdue as f64 * 0.8).round() as i64,
        overdue_minutes: overdue,
    }
}

/// Computes the SLA reading for an item at the given instant.
///
/// Items in the terminal `done` status short-circuit to a fixed
/// "ok, 100% complete" reading regardless of age.
pub fn compute_sla(
    created_at: DateTime<Utc>,
    channel: Channel,
    priority: Priority,
    status: FeedbackStatus,
    now: DateTime<Utc>,
) -> SlaInfo {
    let age_minutes = (now - created_at).num_minutes().max(0);

    if status == FeedbackStatus::Done {
        return SlaInfo {
            status: SlaStatus::Ok,
            age_minutes,
            remaining_minutes: None,
            age_display: format_minutes(age_minutes),
            remaining_display: None,
            percent_complete: 100.0,
        };
    }

    let thresholds = thresholds_for(channel, priority);
    let status = if age_minutes >= thresholds.overdue_minutes {
        SlaStatus::Overdue
    } else if age_minutes >= thresholds.critical_minutes {
        SlaStatus::Critical
    } else if age_minutes >= thresholds.warning_minutes {
        SlaStatus::Warning
    } else {
        SlaStatus::Ok
    };

    let remaining_minutes = if status == SlaStatus::Overdue {
        None
    } else {
        Some(thresholds.overdue_minutes - age_minutes)
    };

    let percent_complete =
        (age_minutes as f64 / thresholds.overdue_minutes as f64 * 100.0).min(100.0);

    SlaInfo {
        status,
        age_minutes,
        remaining_minutes,
        age_display: format_minutes(age_minutes),
        remaining_display: remaining_minutes.map(format_minutes),
        percent_complete,
    }
}

/// Formats a minute count as a compact duration, e.g. "45m", "3h 20m", "2d 4h".
pub fn format_minutes(minutes: i64) -> String {
    let minutes = minutes.max(0);
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        let rem = minutes % 60;
        return if rem == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, rem)
        };
    }
    let days = hours / 24;
    let rem_hours = hours % 24;
    if rem_hours == 0 {
        format!("{}d", days)
    } else {
        format!("{}d {}h", days, rem_hours)
    }
}
