//! Expiry classification
//!
//! Pure date arithmetic shared by the allocation engine (which must skip
//! expired lots) and the alert feed (which ranks how urgent an expiring lot
//! is). Statuses are derived, never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default picker-facing warning window in days
pub const DEFAULT_WARNING_DAYS: i64 = 30;

/// Days-to-expiry at or below which an alert is critical
pub const CRITICAL_DAYS: i64 = 7;

/// Days-to-expiry at or below which an alert is a warning
pub const WARNING_DAYS: i64 = 14;

/// Expiry status of a lot relative to a reference date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    Expiring,
    Ok,
}

/// Alert urgency bands, used only by the expiring-stock feed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryUrgency {
    Expired,
    Critical,
    Warning,
    Info,
}

/// Result of classifying one expiry date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpiryCheck {
    pub status: ExpiryStatus,
    /// Signed whole days until expiry; negative means already expired.
    /// `None` when the lot carries no expiry date.
    pub days_until_expiry: Option<i64>,
}

/// Classify an optional expiry date against `today`
///
/// A lot without an expiry date is always `Ok`. Otherwise the status is
/// `Expired` strictly before today, `Expiring` within `warning_days`
/// (inclusive), and `Ok` beyond the window.
pub fn classify_expiry(
    expiry_date: Option<NaiveDate>,
    today: NaiveDate,
    warning_days: i64,
) -> ExpiryCheck {
    let Some(expiry) = expiry_date else {
        return ExpiryCheck {
            status: ExpiryStatus::Ok,
            days_until_expiry: None,
        };
    };

    let days = (expiry - today).num_days();
    let status = if days < 0 {
        ExpiryStatus::Expired
    } else if days <= warning_days {
        ExpiryStatus::Expiring
    } else {
        ExpiryStatus::Ok
    };

    ExpiryCheck {
        status,
        days_until_expiry: Some(days),
    }
}

/// Map days-to-expiry to an alert urgency band
pub fn expiry_urgency(days_until_expiry: i64) -> ExpiryUrgency {
    if days_until_expiry < 0 {
        ExpiryUrgency::Expired
    } else if days_until_expiry <= CRITICAL_DAYS {
        ExpiryUrgency::Critical
    } else if days_until_expiry <= WARNING_DAYS {
        ExpiryUrgency::Warning
    } else {
        ExpiryUrgency::Info
    }
}
