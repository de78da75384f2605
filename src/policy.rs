//! Cache freshness policy
//!
//! Pure decision of whether a saved envelope is still usable:
//! - An envelope is valid while `now < saved_at + 7 calendar days`
//! - Exactly seven days old is already stale (exclusive boundary)
//! - Day arithmetic is calendar-based, not a fixed 168-hour duration

use chrono::{DateTime, Days, Utc};

/// Maximum age of a usable envelope, in calendar days.
pub const MAX_AGE_DAYS: u64 = 7;

/// Check whether an envelope saved at `saved_at` is still valid at `now`.
///
/// Stateless and side-effect free. If adding the maximum age to
/// `saved_at` is not representable, the envelope is treated as stale.
pub fn is_valid(saved_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match saved_at.checked_add_days(Days::new(MAX_AGE_DAYS)) {
        Some(expires_at) => now < expires_at,
        None => false,
    }
}
