//! Dienstbeginn rounding: an early clock-in snaps forward to the scheduled
//! shift start.

use chrono::{DateTime, TimeZone};

use crate::settings::Settings;
use crate::time::{MS_PER_MINUTE, local_instant};

/// Start time to record for a clock-in at `actual`.
///
/// When the rule is enabled and `overdrive` is off, an arrival that is early
/// by more than zero and at most `dienstbeginn_early_minutes` becomes the
/// scheduled time on the same local day. Late arrivals and arrivals outside
/// the tolerance are kept as they are.
pub fn rounded_start<Tz: TimeZone>(
    actual: DateTime<Tz>,
    settings: &Settings,
    overdrive: bool,
) -> DateTime<Tz> {
    if !settings.dienstbeginn_enabled || overdrive {
        return actual;
    }
    let scheduled = local_instant(
        &actual.timezone(),
        actual.date_naive(),
        settings.dienstbeginn_time.time(),
    );
    let early_ms = scheduled.timestamp_millis() - actual.timestamp_millis();
    let tolerance_ms = i64::from(settings.dienstbeginn_early_minutes) * MS_PER_MINUTE;
    if early_ms > 0 && early_ms <= tolerance_ms {
        tracing::debug!(scheduled = %scheduled.naive_local(), "rounding early start to dienstbeginn");
        scheduled
    } else {
        actual
    }
}
