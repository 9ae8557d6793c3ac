//! Worked minutes per day under the field and office staff policies.

use chrono::{NaiveTime, Weekday};
use rust_decimal::Decimal;

use super::policy::OfficeAllowances;
use crate::models::{AttendanceRecord, StaffType};
use crate::timeutil::{minute_of_day, span_minutes};

/// Field staff are credited at most eight hours per day.
pub const FIELD_DAILY_CAP_MINUTES: i64 = 480;

/// Office AM session, [08:00, 12:00).
pub const OFFICE_AM: (i64, i64) = (8 * 60, 12 * 60);
/// Office PM session, [13:00, 17:00).
pub const OFFICE_PM: (i64, i64) = (13 * 60, 17 * 60);

const HALF_DAY: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Office session window with its grace periods, all in minutes of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub start: i64,
    pub end: i64,
    pub late_allowance: i64,
    pub early_allowance: i64,
}

impl SessionWindow {
    /// AM and PM windows for a weekday.
    pub fn office_day(weekday: Weekday, allowances: &OfficeAllowances) -> (Self, Self) {
        let am = Self {
            start: OFFICE_AM.0,
            end: OFFICE_AM.1,
            late_allowance: allowances.am_late_minutes,
            early_allowance: allowances.am_early_minutes,
        };
        let pm = Self {
            start: OFFICE_PM.0,
            end: OFFICE_PM.1,
            late_allowance: allowances.pm_late_minutes,
            early_allowance: allowances.pm_early_for(weekday),
        };
        (am, pm)
    }
}

/// Minutes worked inside one office session.
///
/// The session counts zero when the punch-out is at or before the window start or the
/// punch-in is at or after the window end. Deviations within the allowance snap to the
/// window boundary; larger deviations use the punch itself.
pub fn office_session_minutes(
    punch_in: Option<NaiveTime>,
    punch_out: Option<NaiveTime>,
    window: &SessionWindow,
) -> i64 {
    let (Some(punch_in), Some(punch_out)) = (punch_in, punch_out) else {
        return 0;
    };
    let punch_in = minute_of_day(punch_in);
    let punch_out = minute_of_day(punch_out);

    if punch_out <= window.start || punch_in >= window.end {
        return 0;
    }

    let start = if punch_in - window.start > window.late_allowance {
        punch_in
    } else {
        window.start
    };
    let end = if window.end - punch_out > window.early_allowance {
        punch_out
    } else {
        window.end
    };

    (end - start).max(0)
}

/// Office minutes for a day (AM + PM).
pub fn office_minutes(record: &AttendanceRecord, allowances: &OfficeAllowances) -> i64 {
    let (am, pm) = SessionWindow::office_day(record.weekday(), allowances);
    office_session_minutes(record.am_in, record.am_out, &am) + office_session_minutes(record.pm_in, record.pm_out, &pm)
}

/// Field minutes for a day: elapsed AM + PM time, overnight-aware, capped at eight hours.
pub fn field_minutes(record: &AttendanceRecord) -> i64 {
    let total = span_minutes(record.am_in, record.am_out) + span_minutes(record.pm_in, record.pm_out);
    total.min(FIELD_DAILY_CAP_MINUTES)
}

/// Worked minutes under the employee's staff policy.
pub fn worked_minutes(record: &AttendanceRecord, staff_type: StaffType, allowances: &OfficeAllowances) -> i64 {
    match staff_type {
        StaffType::Field => field_minutes(record),
        StaffType::Office => office_minutes(record, allowances),
    }
}

/// 1.0 when both sessions have in/out pairs, 0.5 for one, else 0.
pub fn session_fraction(record: &AttendanceRecord) -> Decimal {
    match (record.am_complete(), record.pm_complete()) {
        (true, true) => Decimal::ONE,
        (true, false) | (false, true) => HALF_DAY,
        (false, false) => Decimal::ZERO,
    }
}

/// Day credited towards `days_worked`, including paid leave, at most 1.0.
pub fn day_fraction(record: &AttendanceRecord) -> Decimal {
    let worked = session_fraction(record);
    let leave = record
        .leave
        .as_ref()
        .map(|l| l.fraction.clamp(Decimal::ZERO, Decimal::ONE))
        .unwrap_or(Decimal::ZERO);
    worked.max(leave).min(Decimal::ONE)
}
