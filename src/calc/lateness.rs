//! Late and undertime minutes against the weekday schedule, and their money value.

use chrono::{NaiveTime, Weekday};
use rust_decimal::Decimal;

use super::policy::is_short_day;
use crate::models::{AttendanceRecord, StaffType};
use crate::money;
use crate::timeutil::minute_of_day;

const OFFICE_AM_START: i64 = 8 * 60 + 12;
const FIELD_AM_START: i64 = 7 * 60 + 20;
const AM_END: i64 = 11 * 60 + 50;
const PM_START: i64 = 13 * 60;
const PM_END: i64 = 17 * 60;
const PM_END_SHORT: i64 = 16 * 60 + 30;

/// Scheduled session boundaries in minutes of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LateSchedule {
    pub am_start: i64,
    pub am_end: i64,
    pub pm_start: i64,
    pub pm_end: i64,
}

impl LateSchedule {
    pub fn for_day(staff_type: StaffType, weekday: Weekday) -> Self {
        let am_start = match staff_type {
            StaffType::Field => FIELD_AM_START,
            StaffType::Office => OFFICE_AM_START,
        };
        let pm_end = if is_short_day(weekday) { PM_END_SHORT } else { PM_END };

        Self {
            am_start,
            am_end: AM_END,
            pm_start: PM_START,
            pm_end,
        }
    }
}

/// Late and undertime minutes for one day or summed over several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LateUndertime {
    pub late_minutes: i64,
    pub undertime_minutes: i64,
}

impl std::ops::Add for LateUndertime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            late_minutes: self.late_minutes + rhs.late_minutes,
            undertime_minutes: self.undertime_minutes + rhs.undertime_minutes,
        }
    }
}

fn late_for(punch_in: Option<NaiveTime>, scheduled_start: i64) -> i64 {
    punch_in.map_or(0, |p| (minute_of_day(p) - scheduled_start).max(0))
}

fn undertime_for(punch_out: Option<NaiveTime>, scheduled_end: i64) -> i64 {
    punch_out.map_or(0, |p| (scheduled_end - minute_of_day(p)).max(0))
}

/// Late and undertime minutes for one record. Paid-leave days are not assessed.
pub fn assess(record: &AttendanceRecord, staff_type: StaffType) -> LateUndertime {
    if record.is_paid_leave() {
        return LateUndertime::default();
    }

    let schedule = LateSchedule::for_day(staff_type, record.weekday());
    LateUndertime {
        late_minutes: late_for(record.am_in, schedule.am_start) + late_for(record.pm_in, schedule.pm_start),
        undertime_minutes: undertime_for(record.am_out, schedule.am_end)
            + undertime_for(record.pm_out, schedule.pm_end),
    }
}

/// Sum of `assess` over a set of records.
pub fn assess_all<'a, I>(records: I, staff_type: StaffType) -> LateUndertime
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    records
        .into_iter()
        .map(|r| assess(r, staff_type))
        .fold(LateUndertime::default(), |acc, x| acc + x)
}

/// Money value of late or undertime minutes: `daily_rate / 8 / 60` per minute.
pub fn minutes_deduction(daily_rate: Decimal, minutes: i64) -> Decimal {
    money::minutes_value(daily_rate, minutes)
}
