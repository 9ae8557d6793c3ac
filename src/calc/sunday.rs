//! Sunday duty: attendance fractions on Sundays and the 30% premium.

use chrono::Weekday;
use rust_decimal::Decimal;

use super::minutes::session_fraction;
use crate::models::{AttendanceRecord, SundayDuty};
use crate::money;

/// Sundays with at least one complete session, with their credited fraction.
pub fn sunday_duties<'a, I>(records: I) -> Vec<SundayDuty>
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    records
        .into_iter()
        .filter(|r| r.weekday() == Weekday::Sun && r.has_any_punch())
        .filter_map(|r| {
            let fraction = session_fraction(r);
            (fraction > Decimal::ZERO).then_some(SundayDuty { date: r.date, fraction })
        })
        .collect()
}

/// Total Sunday days credited.
pub fn sunday_days(duties: &[SundayDuty]) -> Decimal {
    money::sum(duties.iter().map(|d| d.fraction))
}

/// Premium on top of base pay: days x daily rate x 0.3.
pub fn sunday_premium(days: Decimal, daily_rate: Decimal) -> Decimal {
    days * daily_rate * money::SUNDAY_PREMIUM
}
