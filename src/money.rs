//! Money helpers using rust_decimal for precision.
//!
//! Amounts keep full precision while being aggregated and are rounded to two decimal
//! places (half away from zero) when a payroll row is assembled.

use rust_decimal::prelude::*;

/// Presentation precision for monetary values.
const DECIMAL_PLACES: u32 = 2;

/// Regular working hours per day.
pub const HOURS_PER_DAY: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Minutes per hour.
pub const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Overtime and utilization overtime multiplier (1.25).
pub const OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(125, 0, 0, false, 2);

/// Sunday duty premium on top of base pay (0.3).
pub const SUNDAY_PREMIUM: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

/// Round to two decimal places.
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Hourly rate derived from a daily rate (8-hour day).
pub fn hourly_rate(daily_rate: Decimal) -> Decimal {
    daily_rate / HOURS_PER_DAY
}

/// Per-minute rate derived from a daily rate.
pub fn per_minute_rate(daily_rate: Decimal) -> Decimal {
    hourly_rate(daily_rate) / MINUTES_PER_HOUR
}

/// Value of worked or missed minutes at the per-minute rate.
///
/// Multiplies before dividing so whole-minute results stay exact.
pub fn minutes_value(daily_rate: Decimal, minutes: i64) -> Decimal {
    daily_rate * Decimal::from(minutes) / (HOURS_PER_DAY * MINUTES_PER_HOUR)
}

/// Sum an iterator of amounts.
pub fn sum<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, |acc, x| acc + x)
}
