//! Overtime hours and pay.

use rust_decimal::Decimal;

use crate::models::AttendanceRecord;
use crate::money;
use crate::timeutil::{minutes_between, minutes_to_hours};

/// Overtime minutes of one record, or zero when either punch is missing.
pub fn overtime_minutes(record: &AttendanceRecord) -> i64 {
    match (record.overtime_in, record.overtime_out) {
        (Some(start), Some(end)) => minutes_between(start, end),
        _ => 0,
    }
}

/// Overtime hours of one record.
pub fn overtime_hours(record: &AttendanceRecord) -> Decimal {
    minutes_to_hours(overtime_minutes(record))
}

/// Total overtime hours over a set of records.
pub fn total_overtime_hours<'a, I>(records: I) -> Decimal
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    minutes_to_hours(records.into_iter().map(overtime_minutes).sum())
}

/// Overtime pay: hourly rate times 1.25 per hour.
pub fn overtime_pay(daily_rate: Decimal, hours: Decimal) -> Decimal {
    money::hourly_rate(daily_rate) * money::OVERTIME_MULTIPLIER * hours
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_overtime_requires_both_punches() {
        let mut record = AttendanceRecord::new(1, day(6));
        record.overtime_in = Some(t(17, 0));
        assert_eq!(overtime_minutes(&record), 0);

        record.overtime_out = Some(t(19, 30));
        assert_eq!(overtime_hours(&record), Decimal::new(25, 1));
    }

    #[test]
    fn test_overtime_overnight() {
        let record = AttendanceRecord::new(1, day(6)).with_overtime(t(22, 0), t(1, 0));
        assert_eq!(overtime_minutes(&record), 180);
    }

    #[test]
    fn test_total_and_pay() {
        let records = vec![
            AttendanceRecord::new(1, day(6)).with_overtime(t(17, 0), t(19, 0)),
            AttendanceRecord::new(1, day(7)).with_overtime(t(17, 0), t(18, 0)),
            AttendanceRecord::new(1, day(8)),
        ];
        let hours = total_overtime_hours(&records);
        assert_eq!(hours, Decimal::from(3));
        // 800 / 8 = 100 per hour, x1.25 = 125, x3 hours
        assert_eq!(overtime_pay(Decimal::from(800), hours), Decimal::from(375));
    }
}
