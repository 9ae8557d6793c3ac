//! Holiday pay by holiday type.

use rust_decimal::Decimal;

use super::minutes::session_fraction;
use crate::models::{AttendanceRecord, Holiday, HolidayLine};
use crate::money;

/// Holiday classification derived from a free-form type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayKind {
    /// "RH", paid double.
    Regular,
    /// "SNH", paid 150%.
    SpecialNonWorking,
    /// "SWH", paid 130%.
    SpecialWorking,
    Unclassified,
}

impl HolidayKind {
    /// Case-insensitive substring match, checked in RH, SNH, SWH order.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_uppercase();
        if tag.contains("RH") {
            Self::Regular
        } else if tag.contains("SNH") {
            Self::SpecialNonWorking
        } else if tag.contains("SWH") {
            Self::SpecialWorking
        } else {
            Self::Unclassified
        }
    }

    pub fn multiplier(&self) -> Decimal {
        match self {
            Self::Regular => Decimal::TWO,
            Self::SpecialNonWorking => Decimal::new(15, 1),
            Self::SpecialWorking => Decimal::new(13, 1),
            Self::Unclassified => Decimal::ONE,
        }
    }
}

/// One pay line per holiday, with the employee's attendance on that date.
pub fn holiday_lines(holidays: &[Holiday], attendance: &[AttendanceRecord], daily_rate: Decimal) -> Vec<HolidayLine> {
    holidays
        .iter()
        .map(|holiday| {
            let multiplier = HolidayKind::from_tag(&holiday.kind).multiplier();
            let attendance_fraction = attendance
                .iter()
                .find(|r| r.date == holiday.date)
                .map(session_fraction)
                .unwrap_or(Decimal::ZERO);

            HolidayLine {
                date: holiday.date,
                name: holiday.name.clone(),
                kind: holiday.kind.clone(),
                multiplier,
                attendance_fraction,
                amount: daily_rate * multiplier,
            }
        })
        .collect()
}

/// Total holiday pay.
pub fn holiday_pay(lines: &[HolidayLine]) -> Decimal {
    money::sum(lines.iter().map(|l| l.amount))
}
