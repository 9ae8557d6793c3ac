//! Attendance records as consumed by the payroll calculators.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::employee::EmployeeId;

/// One employee's punches for one calendar day.
///
/// Punches are local wall-clock times. A punch that failed to parse upstream is
/// simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    #[serde(default)]
    pub am_in: Option<NaiveTime>,
    #[serde(default)]
    pub am_out: Option<NaiveTime>,
    #[serde(default)]
    pub pm_in: Option<NaiveTime>,
    #[serde(default)]
    pub pm_out: Option<NaiveTime>,
    #[serde(default)]
    pub overtime_in: Option<NaiveTime>,
    #[serde(default)]
    pub overtime_out: Option<NaiveTime>,
    #[serde(default)]
    pub leave: Option<PaidLeave>,
}

/// Paid leave covering all or part of a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidLeave {
    pub leave_type: String,
    /// Portion of the day covered (1.0 full day, 0.5 half day).
    #[serde(default = "full_day")]
    pub fraction: Decimal,
}

fn full_day() -> Decimal {
    Decimal::ONE
}

impl AttendanceRecord {
    /// Empty record for a date.
    pub fn new(employee_id: EmployeeId, date: NaiveDate) -> Self {
        Self {
            employee_id,
            date,
            am_in: None,
            am_out: None,
            pm_in: None,
            pm_out: None,
            overtime_in: None,
            overtime_out: None,
            leave: None,
        }
    }

    /// Set the morning punches.
    pub fn with_am(mut self, punch_in: NaiveTime, punch_out: NaiveTime) -> Self {
        self.am_in = Some(punch_in);
        self.am_out = Some(punch_out);
        self
    }

    /// Set the afternoon punches.
    pub fn with_pm(mut self, punch_in: NaiveTime, punch_out: NaiveTime) -> Self {
        self.pm_in = Some(punch_in);
        self.pm_out = Some(punch_out);
        self
    }

    /// Set the overtime punches.
    pub fn with_overtime(mut self, punch_in: NaiveTime, punch_out: NaiveTime) -> Self {
        self.overtime_in = Some(punch_in);
        self.overtime_out = Some(punch_out);
        self
    }

    /// Mark the day as paid leave.
    pub fn with_leave(mut self, leave_type: impl Into<String>, fraction: Decimal) -> Self {
        self.leave = Some(PaidLeave {
            leave_type: leave_type.into(),
            fraction,
        });
        self
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn am_complete(&self) -> bool {
        self.am_in.is_some() && self.am_out.is_some()
    }

    pub fn pm_complete(&self) -> bool {
        self.pm_in.is_some() && self.pm_out.is_some()
    }

    /// Any of the four session punches recorded.
    pub fn has_any_punch(&self) -> bool {
        self.am_in.is_some() || self.am_out.is_some() || self.pm_in.is_some() || self.pm_out.is_some()
    }

    pub fn has_overtime(&self) -> bool {
        self.overtime_in.is_some() && self.overtime_out.is_some()
    }

    pub fn is_paid_leave(&self) -> bool {
        self.leave.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_session_completeness() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let mut record = AttendanceRecord::new(1, date).with_am(t(8, 0), t(12, 0));
        assert!(record.am_complete());
        assert!(!record.pm_complete());
        assert!(record.has_any_punch());

        record.pm_in = Some(t(13, 0));
        assert!(!record.pm_complete());
        assert!(!record.has_overtime());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"employee_id": 3, "date": "2024-05-06", "am_in": "08:00:00",
            "leave": {"leave_type": "VL"}}"#;
        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.am_in, Some(t(8, 0)));
        assert_eq!(record.pm_out, None);
        assert_eq!(record.leave.unwrap().fraction, Decimal::ONE);
    }
}
