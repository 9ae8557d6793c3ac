//! Configurable pay policies shared by the monthly-summary and daily-print paths.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{AttendanceRecord, EmployeeId, StaffType};

/// Which view a computation is feeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollPath {
    /// Tabular monthly payroll (and single-employee rows, annual summaries).
    MonthlySummary,
    /// Single-employee printed payslip with per-day lines.
    DailyPrint,
}

/// Per-path switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSwitch {
    pub monthly_summary: bool,
    pub daily_print: bool,
}

impl PathSwitch {
    pub fn get(&self, path: PayrollPath) -> bool {
        match path {
            PayrollPath::MonthlySummary => self.monthly_summary,
            PayrollPath::DailyPrint => self.daily_print,
        }
    }
}

/// Whether late/undertime deductions apply, by staff type and path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LateUndertimePolicy {
    pub field: PathSwitch,
    pub office: PathSwitch,
}

impl Default for LateUndertimePolicy {
    fn default() -> Self {
        Self {
            field: PathSwitch {
                monthly_summary: false,
                daily_print: true,
            },
            office: PathSwitch {
                monthly_summary: true,
                daily_print: true,
            },
        }
    }
}

impl LateUndertimePolicy {
    pub fn applies(&self, staff_type: StaffType, path: PayrollPath) -> bool {
        match staff_type {
            StaffType::Field => self.field.get(path),
            StaffType::Office => self.office.get(path),
        }
    }
}

/// Grace periods for office session clipping, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeAllowances {
    pub am_late_minutes: i64,
    pub am_early_minutes: i64,
    pub pm_late_minutes: i64,
    pub pm_early_minutes: i64,
    /// Early-departure allowance for the PM session on Friday and Saturday.
    pub pm_early_minutes_fri_sat: i64,
}

impl Default for OfficeAllowances {
    fn default() -> Self {
        Self {
            am_late_minutes: 10,
            am_early_minutes: 0,
            pm_late_minutes: 0,
            pm_early_minutes: 0,
            pm_early_minutes_fri_sat: 30,
        }
    }
}

impl OfficeAllowances {
    pub fn pm_early_for(&self, weekday: Weekday) -> i64 {
        if is_short_day(weekday) {
            self.pm_early_minutes_fri_sat
        } else {
            self.pm_early_minutes
        }
    }
}

/// Friday and Saturday end the PM session early.
pub fn is_short_day(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Fri | Weekday::Sat)
}

/// Employee whose AM-in punch stands for a full office day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticAttendanceRule {
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub note: Option<String>,
}

/// Replaces the punches of listed employees with a fixed 08:00-12:00 / 13:00-17:00 day
/// whenever an AM-in punch exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyntheticAttendancePolicy {
    pub rules: Vec<SyntheticAttendanceRule>,
}

impl SyntheticAttendancePolicy {
    pub fn covers(&self, employee_id: EmployeeId) -> bool {
        self.rules.iter().any(|r| r.employee_id == employee_id)
    }

    /// Apply the policy to one employee's fetched attendance.
    pub fn apply(&self, employee_id: EmployeeId, records: Vec<AttendanceRecord>) -> Vec<AttendanceRecord> {
        if !self.covers(employee_id) {
            return records;
        }

        let (am_in, am_out, pm_in, pm_out) = synthetic_day();
        records
            .into_iter()
            .map(|record| {
                if record.am_in.is_none() {
                    return record;
                }
                debug!(employee_id, date = %record.date, "Synthesizing full office day");
                AttendanceRecord {
                    am_in: Some(am_in),
                    am_out: Some(am_out),
                    pm_in: Some(pm_in),
                    pm_out: Some(pm_out),
                    ..record
                }
            })
            .collect()
    }
}

fn synthetic_day() -> (NaiveTime, NaiveTime, NaiveTime, NaiveTime) {
    let hm = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
    (hm(8), hm(12), hm(13), hm(17))
}

/// All pay policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollPolicy {
    pub late_undertime: LateUndertimePolicy,
    pub office_allowances: OfficeAllowances,
    pub synthetic_attendance: SyntheticAttendancePolicy,
}
