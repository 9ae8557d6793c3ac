//! Payroll output: per-employee rows, totals, payslips and annual summaries.

use std::fmt;

use chrono::{NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::employee::{DeductionCategory, Employee, EmployeeId, StaffType};
use crate::period::PayPeriod;

/// External record source queried for one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Attendance,
    Trips,
    Holidays,
    CashAdvances,
    CashAdjustments,
    Allowances,
    Utilizations,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Attendance => "attendance",
            Self::Trips => "trips",
            Self::Holidays => "holidays",
            Self::CashAdvances => "cash_advances",
            Self::CashAdjustments => "cash_adjustments",
            Self::Allowances => "allowances",
            Self::Utilizations => "utilizations",
        };
        f.write_str(name)
    }
}

/// Employee identity as printed on a payroll row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: EmployeeId,
    pub full_name: String,
    pub designation: Option<String>,
    pub staff_type: StaffType,
    pub is_admin: bool,
    pub daily_rate: Decimal,
}

impl From<&Employee> for EmployeeSummary {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name.clone(),
            designation: employee.designation.clone(),
            staff_type: employee.staff_type,
            is_admin: employee.is_admin,
            daily_rate: employee.daily_rate,
        }
    }
}

/// Itemized deductions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    pub cash_advance: Decimal,
    pub sss: Decimal,
    pub phic: Decimal,
    pub pagibig: Decimal,
    pub sss_loan: Decimal,
    pub savings: Decimal,
    pub salary_deposit: Decimal,
    pub other: Decimal,
    pub late: Decimal,
    pub undertime: Decimal,
    pub cash_adjustment: Decimal,
    pub total: Decimal,
}

impl DeductionBreakdown {
    /// Mutable slot for a benefit category.
    pub fn category_mut(&mut self, category: DeductionCategory) -> &mut Decimal {
        match category {
            DeductionCategory::Sss => &mut self.sss,
            DeductionCategory::SssLoan => &mut self.sss_loan,
            DeductionCategory::Phic => &mut self.phic,
            DeductionCategory::Pagibig => &mut self.pagibig,
            DeductionCategory::Savings => &mut self.savings,
            DeductionCategory::SalaryDeposit => &mut self.salary_deposit,
            DeductionCategory::Other => &mut self.other,
        }
    }

    /// Sum of every itemized field (excludes `total`).
    pub fn itemized_sum(&self) -> Decimal {
        self.cash_advance
            + self.sss
            + self.phic
            + self.pagibig
            + self.sss_loan
            + self.savings
            + self.salary_deposit
            + self.other
            + self.late
            + self.undertime
            + self.cash_adjustment
    }

    /// Add another breakdown field by field.
    pub fn accumulate(&mut self, other: &Self) {
        self.cash_advance += other.cash_advance;
        self.sss += other.sss;
        self.phic += other.phic;
        self.pagibig += other.pagibig;
        self.sss_loan += other.sss_loan;
        self.savings += other.savings;
        self.salary_deposit += other.salary_deposit;
        self.other += other.other;
        self.late += other.late;
        self.undertime += other.undertime;
        self.cash_adjustment += other.cash_adjustment;
        self.total += other.total;
    }
}

/// Computed payroll for one employee and one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRow {
    pub employee: EmployeeSummary,
    pub period: PayPeriod,
    pub days_worked: Decimal,
    pub hours_worked: Decimal,
    pub sunday_days: Decimal,
    pub sunday_amount: Decimal,
    /// Non-deduction benefits (allowance, COLA).
    pub allowance: Decimal,
    pub overtime_hours: Decimal,
    pub overtime_pay: Decimal,
    pub basic_pay: Decimal,
    pub trips_pay: Decimal,
    pub holidays_pay: Decimal,
    pub utilizations_pay: Decimal,
    pub allowances_pay: Decimal,
    pub cash_adjustment_pay: Decimal,
    pub gross_pay: Decimal,
    pub deductions: DeductionBreakdown,
    pub net_pay: Decimal,
    pub late_minutes: i64,
    pub undertime_minutes: i64,
    /// Sources that failed to load and were treated as empty.
    pub fallback_sources: Vec<SourceKind>,
}

impl PayrollRow {
    pub fn used_fallback(&self) -> bool {
        !self.fallback_sources.is_empty()
    }
}

/// Column sums over a set of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTotals {
    pub employees: usize,
    pub days_worked: Decimal,
    pub hours_worked: Decimal,
    pub sunday_days: Decimal,
    pub sunday_amount: Decimal,
    pub allowance: Decimal,
    pub overtime_hours: Decimal,
    pub overtime_pay: Decimal,
    pub basic_pay: Decimal,
    pub trips_pay: Decimal,
    pub holidays_pay: Decimal,
    pub utilizations_pay: Decimal,
    pub allowances_pay: Decimal,
    pub cash_adjustment_pay: Decimal,
    pub gross_pay: Decimal,
    pub deductions: DeductionBreakdown,
    pub net_pay: Decimal,
}

impl PayrollTotals {
    pub fn add(&mut self, row: &PayrollRow) {
        self.employees += 1;
        self.days_worked += row.days_worked;
        self.hours_worked += row.hours_worked;
        self.sunday_days += row.sunday_days;
        self.sunday_amount += row.sunday_amount;
        self.allowance += row.allowance;
        self.overtime_hours += row.overtime_hours;
        self.overtime_pay += row.overtime_pay;
        self.basic_pay += row.basic_pay;
        self.trips_pay += row.trips_pay;
        self.holidays_pay += row.holidays_pay;
        self.utilizations_pay += row.utilizations_pay;
        self.allowances_pay += row.allowances_pay;
        self.cash_adjustment_pay += row.cash_adjustment_pay;
        self.gross_pay += row.gross_pay;
        self.deductions.accumulate(&row.deductions);
        self.net_pay += row.net_pay;
    }

    pub fn from_rows<'a, I: IntoIterator<Item = &'a PayrollRow>>(rows: I) -> Self {
        rows.into_iter().fold(Self::default(), |mut totals, row| {
            totals.add(row);
            totals
        })
    }
}

/// Monthly payroll table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPayroll {
    pub period: PayPeriod,
    pub rows: Vec<PayrollRow>,
    pub totals: PayrollTotals,
    pub field_totals: PayrollTotals,
    pub office_totals: PayrollTotals,
    /// Directory ids that could not be resolved to an employee.
    pub skipped: Vec<EmployeeId>,
}

/// Twelve monthly rows for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualPayroll {
    pub employee: EmployeeSummary,
    pub year: i32,
    pub months: Vec<PayrollRow>,
    pub totals: PayrollTotals,
}

/// Sunday worked, with the portion of the day credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SundayDuty {
    pub date: NaiveDate,
    pub fraction: Decimal,
}

/// One holiday's pay line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayLine {
    pub date: NaiveDate,
    pub name: String,
    pub kind: String,
    pub multiplier: Decimal,
    /// Portion of the holiday the employee attended (informational).
    pub attendance_fraction: Decimal,
    pub amount: Decimal,
}

/// One attendance day as shown on a printed payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLine {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub am_in: Option<NaiveTime>,
    pub am_out: Option<NaiveTime>,
    pub pm_in: Option<NaiveTime>,
    pub pm_out: Option<NaiveTime>,
    pub worked_minutes: i64,
    pub day_fraction: Decimal,
    pub late_minutes: i64,
    pub undertime_minutes: i64,
    pub late_amount: Decimal,
    pub undertime_amount: Decimal,
    pub overtime_hours: Decimal,
    pub basic_pay: Decimal,
    pub leave_type: Option<String>,
}

/// Single-employee print view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    pub row: PayrollRow,
    pub days: Vec<DailyLine>,
    pub holidays: Vec<HolidayLine>,
    pub sundays: Vec<SundayDuty>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_category_slots() {
        let mut breakdown = DeductionBreakdown::default();
        *breakdown.category_mut(DeductionCategory::Phic) += Decimal::from(200);
        *breakdown.category_mut(DeductionCategory::Other) += Decimal::from(50);
        breakdown.late = Decimal::new(3000, 2);

        assert_eq!(breakdown.phic, Decimal::from(200));
        assert_eq!(breakdown.other, Decimal::from(50));
        assert_eq!(breakdown.itemized_sum(), Decimal::from(280));
    }

    #[test]
    fn test_breakdown_accumulate() {
        let mut a = DeductionBreakdown {
            sss: Decimal::from(100),
            total: Decimal::from(100),
            ..Default::default()
        };
        let b = DeductionBreakdown {
            sss: Decimal::from(50),
            late: Decimal::from(10),
            total: Decimal::from(60),
            ..Default::default()
        };
        a.accumulate(&b);
        assert_eq!(a.sss, Decimal::from(150));
        assert_eq!(a.late, Decimal::from(10));
        assert_eq!(a.total, Decimal::from(160));
    }

    #[test]
    fn test_source_kind_display() {
        assert_eq!(SourceKind::CashAdvances.to_string(), "cash_advances");
        assert_eq!(SourceKind::Attendance.to_string(), "attendance");
    }
}
