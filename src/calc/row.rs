//! Assembles calculator outputs into payroll rows and payslips.

use rust_decimal::Decimal;
use tracing::debug;

use super::earnings::{self, Earnings};
use super::policy::{PayrollPath, PayrollPolicy};
use super::{deductions, holiday, lateness, minutes, overtime, sunday};
use crate::models::{
    Allowance, AttendanceRecord, CashAdjustment, CashAdvance, DailyLine, Employee, EmployeeSummary, Holiday,
    HolidayLine, PayrollRow, Payslip, SourceKind, StaffType, Trip, Utilization,
};
use crate::money;
use crate::period::{DateRange, PayPeriod};
use crate::timeutil::minutes_to_hours;

/// Per-employee records fetched for a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeSources {
    pub attendance: Vec<AttendanceRecord>,
    pub trips: Vec<Trip>,
    pub cash_advances: Vec<CashAdvance>,
    pub cash_adjustments: Vec<CashAdjustment>,
    pub allowances: Vec<Allowance>,
    pub utilizations: Vec<Utilization>,
    /// Sources that failed to load and are empty here.
    pub fallback: Vec<SourceKind>,
}

impl EmployeeSources {
    /// Records dated inside `range`; fallback markers are kept.
    pub fn within(&self, range: DateRange) -> Self {
        fn keep<T: Clone>(items: &[T], date: impl Fn(&T) -> chrono::NaiveDate, range: DateRange) -> Vec<T> {
            items.iter().filter(|item| range.contains(date(item))).cloned().collect()
        }

        Self {
            attendance: keep(&self.attendance, |r| r.date, range),
            trips: keep(&self.trips, |t| t.date, range),
            cash_advances: keep(&self.cash_advances, |a| a.requested_on, range),
            cash_adjustments: keep(&self.cash_adjustments, |a| a.date, range),
            allowances: keep(&self.allowances, |a| a.date, range),
            utilizations: keep(&self.utilizations, |u| u.date, range),
            fallback: self.fallback.clone(),
        }
    }
}

/// Basic pay for one day on the given path.
fn day_basic_pay(record: &AttendanceRecord, employee: &Employee, path: PayrollPath, policy: &PayrollPolicy) -> Decimal {
    match (path, employee.staff_type) {
        (PayrollPath::DailyPrint, StaffType::Field) => {
            let worked = minutes::worked_minutes(record, StaffType::Field, &policy.office_allowances);
            earnings::hourly_basic_pay(worked, employee.daily_rate)
        }
        _ => earnings::basic_pay(minutes::day_fraction(record), employee.daily_rate),
    }
}

fn period_holidays(holidays: &[Holiday], range: DateRange) -> Vec<Holiday> {
    holidays.iter().filter(|h| range.contains(h.date)).cloned().collect()
}

/// Compute one employee's payroll row for a period.
///
/// `sources` must already be restricted to the period; holidays are filtered here.
pub fn compute_row(
    employee: &Employee,
    period: PayPeriod,
    sources: &EmployeeSources,
    holidays: &[Holiday],
    path: PayrollPath,
    policy: &PayrollPolicy,
) -> PayrollRow {
    let rate = employee.daily_rate;
    let staff_type = employee.staff_type;
    let attendance = &sources.attendance;

    let days_worked = money::sum(attendance.iter().map(minutes::day_fraction));
    let worked_minutes: i64 = attendance
        .iter()
        .map(|r| minutes::worked_minutes(r, staff_type, &policy.office_allowances))
        .sum();

    let basic_pay = match (path, staff_type) {
        (PayrollPath::DailyPrint, StaffType::Field) => earnings::hourly_basic_pay(worked_minutes, rate),
        _ => earnings::basic_pay(days_worked, rate),
    };

    let late_undertime = if policy.late_undertime.applies(staff_type, path) {
        lateness::assess_all(attendance, staff_type)
    } else {
        lateness::LateUndertime::default()
    };

    let overtime_hours = overtime::total_overtime_hours(attendance);
    let duties = sunday::sunday_duties(attendance);
    let sunday_days = sunday::sunday_days(&duties);
    let holiday_lines = holiday::holiday_lines(&period_holidays(holidays, period.range()), attendance, rate);

    let earnings = Earnings {
        basic_pay,
        trips_pay: earnings::trips_pay(&sources.trips),
        holidays_pay: holiday::holiday_pay(&holiday_lines),
        overtime_pay: overtime::overtime_pay(rate, overtime_hours),
        sunday_amount: sunday::sunday_premium(sunday_days, rate),
        benefits_pay: earnings::earning_benefits_pay(employee),
        utilizations_pay: earnings::utilizations_pay(&sources.utilizations),
        allowances_pay: earnings::allowances_pay(&sources.allowances),
        cash_adjustment_pay: earnings::cash_adjustment_additions(&sources.cash_adjustments),
    }
    .rounded();

    let breakdown = deductions::round_breakdown(&deductions::build_breakdown(
        employee,
        &sources.cash_advances,
        &sources.cash_adjustments,
        lateness::minutes_deduction(rate, late_undertime.late_minutes),
        lateness::minutes_deduction(rate, late_undertime.undertime_minutes),
    ));

    let gross_pay = earnings.gross();
    let net_pay = deductions::net_pay(gross_pay, &breakdown);

    debug!(
        employee_id = employee.id,
        period = %period,
        ?path,
        %gross_pay,
        %net_pay,
        "Computed payroll row"
    );

    let mut fallback_sources = sources.fallback.clone();
    fallback_sources.sort();
    fallback_sources.dedup();

    PayrollRow {
        employee: EmployeeSummary::from(employee),
        period,
        days_worked,
        hours_worked: money::round(minutes_to_hours(worked_minutes)),
        sunday_days,
        sunday_amount: earnings.sunday_amount,
        allowance: earnings.benefits_pay,
        overtime_hours: money::round(overtime_hours),
        overtime_pay: earnings.overtime_pay,
        basic_pay: earnings.basic_pay,
        trips_pay: earnings.trips_pay,
        holidays_pay: earnings.holidays_pay,
        utilizations_pay: earnings.utilizations_pay,
        allowances_pay: earnings.allowances_pay,
        cash_adjustment_pay: earnings.cash_adjustment_pay,
        gross_pay,
        deductions: breakdown,
        net_pay,
        late_minutes: late_undertime.late_minutes,
        undertime_minutes: late_undertime.undertime_minutes,
        fallback_sources,
    }
}

/// Compute the printed payslip: the daily-print row plus per-day detail.
pub fn compute_payslip(
    employee: &Employee,
    period: PayPeriod,
    sources: &EmployeeSources,
    holidays: &[Holiday],
    policy: &PayrollPolicy,
) -> Payslip {
    let path = PayrollPath::DailyPrint;
    let row = compute_row(employee, period, sources, holidays, path, policy);
    let assess = policy.late_undertime.applies(employee.staff_type, path);
    let rate = employee.daily_rate;

    let mut attendance: Vec<&AttendanceRecord> = sources.attendance.iter().collect();
    attendance.sort_by_key(|r| r.date);

    let days = attendance
        .into_iter()
        .map(|record| {
            let lateness = if assess {
                lateness::assess(record, employee.staff_type)
            } else {
                lateness::LateUndertime::default()
            };

            DailyLine {
                date: record.date,
                weekday: record.weekday(),
                am_in: record.am_in,
                am_out: record.am_out,
                pm_in: record.pm_in,
                pm_out: record.pm_out,
                worked_minutes: minutes::worked_minutes(record, employee.staff_type, &policy.office_allowances),
                day_fraction: minutes::day_fraction(record),
                late_minutes: lateness.late_minutes,
                undertime_minutes: lateness.undertime_minutes,
                late_amount: money::round(lateness::minutes_deduction(rate, lateness.late_minutes)),
                undertime_amount: money::round(lateness::minutes_deduction(rate, lateness.undertime_minutes)),
                overtime_hours: money::round(overtime::overtime_hours(record)),
                basic_pay: money::round(day_basic_pay(record, employee, path, policy)),
                leave_type: record.leave.as_ref().map(|l| l.leave_type.clone()),
            }
        })
        .collect();

    let holidays: Vec<HolidayLine> =
        holiday::holiday_lines(&period_holidays(holidays, period.range()), &sources.attendance, rate)
            .into_iter()
            .map(|line| HolidayLine {
                amount: money::round(line.amount),
                ..line
            })
            .collect();

    Payslip {
        row,
        days,
        holidays,
        sundays: sunday::sunday_duties(&sources.attendance),
    }
}
