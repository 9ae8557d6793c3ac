//! Data models for employees, attendance, ledger entries and payroll output.

pub mod attendance;
pub mod employee;
pub mod ledger;
pub mod payroll;

pub use attendance::{AttendanceRecord, PaidLeave};
pub use employee::{Benefit, DeductionCategory, Employee, EmployeeDeduction, EmployeeId, StaffType};
pub use ledger::{Allowance, CashAdjustment, CashAdvance, Holiday, Trip, Utilization};
pub use payroll::{
    AnnualPayroll, DailyLine, DeductionBreakdown, EmployeeSummary, HolidayLine, MonthlyPayroll, PayrollRow,
    PayrollTotals, Payslip, SourceKind, SundayDuty,
};
